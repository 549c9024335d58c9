//! Document store on the `documents` table.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use stayfit_db::models::DocumentRow;
use stayfit_db::queries::documents;

use super::{Document, DocumentKey, DocumentStore, StoreError, ensure_object};

pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn into_document(row: DocumentRow) -> Document {
    Document {
        key: DocumentKey::new(row.collection, row.id),
        body: row.body,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<Document>> {
        let row = documents::get_document(&self.pool, key.collection, &key.id).await?;
        Ok(row.map(into_document))
    }

    async fn set(&self, key: &DocumentKey, body: Value) -> Result<Document> {
        ensure_object(key, &body)?;
        let row = documents::set_document(&self.pool, key.collection, &key.id, &body).await?;
        debug!(document = %key, "document written");
        Ok(into_document(row))
    }

    async fn update(&self, key: &DocumentKey, partial: Value) -> Result<Document> {
        ensure_object(key, &partial)?;
        let row = documents::merge_document(&self.pool, key.collection, &key.id, &partial)
            .await?
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        debug!(document = %key, "document updated");
        Ok(into_document(row))
    }
}
