//! Process-local document store.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use super::{Document, DocumentKey, DocumentStore, StoreError, ensure_object};

/// Documents kept in a map; nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<DocumentKey, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }

    fn documents(&self) -> std::sync::MutexGuard<'_, HashMap<DocumentKey, Document>> {
        self.documents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &DocumentKey) -> Result<Option<Document>> {
        Ok(self.documents().get(key).cloned())
    }

    async fn set(&self, key: &DocumentKey, body: Value) -> Result<Document> {
        ensure_object(key, &body)?;
        let now = Utc::now();
        let document = Document {
            key: key.clone(),
            body,
            created_at: now,
            updated_at: now,
        };
        self.documents().insert(key.clone(), document.clone());
        Ok(document)
    }

    async fn update(&self, key: &DocumentKey, partial: Value) -> Result<Document> {
        let Value::Object(fields) = partial else {
            return Err(StoreError::NotAnObject(key.clone()).into());
        };

        let mut documents = self.documents();
        let document = documents
            .get_mut(key)
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        if let Value::Object(body) = &mut document.body {
            body.extend(fields);
        }
        document.updated_at = Utc::now();
        Ok(document.clone())
    }
}
