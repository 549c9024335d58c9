//! Database query functions for the `documents` table.
//!
//! Every write is a single statement, so a document is never left half
//! written.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::{Collection, DocumentRow};

/// Fetch a document by collection and ID.
pub async fn get_document(
    pool: &PgPool,
    collection: Collection,
    id: &str,
) -> Result<Option<DocumentRow>> {
    let row = sqlx::query_as::<_, DocumentRow>(
        "SELECT * FROM documents WHERE collection = $1 AND id = $2",
    )
    .bind(collection)
    .bind(id)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to fetch document {collection}/{id}"))?;

    Ok(row)
}

/// Write a document, replacing any existing body.
///
/// Both `created_at` and `updated_at` are stamped with the current time.
pub async fn set_document(
    pool: &PgPool,
    collection: Collection,
    id: &str,
    body: &serde_json::Value,
) -> Result<DocumentRow> {
    let row = sqlx::query_as::<_, DocumentRow>(
        "INSERT INTO documents (collection, id, body) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (collection, id) DO UPDATE \
         SET body = EXCLUDED.body, created_at = now(), updated_at = now() \
         RETURNING *",
    )
    .bind(collection)
    .bind(id)
    .bind(body)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to write document {collection}/{id}"))?;

    Ok(row)
}

/// Merge `partial` into an existing document's top-level fields and stamp
/// `updated_at`.
///
/// Returns `None` when the document does not exist.
pub async fn merge_document(
    pool: &PgPool,
    collection: Collection,
    id: &str,
    partial: &serde_json::Value,
) -> Result<Option<DocumentRow>> {
    let row = sqlx::query_as::<_, DocumentRow>(
        "UPDATE documents \
         SET body = body || $3, updated_at = now() \
         WHERE collection = $1 AND id = $2 \
         RETURNING *",
    )
    .bind(collection)
    .bind(id)
    .bind(partial)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("failed to update document {collection}/{id}"))?;

    Ok(row)
}

/// Count the documents in a collection.
pub async fn count_documents(pool: &PgPool, collection: Collection) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
        .bind(collection)
        .fetch_one(pool)
        .await
        .with_context(|| format!("failed to count documents in {collection}"))?;

    Ok(count)
}
