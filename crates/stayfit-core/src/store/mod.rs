//! Keyed document store interface and backends.
//!
//! Two document kinds live here: `users/{uid}` (the profile) and
//! `dietPlans/{uid}` (the current plan). Typed access goes through
//! [`repo`]; the trait itself only moves JSON objects.

pub mod memory;
pub mod pg;
pub mod repo;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::auth::UserId;

pub use memory::MemoryStore;
pub use pg::PgDocumentStore;
pub use stayfit_db::models::Collection;

/// Address of a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub collection: Collection,
    pub id: String,
}

impl DocumentKey {
    pub fn new(collection: Collection, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }

    /// `users/{uid}`.
    pub fn user(uid: &UserId) -> Self {
        Self::new(Collection::Users, uid.as_str())
    }

    /// `dietPlans/{uid}`.
    pub fn diet_plan(uid: &UserId) -> Self {
        Self::new(Collection::DietPlans, uid.as_str())
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// A stored document with its write timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub key: DocumentKey,
    /// Always a JSON object.
    pub body: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Store-level rejections, returned inside `anyhow::Error`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    NotFound(DocumentKey),

    #[error("document {0} body must be a JSON object")]
    NotAnObject(DocumentKey),
}

/// Keyed JSON documents with atomic per-document writes.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable backend name (e.g. "postgres").
    fn name(&self) -> &str;

    async fn get(&self, key: &DocumentKey) -> Result<Option<Document>>;

    /// Write `body` as the whole document, stamping both timestamps.
    async fn set(&self, key: &DocumentKey, body: Value) -> Result<Document>;

    /// Merge `partial`'s top-level fields into an existing document and
    /// stamp `updated_at`. Fails with [`StoreError::NotFound`] if absent.
    async fn update(&self, key: &DocumentKey, partial: Value) -> Result<Document>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn DocumentStore) {}
};

fn ensure_object(key: &DocumentKey, value: &Value) -> Result<(), StoreError> {
    if value.is_object() {
        Ok(())
    } else {
        Err(StoreError::NotAnObject(key.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_render_as_paths() {
        let uid = UserId::new("abc");
        assert_eq!(DocumentKey::user(&uid).to_string(), "users/abc");
        assert_eq!(DocumentKey::diet_plan(&uid).to_string(), "dietPlans/abc");
    }
}
