use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Document collection.
///
/// Stored as text in `documents.collection`; the textual forms match the
/// document paths (`users/{uid}`, `dietPlans/{uid}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum Collection {
    #[sqlx(rename = "users")]
    #[serde(rename = "users")]
    Users,
    #[sqlx(rename = "dietPlans")]
    #[serde(rename = "dietPlans")]
    DietPlans,
}

impl Collection {
    pub const ALL: [Self; 2] = [Self::Users, Self::DietPlans];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::DietPlans => "dietPlans",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = CollectionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Self::Users),
            "dietPlans" => Ok(Self::DietPlans),
            other => Err(CollectionParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`Collection`] string.
#[derive(Debug, Clone)]
pub struct CollectionParseError(pub String);

impl fmt::Display for CollectionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid collection: {:?}", self.0)
    }
}

impl std::error::Error for CollectionParseError {}

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `accounts` table.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    /// Hex-encoded random salt.
    pub password_salt: String,
    /// Hex-encoded HMAC-SHA256 of `salt:password`.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A row from the `documents` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub collection: Collection,
    pub id: String,
    pub body: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_display_roundtrip() {
        for c in [Collection::Users, Collection::DietPlans] {
            let s = c.to_string();
            assert_eq!(s.parse::<Collection>().unwrap(), c);
        }
    }

    #[test]
    fn collection_uses_document_path_names() {
        assert_eq!(Collection::DietPlans.to_string(), "dietPlans");
        assert_eq!(
            serde_json::to_string(&Collection::DietPlans).unwrap(),
            "\"dietPlans\""
        );
    }

    #[test]
    fn collection_rejects_unknown() {
        let err = "plans".parse::<Collection>().unwrap_err();
        assert_eq!(err.to_string(), "invalid collection: \"plans\"");
    }
}
