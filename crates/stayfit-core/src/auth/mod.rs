//! Authentication service interface and backends.
//!
//! ```text
//! AppSession
//!     |
//!     v
//! dyn AuthService --sign_up / sign_in / sign_out--> backend
//!     |                                               |
//!     |   current_user()                              | publish(state)
//!     |   subscribe() --> AuthSubscription <----------+
//!     |                       |
//!     |                  into_stream() --> Stream<Option<AuthUser>>
//! ```
//!
//! Two backends: [`MemoryAuth`] (process-local, used by tests and offline
//! tooling) and [`PgAuth`] (the `accounts` table).

pub mod credentials;
pub mod memory;
pub mod pg;
pub mod subscription;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use credentials::{PasswordHash, PasswordHasher};
pub use memory::MemoryAuth;
pub use pg::PgAuth;
pub use subscription::{AuthStateNotifier, AuthStateStream, AuthSubscription};

/// Opaque identity issued by the auth service. Documents are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: String,
}

/// Rejections an auth backend reports for the caller to show as-is.
///
/// Backends return these inside `anyhow::Error`; infrastructure failures
/// (database down) come back as other error types.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email address {0:?}")]
    InvalidEmail(String),

    #[error(
        "password must be at least {min} characters long",
        min = credentials::MIN_PASSWORD_LEN
    )]
    WeakPassword,

    #[error("an account already exists for {0}")]
    EmailInUse(String),

    #[error("incorrect email or password")]
    InvalidCredentials,

    #[error("auth secret is missing")]
    MissingSecret,

    #[error("auth secret is not valid hex: {0}")]
    InvalidSecret(String),
}

/// Email/password authentication with observable state.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Human-readable backend name (e.g. "postgres").
    fn name(&self) -> &str;

    /// Create an account and sign it in.
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Sign in to an existing account.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Sign out the current user. Signing out while signed out is a no-op.
    async fn sign_out(&self) -> Result<()>;

    /// The signed-in user, if any.
    fn current_user(&self) -> Option<AuthUser>;

    /// Observe sign-ins and sign-outs.
    fn subscribe(&self) -> AuthSubscription;
}

const _: () = {
    fn _assert_object_safe(_: &dyn AuthService) {}
};
