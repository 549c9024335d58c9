//! Auth backend on the `accounts` table.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use stayfit_db::queries::accounts::{self, NewAccount};

use super::credentials::{PasswordHash, PasswordHasher, check_new_credentials, normalize_email};
use super::subscription::{AuthStateNotifier, AuthSubscription};
use super::{AuthError, AuthService, AuthUser, UserId};

/// Accounts in PostgreSQL; the signed-in user is held per instance.
pub struct PgAuth {
    pool: PgPool,
    hasher: PasswordHasher,
    state: AuthStateNotifier,
}

impl PgAuth {
    pub fn new(pool: PgPool, hasher: PasswordHasher) -> Self {
        Self {
            pool,
            hasher,
            state: AuthStateNotifier::new(),
        }
    }
}

#[async_trait]
impl AuthService for PgAuth {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        check_new_credentials(email, password)?;
        let email = normalize_email(email);
        let hashed = self.hasher.hash(password);

        let account = accounts::insert_account(
            &self.pool,
            &NewAccount {
                email: &email,
                password_salt: &hashed.salt,
                password_hash: &hashed.hash,
            },
        )
        .await?
        .ok_or_else(|| AuthError::EmailInUse(email.clone()))?;

        let user = AuthUser {
            uid: UserId::new(account.id.to_string()),
            email: account.email,
        };
        info!(uid = %user.uid, "account created");
        self.state.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let email = normalize_email(email);

        let account = accounts::get_account_by_email(&self.pool, &email)
            .await?
            .filter(|a| {
                let stored = PasswordHash {
                    salt: a.password_salt.clone(),
                    hash: a.password_hash.clone(),
                };
                self.hasher.verify(password, &stored)
            })
            .ok_or(AuthError::InvalidCredentials)?;

        let user = AuthUser {
            uid: UserId::new(account.id.to_string()),
            email: account.email,
        };
        info!(uid = %user.uid, "signed in");
        self.state.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(user) = self.state.current() {
            info!(uid = %user.uid, "signed out");
        }
        self.state.publish(None);
        Ok(())
    }

    fn current_user(&self) -> Option<AuthUser> {
        self.state.current()
    }

    fn subscribe(&self) -> AuthSubscription {
        self.state.subscribe()
    }
}
