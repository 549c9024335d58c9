//! Process-local auth backend.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

use super::credentials::{PasswordHash, PasswordHasher, check_new_credentials, normalize_email};
use super::subscription::{AuthStateNotifier, AuthSubscription};
use super::{AuthError, AuthService, AuthUser, UserId};

struct MemoryAccount {
    uid: UserId,
    password: PasswordHash,
}

/// Accounts kept in a map; nothing survives the process.
pub struct MemoryAuth {
    hasher: PasswordHasher,
    accounts: Mutex<HashMap<String, MemoryAccount>>,
    state: AuthStateNotifier,
}

impl MemoryAuth {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self {
            hasher,
            accounts: Mutex::new(HashMap::new()),
            state: AuthStateNotifier::new(),
        }
    }

    fn accounts(&self) -> std::sync::MutexGuard<'_, HashMap<String, MemoryAccount>> {
        // Critical sections never panic, so a poisoned lock still holds
        // consistent data.
        self.accounts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl AuthService for MemoryAuth {
    fn name(&self) -> &str {
        "memory"
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        check_new_credentials(email, password)?;
        let email = normalize_email(email);

        let user = {
            let mut accounts = self.accounts();
            if accounts.contains_key(&email) {
                return Err(AuthError::EmailInUse(email).into());
            }
            let uid = UserId::new(Uuid::new_v4().to_string());
            accounts.insert(
                email.clone(),
                MemoryAccount {
                    uid: uid.clone(),
                    password: self.hasher.hash(password),
                },
            );
            AuthUser { uid, email }
        };

        info!(uid = %user.uid, "account created");
        self.state.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        let email = normalize_email(email);

        let user = {
            let accounts = self.accounts();
            let account = accounts
                .get(&email)
                .filter(|a| self.hasher.verify(password, &a.password))
                .ok_or(AuthError::InvalidCredentials)?;
            AuthUser {
                uid: account.uid.clone(),
                email,
            }
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
