//! Database query functions for the `accounts` table.

use anyhow::{Context, Result};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Account;

/// Credentials for a new account row. Hashing happens before this layer.
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password_salt: &'a str,
    pub password_hash: &'a str,
}

/// Insert an account. Returns `None` when the email is already registered.
pub async fn insert_account(pool: &PgPool, new: &NewAccount<'_>) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "INSERT INTO accounts (email, password_salt, password_hash) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (email) DO NOTHING \
         RETURNING *",
    )
    .bind(new.email)
    .bind(new.password_salt)
    .bind(new.password_hash)
    .fetch_optional(pool)
    .await
    .context("failed to insert account")?;

    Ok(account)
}

/// Fetch an account by email.
pub async fn get_account_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
        .context("failed to fetch account by email")?;

    Ok(account)
}

/// Fetch an account by its ID.
pub async fn get_account(pool: &PgPool, id: Uuid) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("failed to fetch account")?;

    Ok(account)
}

/// Count registered accounts.
pub async fn count_accounts(pool: &PgPool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
        .fetch_one(pool)
        .await
        .context("failed to count accounts")?;

    Ok(count)
}
