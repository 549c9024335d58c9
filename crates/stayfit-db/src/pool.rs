use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::config::DbConfig;
use crate::models::Collection;
use crate::queries::{accounts, documents};

/// Migrations embedded at compile time from `crates/stayfit-db/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

async fn connect(url: &str, max_connections: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(url)
        .await
        .with_context(|| format!("failed to connect to database at {url}"))
}

/// Open the pool shared by the account and document stores.
pub async fn create_pool(config: &DbConfig) -> Result<PgPool> {
    connect(&config.database_url, 5).await
}

/// Apply pending migrations (accounts and documents tables).
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    MIGRATOR
        .run(pool)
        .await
        .context("failed to run database migrations")?;

    info!("migrations applied successfully");
    Ok(())
}

/// Create the configured database through the `postgres` maintenance
/// database if it does not exist yet.
pub async fn ensure_database_exists(config: &DbConfig) -> Result<()> {
    let db_name = config
        .database_name()
        .context("could not determine database name from URL")?;
    // CREATE DATABASE cannot take a bind parameter.
    if !db_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        anyhow::bail!("database name {db_name:?} contains invalid characters");
    }

    let maint_pool = connect(&config.maintenance_url(), 1).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&maint_pool)
            .await
            .context("failed to query pg_database")?;

    if exists {
        info!(db = db_name, "database already exists");
    } else {
        maint_pool
            .execute(format!("CREATE DATABASE {db_name}").as_str())
            .await
            .with_context(|| format!("failed to create database {db_name}"))?;
        info!(db = db_name, "database created");
    }

    maint_pool.close().await;
    Ok(())
}

/// What the store currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCounts {
    pub accounts: i64,
    /// Documents per collection, in [`Collection::ALL`] order.
    pub documents: Vec<(Collection, i64)>,
}

/// Count accounts and the documents in each collection.
///
/// Used by the `stayfit db-init` success message.
pub async fn store_counts(pool: &PgPool) -> Result<StoreCounts> {
    let accounts = accounts::count_accounts(pool).await?;
    let mut docs = Vec::with_capacity(Collection::ALL.len());
    for collection in Collection::ALL {
        docs.push((collection, documents::count_documents(pool, collection).await?));
    }
    Ok(StoreCounts {
        accounts,
        documents: docs,
    })
}
