//! Account commands and the signed-in session shared by the other handlers.

use std::sync::Arc;

use anyhow::Result;
use sqlx::PgPool;
use tracing::debug;

use stayfit_core::ai::GeminiClient;
use stayfit_core::auth::PgAuth;
use stayfit_core::store::PgDocumentStore;
use stayfit_core::{AppSession, LoadOutcome, PlanOrchestrator};

use crate::Credentials;
use crate::config::StayfitConfig;

/// Build a session on the Postgres backends, with Gemini if configured.
pub fn build_session(config: &StayfitConfig, pool: &PgPool) -> AppSession {
    let planner = match &config.gemini {
        Some(gemini) => {
            let client = GeminiClient::new(gemini.clone());
            debug!(model = %client.config().model, "using Gemini for plan generation");
            PlanOrchestrator::with_generator(Arc::new(client))
        }
        None => PlanOrchestrator::offline(),
    };
    AppSession::new(
        Arc::new(PgAuth::new(pool.clone(), config.hasher.clone())),
        Arc::new(PgDocumentStore::new(pool.clone())),
        planner,
    )
}

/// Sign in and load the user's data.
pub async fn sign_in(
    config: &StayfitConfig,
    pool: &PgPool,
    credentials: &Credentials,
) -> Result<(AppSession, LoadOutcome)> {
    let mut session = build_session(config, pool);
    let loaded = session
        .sign_in(&credentials.email, &credentials.password)
        .await?;
    Ok((session, loaded))
}

/// Sign out, then return the command's result. A command error wins over
/// a sign-out error.
pub async fn finish<T>(mut session: AppSession, result: Result<T>) -> Result<T> {
    let signed_out = session.sign_out().await;
    let value = result?;
    signed_out?;
    Ok(value)
}

/// Execute `stayfit signup`.
pub async fn run_signup(
    config: &StayfitConfig,
    pool: &PgPool,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<()> {
    let mut session = build_session(config, pool);
    let user = session.sign_up(email, password, confirm).await?;

    println!("Account created.");
    println!();
    println!("  Email:   {}", user.email);
    println!("  User ID: {}", user.uid);
    println!();
    println!("Next: run `stayfit profile create` to set up your profile.");

    finish(session, Ok(())).await
}
