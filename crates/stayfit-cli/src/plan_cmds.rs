//! CLI handlers for `stayfit plan` subcommands.
//!
//! Implements:
//! - `stayfit plan show`       -- print the stored plan
//! - `stayfit plan regenerate` -- request a new plan for the stored profile
//! - `stayfit plan preview`    -- compute the standard plan offline

use anyhow::{Context, Result};
use sqlx::PgPool;

use stayfit_core::LoadOutcome;
use stayfit_core::plan::fallback_plan;

use crate::account::{finish, sign_in};
use crate::config::StayfitConfig;
use crate::{PlanCommands, ProfileArgs, render};

/// Dispatch a `PlanCommands` variant to the appropriate handler.
pub async fn run_plan_command(
    command: PlanCommands,
    config: &StayfitConfig,
    pool: &PgPool,
) -> Result<()> {
    match command {
        PlanCommands::Show { credentials, json } => {
            let (session, loaded) = sign_in(config, pool, &credentials).await?;
            finish(session, Ok(())).await?;

            let LoadOutcome::Ready { plan, .. } = loaded else {
                println!("No profile yet. Use `stayfit profile create` to get a plan.");
                return Ok(());
            };
            if json {
                let text = serde_json::to_string_pretty(&plan.plan)
                    .context("failed to serialize plan")?;
                println!("{text}");
            } else {
                print!("{}", render::stored_plan(&plan));
            }
            Ok(())
        }
        PlanCommands::Regenerate { credentials } => {
            let (mut session, _) = sign_in(config, pool, &credentials).await?;
            let result = session.regenerate_plan().await.map_err(Into::into);
            let plan = finish(session, result).await?;

            println!("Plan regenerated.");
            println!();
            print!("{}", render::stored_plan(&plan));
            Ok(())
        }
        PlanCommands::Preview { profile, json } => cmd_preview(&profile, json),
    }
}

/// Execute `stayfit plan preview`: no config, database or network needed.
pub fn cmd_preview(args: &ProfileArgs, json: bool) -> Result<()> {
    let profile = args.to_profile()?;
    let plan = fallback_plan(&profile)?;

    if json {
        let text = serde_json::to_string_pretty(&plan).context("failed to serialize plan")?;
        println!("{text}");
    } else {
        print!("{}", render::profile(&profile));
        println!();
        print!("{}", render::plan(&plan));
    }
    Ok(())
}
