//! CLI handlers for `stayfit profile` subcommands.
//!
//! Implements:
//! - `stayfit profile create` -- save a profile and generate its first plan
//! - `stayfit profile show`   -- print the stored profile
//! - `stayfit profile update` -- overwrite the profile, keeping the plan

use anyhow::{Result, bail};
use sqlx::PgPool;

use stayfit_core::LoadOutcome;

use crate::ProfileCommands;
use crate::account::{finish, sign_in};
use crate::config::StayfitConfig;
use crate::render;

/// Dispatch a `ProfileCommands` variant to the appropriate handler.
pub async fn run_profile_command(
    command: ProfileCommands,
    config: &StayfitConfig,
    pool: &PgPool,
) -> Result<()> {
    match command {
        ProfileCommands::Create {
            credentials,
            profile,
        } => {
            let profile = profile.to_profile()?;
            let (mut session, _) = sign_in(config, pool, &credentials).await?;
            let result = session.submit_profile(profile).await.map_err(Into::into);
            let loaded = finish(session, result).await?;

            let LoadOutcome::Ready { profile, plan } = loaded else {
                bail!("profile was saved but could not be read back");
            };
            println!("Profile saved.");
            println!();
            print!("{}", render::profile(&profile));
            println!();
            print!("{}", render::stored_plan(&plan));
            Ok(())
        }
        ProfileCommands::Show { credentials } => {
            let (session, loaded) = sign_in(config, pool, &credentials).await?;
            finish(session, Ok(())).await?;

            match loaded {
                LoadOutcome::Ready { profile, .. } => print!("{}", render::profile(&profile)),
                LoadOutcome::NeedsProfile => {
                    println!("No profile yet. Use `stayfit profile create` to set one up.");
                }
            }
            Ok(())
        }
        ProfileCommands::Update {
            credentials,
            profile,
        } => {
            let profile = profile.to_profile()?;
            let (mut session, _) = sign_in(config, pool, &credentials).await?;
            let result = session
                .update_profile(profile)
                .await
                .map(Clone::clone)
                .map_err(Into::into);
            let updated = finish(session, result).await?;

            println!("Profile updated.");
            println!();
            print!("{}", render::profile(&updated));
            println!();
            println!("Run `stayfit plan regenerate` to get a plan for the new profile.");
            Ok(())
        }
    }
}
