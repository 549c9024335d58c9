mod account;
mod config;
mod plan_cmds;
mod profile_cmds;
mod render;
#[cfg(test)]
mod test_util;

use clap::{Args, Parser, Subcommand};

use stayfit_core::{FitnessGoal, ProfileError, UserProfile};
use stayfit_db::pool;

use config::StayfitConfig;

#[derive(Parser)]
#[command(name = "stayfit", about = "Diet plans for your fitness goal")]
struct Cli {
    /// Database URL (overrides STAYFIT_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a stayfit config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/stayfit")]
        db_url: String,
        /// Gemini API key for AI-generated plans
        #[arg(long)]
        gemini_api_key: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Initialize the stayfit database (requires config file or env vars)
    DbInit,
    /// Create an account
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STAYFIT_PASSWORD", hide_env_values = true)]
        password: String,
        /// Password confirmation (defaults to --password)
        #[arg(long)]
        confirm: Option<String>,
    },
    /// Profile management
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Diet plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Save your profile and generate your first plan
    Create {
        #[command(flatten)]
        credentials: Credentials,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Show your profile
    Show {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Change your profile (the plan is kept until you regenerate it)
    Update {
        #[command(flatten)]
        credentials: Credentials,
        #[command(flatten)]
        profile: ProfileArgs,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show your current plan
    Show {
        #[command(flatten)]
        credentials: Credentials,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a new plan from your current profile
    Regenerate {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Compute the standard plan for a profile (no database, no AI)
    Preview {
        #[command(flatten)]
        profile: ProfileArgs,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
pub struct Credentials {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "STAYFIT_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    pub name: String,
    /// Years
    #[arg(long)]
    pub age: u32,
    /// Kilograms
    #[arg(long)]
    pub weight: f64,
    /// Centimetres
    #[arg(long)]
    pub height: f64,
    /// muscle_gain, fat_loss or weight_gain
    #[arg(long)]
    pub goal: FitnessGoal,
}

impl ProfileArgs {
    pub fn to_profile(&self) -> Result<UserProfile, ProfileError> {
        UserProfile::new(&self.name, self.age, self.weight, self.height, self.goal)
    }
}

/// Execute the `stayfit init` command: write config file.
fn cmd_init(db_url: &str, gemini_api_key: Option<&str>, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let secret = config::generate_auth_secret();

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        auth: config::AuthSection {
            secret: secret.clone(),
        },
        gemini: gemini_api_key.map(|key| config::GeminiSection {
            api_key: key.to_string(),
            model: None,
        }),
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  auth.secret = {}...{}", &secret[..8], &secret[56..]);
    if cfg.gemini.is_some() {
        println!("  gemini.api_key = (set)");
    }
    println!();
    println!("Next: run `stayfit db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `stayfit db-init` command: create database and run migrations.
async fn cmd_db_init(cli_db_url: Option<&str>) -> anyhow::Result<()> {
    let resolved = StayfitConfig::resolve(cli_db_url)?;

    println!("Initializing stayfit database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::store_counts(&db_pool).await?;
    println!("Database ready.");
    println!("  accounts: {}", counts.accounts);
    for (collection, count) in &counts.documents {
        println!("  {collection}: {count} documents");
    }

    db_pool.close().await;

    println!("stayfit db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            db_url,
            gemini_api_key,
            force,
        } => {
            cmd_init(&db_url, gemini_api_key.as_deref(), force)?;
        }
        Commands::DbInit => {
            cmd_db_init(cli.database_url.as_deref()).await?;
        }
        Commands::Signup {
            email,
            password,
            confirm,
        } => {
            let resolved = StayfitConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let confirm = confirm.as_deref().unwrap_or(&password);
            let result = account::run_signup(&resolved, &db_pool, &email, &password, confirm).await;
            db_pool.close().await;
            result?;
        }
        Commands::Profile { command } => {
            let resolved = StayfitConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = profile_cmds::run_profile_command(command, &resolved, &db_pool).await;
            db_pool.close().await;
            result?;
        }
        Commands::Plan {
            command: PlanCommands::Preview { profile, json },
        } => {
            plan_cmds::cmd_preview(&profile, json)?;
        }
        Commands::Plan { command } => {
            let resolved = StayfitConfig::resolve(cli.database_url.as_deref())?;
            let db_pool = pool::create_pool(&resolved.db_config).await?;
            let result = plan_cmds::run_plan_command(command, &resolved, &db_pool).await;
            db_pool.close().await;
            result?;
        }
    }

    Ok(())
}
