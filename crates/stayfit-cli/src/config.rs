//! Configuration file management for stayfit.
//!
//! Provides a TOML-based config file at `~/.config/stayfit/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use stayfit_core::ai::GeminiConfig;
use stayfit_core::auth::PasswordHasher;
use stayfit_db::config::DbConfig;

/// Env var holding the hex-encoded auth secret.
pub const AUTH_SECRET_ENV: &str = "STAYFIT_AUTH_SECRET";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub auth: AuthSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiSection>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthSection {
    /// Hex-encoded password hashing secret (64 hex chars = 32 bytes).
    pub secret: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiSection {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the stayfit config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/stayfit` or `~/.config/stayfit`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("stayfit");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("stayfit")
}

/// Return the path to the stayfit config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Generate a random auth secret: 32 random bytes, hex-encoded (64 chars).
pub fn generate_auth_secret() -> String {
    use rand::Rng;
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct StayfitConfig {
    pub db_config: DbConfig,
    pub hasher: PasswordHasher,
    /// `None` means plans always come from the local generator.
    pub gemini: Option<GeminiConfig>,
}

impl StayfitConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `STAYFIT_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - Auth secret: `STAYFIT_AUTH_SECRET` > `auth.secret` > error
    /// - Gemini: `GEMINI_API_KEY` (+ model/base URL env) > `[gemini]` > none
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let file_config = load_config().ok();

        let db_url = if let Some(url) = cli_db_url {
            url.to_string()
        } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
            url
        } else if let Some(ref cfg) = file_config {
            cfg.database.url.clone()
        } else {
            DbConfig::DEFAULT_URL.to_string()
        };
        let db_config = DbConfig::new(db_url);

        let hasher = if let Ok(secret_hex) = std::env::var(AUTH_SECRET_ENV) {
            PasswordHasher::from_hex(&secret_hex)
                .with_context(|| format!("{AUTH_SECRET_ENV} env var is not a usable secret"))?
        } else if let Some(ref cfg) = file_config {
            PasswordHasher::from_hex(&cfg.auth.secret)
                .context("invalid auth.secret in config file")?
        } else {
            bail!(
                "auth secret not found; set {AUTH_SECRET_ENV} or run `stayfit init` to create a config file"
            );
        };

        let gemini = GeminiConfig::from_env().or_else(|| {
            let section = file_config.as_ref()?.gemini.as_ref()?;
            if section.api_key.trim().is_empty() {
                return None;
            }
            let config = GeminiConfig::new(section.api_key.trim());
            Some(match &section.model {
                Some(model) => config.with_model(model.clone()),
                None => config,
            })
        });

        Ok(Self {
            db_config,
            hasher,
            gemini,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        crate::test_util::lock_env()
    }

    /// Point the config directory at a fresh temp dir and clear every
    /// variable `resolve` reads. The returned dir must outlive the test.
    fn isolate_env() -> tempfile::TempDir {
        let tmp = tempfile::TempDir::new().unwrap();
        unsafe { std::env::set_var("XDG_CONFIG_HOME", tmp.path()) };
        for var in [
            DbConfig::ENV_VAR,
            AUTH_SECRET_ENV,
            "GEMINI_API_KEY",
            "STAYFIT_GEMINI_MODEL",
            "STAYFIT_GEMINI_BASE_URL",
        ] {
            unsafe { std::env::remove_var(var) };
        }
        tmp
    }

    fn sample_config() -> ConfigFile {
        ConfigFile {
            database: DatabaseSection {
                url: "postgresql://filehost:5432/filedb".to_string(),
            },
            auth: AuthSection {
                secret: "aa".repeat(32),
            },
            gemini: None,
        }
    }

    #[test]
    fn generate_auth_secret_is_64_hex_chars() {
        let secret = generate_auth_secret();
        assert_eq!(secret.len(), 64);
        assert!(
            secret.chars().all(|c| c.is_ascii_hexdigit()),
            "expected all hex digits, got: {secret}"
        );
        assert_ne!(secret, generate_auth_secret());
    }

    #[test]
    fn save_and_load_config_roundtrip() {
        let _lock = lock_env();
        let _tmp = isolate_env();

        let mut original = sample_config();
        original.gemini = Some(GeminiSection {
            api_key: "key-123".to_string(),
            model: None,
        });
        save_config(&original).unwrap();

        let loaded = load_config().unwrap();
        assert_eq!(loaded.database.url, original.database.url);
        assert_eq!(loaded.auth.secret, original.auth.secret);
        let gemini = loaded.gemini.expect("gemini section should survive");
        assert_eq!(gemini.api_key, "key-123");
        assert_eq!(gemini.model, None);
    }

    #[test]
    fn gemini_section_is_optional() {
        let parsed: ConfigFile = toml::from_str(
            "[database]\nurl = \"postgresql://h/db\"\n\n[auth]\nsecret = \"abcd\"\n",
        )
        .unwrap();
        assert!(parsed.gemini.is_none());
        let written = toml::to_string_pretty(&parsed).unwrap();
        assert!(!written.contains("gemini"));
    }

    #[cfg(unix)]
    #[test]
    fn save_config_sets_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let _tmp = isolate_env();

        save_config(&sample_config()).unwrap();
        let meta = std::fs::metadata(config_path()).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }

    #[test]
    fn resolve_with_cli_flag_overrides_all() {
        let _lock = lock_env();
        let _tmp = isolate_env();
        save_config(&sample_config()).unwrap();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };

        let config = StayfitConfig::resolve(Some("postgresql://cli:5432/clidb")).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://cli:5432/clidb");

        unsafe { std::env::remove_var(DbConfig::ENV_VAR) };
    }

    #[test]
    fn resolve_with_env_var_overrides_config_file() {
        let _lock = lock_env();
        let _tmp = isolate_env();
        save_config(&sample_config()).unwrap();
        unsafe { std::env::set_var(DbConfig::ENV_VAR, "postgresql://env:5432/envdb") };

        let config = StayfitConfig::resolve(None).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://env:5432/envdb");

        unsafe { std::env::remove_var(DbConfig::ENV_VAR) };
    }

    #[test]
    fn resolve_reads_config_file() {
        let _lock = lock_env();
        let _tmp = isolate_env();
        let mut file = sample_config();
        file.gemini = Some(GeminiSection {
            api_key: "file-key".to_string(),
            model: Some("gemini-1.5-pro".to_string()),
        });
        save_config(&file).unwrap();

        let config = StayfitConfig::resolve(None).unwrap();
        assert_eq!(config.db_config.database_url, "postgresql://filehost:5432/filedb");
        let gemini = config.gemini.expect("gemini configured from file");
        assert_eq!(gemini.api_key, "file-key");
        assert_eq!(gemini.model, "gemini-1.5-pro");
    }

    #[test]
    fn resolve_defaults_db_url_and_skips_gemini() {
        let _lock = lock_env();
        let _tmp = isolate_env();
        unsafe { std::env::set_var(AUTH_SECRET_ENV, "aa55".repeat(16)) };

        let config = StayfitConfig::resolve(None).unwrap();
        assert_eq!(config.db_config.database_url, DbConfig::DEFAULT_URL);
        assert!(config.gemini.is_none());

        unsafe { std::env::remove_var(AUTH_SECRET_ENV) };
    }

    #[test]
    fn resolve_rejects_non_hex_secret() {
        let _lock = lock_env();
        let _tmp = isolate_env();
        unsafe { std::env::set_var(AUTH_SECRET_ENV, "not-hex") };

        let result = StayfitConfig::resolve(None);
        unsafe { std::env::remove_var(AUTH_SECRET_ENV) };

        let msg = format!("{:#}", result.unwrap_err());
        assert!(msg.contains(AUTH_SECRET_ENV), "unexpected error: {msg}");
    }

    #[test]
    fn resolve_errors_when_no_auth_secret() {
        let _lock = lock_env();
        let _tmp = isolate_env();

        let result = StayfitConfig::resolve(Some("postgresql://localhost:5432/stayfit"));

        assert!(result.is_err(), "should error when no auth secret");
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("auth secret not found"), "unexpected error: {msg}");
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("stayfit/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
