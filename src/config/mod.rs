//! # Configuration
//!
//! Soulbound reads a single TOML file. Every section and every field has a default, so
//! an empty file (or a file with only `[service]`) is a valid configuration.
//!
//! ## Sections
//!
//! - [`ServiceConfig`] - base URL, anon key and timeout of the data service
//! - [`AuthConfig`] - auth provider URL, admin emails and the session cache file
//! - [`AutosaveConfig`] - quiet periods of the three debounced save streams
//! - [`CurrencyConfig`] - reserved currency names and starting balances
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use soulbound::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Config::create_default("soulbound.toml").await?;
//!     let config = Config::load("soulbound.toml").await?;
//!     println!("service: {}", config.service.base_url);
//!     Ok(())
//! }
//! ```
//!
//! ## File format
//!
//! ```toml
//! [service]
//! base_url = "https://example.supabase.co/functions/v1/make-server"
//! anon_key = "public-anon-key"
//! timeout_seconds = 10
//!
//! [auth]
//! url = "https://example.supabase.co"
//! admin_emails = ["keeper@example.com"]
//!
//! [autosave]
//! progress_debounce_ms = 1000
//!
//! [currencies.defaults]
//! primogems = 1280
//! ```

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::fs;

pub use crate::journey::currency::CurrencyConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
    #[serde(default)]
    pub currencies: CurrencyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the data API; paths such as `global/config` are joined onto it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Public key sent as the bearer token when no session is available.
    #[serde(default)]
    pub anon_key: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:54321/functions/v1/make-server".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            anon_key: String::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Root URL of the auth provider (password grant lives under `/auth/v1/token`).
    #[serde(default = "default_auth_url")]
    pub url: String,
    /// Accounts that may open the admin tools. Compared case-insensitively.
    #[serde(default)]
    pub admin_emails: Vec<String>,
    #[serde(default = "default_session_file")]
    pub session_file: String,
}

fn default_auth_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_session_file() -> String {
    ".soulbound-session.json".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            url: default_auth_url(),
            admin_emails: Vec::new(),
            session_file: default_session_file(),
        }
    }
}

/// Quiet period before each stream writes, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    #[serde(default = "default_narrative_debounce_ms")]
    pub narrative_debounce_ms: u64,
    #[serde(default = "default_progress_debounce_ms")]
    pub progress_debounce_ms: u64,
    #[serde(default = "default_template_debounce_ms")]
    pub template_debounce_ms: u64,
}

fn default_narrative_debounce_ms() -> u64 {
    2000
}

fn default_progress_debounce_ms() -> u64 {
    1000
}

fn default_template_debounce_ms() -> u64 {
    2000
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            narrative_debounce_ms: default_narrative_debounce_ms(),
            progress_debounce_ms: default_progress_debounce_ms(),
            template_debounce_ms: default_template_debounce_ms(),
        }
    }
}

impl AutosaveConfig {
    pub fn narrative_debounce(&self) -> Duration {
        Duration::from_millis(self.narrative_debounce_ms)
    }

    pub fn progress_debounce(&self) -> Duration {
        Duration::from_millis(self.progress_debounce_ms)
    }

    pub fn template_debounce(&self) -> Duration {
        Duration::from_millis(self.template_debounce_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Load from `path` when it exists, otherwise fall back to defaults.
    pub async fn load_or_default(path: &str) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load(path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Write a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.service.timeout_seconds, 10);
        assert_eq!(config.autosave.progress_debounce_ms, 1000);
        assert_eq!(config.currencies.defaults.primogems, 1280);
        assert_eq!(config.currencies.names.soft, "Mora");
        assert_eq!(config.logging.level, "info");
        assert!(config.auth.admin_emails.is_empty());
    }

    #[test]
    fn partial_sections_keep_field_defaults() {
        let raw = r#"
            [service]
            anon_key = "anon"

            [currencies.defaults]
            adventure_exp = 1250
            primogems = 10
            mora = 50000
        "#;
        let config: Config = toml::from_str(raw).unwrap();
        assert_eq!(config.service.anon_key, "anon");
        assert_eq!(config.service.base_url, default_base_url());
        assert_eq!(config.currencies.defaults.primogems, 10);
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let service = ServiceConfig {
            timeout_seconds: 0,
            ..ServiceConfig::default()
        };
        assert_eq!(service.timeout(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn create_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soulbound.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let config = Config::load(path).await.unwrap();
        assert_eq!(config.autosave.template_debounce_ms, 2000);
        assert!(Config::load("/definitely/missing.toml").await.is_err());
        assert_eq!(
            Config::load_or_default("/definitely/missing.toml")
                .await
                .unwrap()
                .service
                .timeout_seconds,
            10
        );
    }
}
