//! Configuration: `~/.config/autobook/config.toml` plus environment overrides
//! for secrets. The raw file maps onto [`AutobookConfig`]; [`AutobookConfig::validate`]
//! turns it into the immutable [`Settings`] every component receives.

mod validate;

pub use validate::{ConfigError, RunSettings, Settings};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.urbansportsclub.com/api/v5";

/// `[account]`: login for the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountConfig {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `[api]`: endpoint, OAuth client, and the headers the mobile client sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub user_agent: String,
    pub accept_language: String,
    pub accept_encoding: String,
    /// Total per-request timeout in seconds.
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            user_agent: "USCAPP/4.0.8 (android; 28; Scale/2.75)".to_string(),
            accept_language: "en-US;q=1.0".to_string(),
            accept_encoding: "gzip, deflate".to_string(),
            request_timeout_secs: 30,
            connect_timeout_secs: 15,
        }
    }
}

/// `[booking]`: what to book and how often to look.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Venue id; 0 means "not configured".
    #[serde(default)]
    pub location_id: u64,
    pub advance_days: u32,
    /// Book on the Monday on or before `today + advance_days`.
    #[serde(default)]
    pub align_to_monday: bool,
    pub poll_interval_secs: u64,
    pub page_size: u32,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            location_id: 0,
            advance_days: 14,
            align_to_monday: false,
            poll_interval_secs: 1800,
            page_size: 100,
        }
    }
}

/// `[filters]`: all optional; empty strings mean "not set".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instructor: String,
    /// `HH:MM`, inclusive.
    #[serde(default)]
    pub time_start: String,
    /// `HH:MM`, inclusive.
    #[serde(default)]
    pub time_end: String,
    /// Offset such as `+01:00` for the time window; machine offset if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries for search and login.
    pub read_max_retries: u32,
    /// Retries for the booking call.
    pub write_max_retries: u32,
    /// Backoff before retry n is `backoff_unit_ms * backoff_base^n`.
    pub backoff_base: f64,
    pub backoff_unit_ms: u64,
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            read_max_retries: 3,
            write_max_retries: 2,
            backoff_base: 2.0,
            backoff_unit_ms: 1000,
            max_delay_secs: 60,
        }
    }
}

/// Whole configuration file as written on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutobookConfig {
    #[serde(default)]
    pub account: AccountConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub filters: FilterConfig,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryConfig>,
}

impl AutobookConfig {
    /// Override values from `AUTOBOOK_*` variables, looked up through `var`
    /// so tests need not touch the process environment. Non-empty values win
    /// over the file.
    pub fn apply_env_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        if let Some(v) = get("AUTOBOOK_EMAIL") {
            self.account.email = v;
        }
        if let Some(v) = get("AUTOBOOK_PASSWORD") {
            self.account.password = v;
        }
        if let Some(v) = get("AUTOBOOK_CLIENT_ID") {
            self.api.client_id = v;
        }
        if let Some(v) = get("AUTOBOOK_CLIENT_SECRET") {
            self.api.client_secret = v;
        }
        if let Some(v) = get("AUTOBOOK_LOCATION_ID") {
            self.booking.location_id = v.trim().parse().map_err(|_| ConfigError::Invalid {
                field: "AUTOBOOK_LOCATION_ID",
                value: v.clone(),
                reason: "expected a positive integer",
            })?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("autobook")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from `path` (or the XDG default), creating a default
/// file if none exists. The defaults lack credentials, so validation of a
/// freshly created file fails with a pointer to what to fill in.
pub fn load_or_init(path: Option<&Path>) -> Result<AutobookConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };
    if !path.exists() {
        let default_cfg = AutobookConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml).with_context(|| format!("write {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AutobookConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
