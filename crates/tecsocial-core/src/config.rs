//! Application configuration management.
//!
//! Holds the backend location, endpoint paths, retry tuning and the last
//! email used to log in. Stored at `~/.config/tecsocial/config.json`; a
//! missing file means defaults. `TECSOCIAL_*` environment variables
//! override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::retry::{
    Backoff, RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS, DEFAULT_RETRY_DELAY_MS,
};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "tecsocial";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_BASE_URL: &str = "https://tec-social-network.onrender.com/api";

/// Per-attempt timeout for the health probe.
/// Short so a sleeping backend costs one attempt, not the whole budget.
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub health_path: String,
    pub login_path: String,
    pub signup_path: String,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub backoff: Backoff,
    pub max_delay_ms: u64,
    pub probe_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            health_path: "/health".to_string(),
            login_path: "/auth/login".to_string(),
            signup_path: "/auth/signup".to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            backoff: Backoff::Fixed,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read the config file alone, without environment overrides.
    fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to parse config file")
    }

    fn save_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Record the email of a successful login.
    ///
    /// Only `last_email` is written back; everything else on disk is kept
    /// as it was, so environment overrides never end up in the file.
    pub fn remember_email(&mut self, email: &str) -> Result<()> {
        self.last_email = Some(email.to_string());
        Self::remember_email_in(&Self::config_path()?, email)
    }

    fn remember_email_in(path: &Path, email: &str) -> Result<()> {
        let mut on_disk = Self::load_file(path)?;
        on_disk.last_email = Some(email.to_string());
        on_disk.save_file(path)
    }

    /// Apply `TECSOCIAL_*` overrides. Unparseable numbers are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TECSOCIAL_BASE_URL") {
            self.base_url = url;
        }
        if let Some(n) = lookup("TECSOCIAL_MAX_ATTEMPTS").and_then(|v| v.parse().ok()) {
            self.max_attempts = n;
        }
        if let Some(ms) = lookup("TECSOCIAL_RETRY_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.retry_delay_ms = ms;
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Join an API path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
            backoff: self.backoff,
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_attempts, 12);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.probe_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"base_url": "http://localhost:3000/api", "backoff": "exponential"}"#)
                .unwrap();
        assert_eq!(config.base_url, "http://localhost:3000/api");
        assert_eq!(config.backoff, Backoff::Exponential);
        assert_eq!(config.login_path, "/auth/login");
    }

    #[test]
    fn test_url_joining() {
        let mut config = Config::default();
        config.base_url = "http://host/api/".to_string();
        assert_eq!(config.url("/posts?page=1"), "http://host/api/posts?page=1");
        assert_eq!(config.url("health"), "http://host/api/health");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "TECSOCIAL_BASE_URL" => Some("http://127.0.0.1:9/api".to_string()),
            "TECSOCIAL_MAX_ATTEMPTS" => Some("3".to_string()),
            "TECSOCIAL_RETRY_DELAY_MS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://127.0.0.1:9/api");
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.retry_delay_ms, DEFAULT_RETRY_DELAY_MS);
    }

    #[test]
    fn test_remember_email_keeps_env_out_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(APP_NAME).join(CONFIG_FILE);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"base_url": "http://saved:3000/api", "max_attempts": 4}"#).unwrap();

        let mut config = Config::load_file(&path).unwrap();
        config.apply_env(|key| match key {
            "TECSOCIAL_BASE_URL" => Some("http://one-off:9/api".to_string()),
            "TECSOCIAL_MAX_ATTEMPTS" => Some("2".to_string()),
            _ => None,
        });
        Config::remember_email_in(&path, "ana@example.com").unwrap();

        let reloaded = Config::load_file(&path).unwrap();
        assert_eq!(reloaded.base_url, "http://saved:3000/api");
        assert_eq!(reloaded.max_attempts, 4);
        assert_eq!(reloaded.last_email.as_deref(), Some("ana@example.com"));
        // The running config still sees the override
        assert_eq!(config.base_url, "http://one-off:9/api");
    }

    #[test]
    fn test_remember_email_without_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh").join(CONFIG_FILE);

        Config::remember_email_in(&path, "a@b.com").unwrap();

        let reloaded = Config::load_file(&path).unwrap();
        assert_eq!(reloaded.base_url, DEFAULT_BASE_URL);
        assert_eq!(reloaded.last_email.as_deref(), Some("a@b.com"));
    }
}
