use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Formspree form that receives cover-letter submissions.
pub const DEFAULT_LM_RELAY_URL: &str = "https://formspree.io/f/mzznvpvz";
/// CV submissions go to the same inbox unless `CV_RELAY_URL` says otherwise.
pub const DEFAULT_CV_RELAY_URL: &str = DEFAULT_LM_RELAY_URL;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackendKind {
    Memory,
    File,
    Redis,
}

impl FromStr for StorageBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            "redis" => Ok(Self::Redis),
            other => bail!("Unknown STORAGE_BACKEND '{other}' (expected memory, file or redis)"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub storage_backend: StorageBackendKind,
    pub data_dir: PathBuf,
    pub redis_url: Option<String>,
    pub cv_relay_url: String,
    pub lm_relay_url: String,
    /// `None` leaves relay calls without a client-side timeout.
    pub relay_timeout: Option<Duration>,
    pub anthropic_api_key: Option<String>,
    /// Delay clients wait on the success screen before navigating away.
    pub success_redirect_ms: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let storage_backend: StorageBackendKind = optional_env("STORAGE_BACKEND")
            .unwrap_or_else(|| "file".to_string())
            .parse()?;
        let redis_url = optional_env("REDIS_URL");
        if storage_backend == StorageBackendKind::Redis && redis_url.is_none() {
            bail!("REDIS_URL is required when STORAGE_BACKEND=redis");
        }

        Ok(Config {
            port: optional_env("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            storage_backend,
            data_dir: optional_env("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            redis_url,
            cv_relay_url: optional_env("CV_RELAY_URL")
                .unwrap_or_else(|| DEFAULT_CV_RELAY_URL.to_string()),
            lm_relay_url: optional_env("LM_RELAY_URL")
                .unwrap_or_else(|| DEFAULT_LM_RELAY_URL.to_string()),
            relay_timeout: optional_env("RELAY_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("RELAY_TIMEOUT_SECS must be a whole number of seconds")?
                .map(Duration::from_secs),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            success_redirect_ms: optional_env("SUCCESS_REDIRECT_MS")
                .unwrap_or_else(|| "2000".to_string())
                .parse::<u64>()
                .context("SUCCESS_REDIRECT_MS must be a whole number of milliseconds")?,
        })
    }

    /// In-memory configuration with no external services.
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Config {
            port: 0,
            rust_log: "debug".to_string(),
            storage_backend: StorageBackendKind::Memory,
            data_dir: PathBuf::from("./data"),
            redis_url: None,
            cv_relay_url: "http://relay.invalid/cv".to_string(),
            lm_relay_url: "http://relay.invalid/lm".to_string(),
            relay_timeout: None,
            anthropic_api_key: None,
            success_redirect_ms: 2000,
        }
    }
}

/// Reads an environment variable, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_kind_parses_case_insensitively() {
        assert_eq!("Redis".parse::<StorageBackendKind>().unwrap(), StorageBackendKind::Redis);
        assert_eq!(" file ".parse::<StorageBackendKind>().unwrap(), StorageBackendKind::File);
        assert!("sqlite".parse::<StorageBackendKind>().is_err());
    }

    #[test]
    fn test_testing_config_uses_memory_and_no_key() {
        let config = Config::for_testing();
        assert_eq!(config.storage_backend, StorageBackendKind::Memory);
        assert!(config.anthropic_api_key.is_none());
        assert!(config.relay_timeout.is_none());
    }
}
