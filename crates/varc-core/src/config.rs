use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::{RetryPolicy, RetryableKinds};

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per chunk (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
    /// Restrict retries to socket-level failures (timeouts, resets) instead
    /// of also retrying throttling and 5xx responses.
    #[serde(default)]
    pub transport_errors_only: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
            transport_errors_only: false,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_secs_f64(self.base_delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs),
            retryable: if self.transport_errors_only {
                RetryableKinds::TRANSPORT_ONLY
            } else {
                RetryableKinds::default()
            },
        }
    }
}

/// Global configuration loaded from `~/.config/varc/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarcConfig {
    /// Vault service endpoint, e.g. `https://vault.eu-west-1.example.com`.
    /// Required unless passed on the command line.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Account owning the vaults; `-` means the credential owner.
    pub account_id: String,
    /// Byte-range size per chunk fetch. Keep a multiple of 1 MiB so the
    /// service returns per-range tree hashes.
    pub chunk_size_bytes: u64,
    /// Verify each chunk's tree hash before writing it.
    pub verify_hashes: bool,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for VarcConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            account_id: "-".to_string(),
            chunk_size_bytes: crate::downloader::DEFAULT_CHUNK_SIZE,
            verify_hashes: true,
            retry: None,
        }
    }
}

impl VarcConfig {
    /// Retry policy from the optional `[retry]` section, or the default.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(|r| r.to_policy())
            .unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("varc")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VarcConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VarcConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VarcConfig = toml::from_str(&data)?;
    Ok(cfg)
}
