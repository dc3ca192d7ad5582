use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::records::DEFAULT_RECORDS_KEY;

/// Curl transfer tuning (optional `[transfer]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Seconds allowed for the TCP/TLS connect phase.
    pub connect_timeout_secs: u64,
    /// Upper bound on a whole transfer, in seconds.
    pub timeout_secs: u64,
    /// Abort as timed out when throughput stays below this many bytes/sec...
    pub low_speed_limit: u32,
    /// ...for this many seconds.
    pub low_speed_time_secs: u64,
    /// Optional User-Agent header.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 30,
            timeout_secs: 3600,
            low_speed_limit: 1024,
            low_speed_time_secs: 60,
            user_agent: None,
        }
    }
}

/// Global configuration loaded from `~/.config/clipdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipdlConfig {
    /// Spacing between consecutive batch submissions, in milliseconds.
    pub stagger_ms: u64,
    /// Namespaced key the record set is persisted under.
    pub records_key: String,
    /// Where finished files land (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Record database path (None = `~/.local/state/clipdl/records.db`).
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default)]
    pub transfer: TransferConfig,
}

impl Default for ClipdlConfig {
    fn default() -> Self {
        Self {
            stagger_ms: 400,
            records_key: DEFAULT_RECORDS_KEY.to_string(),
            download_dir: None,
            database_path: None,
            transfer: TransferConfig::default(),
        }
    }
}

impl ClipdlConfig {
    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("clipdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// State directory for the database and log: `~/.local/state/clipdl`.
pub fn state_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("clipdl")?;
    Ok(xdg_dirs.get_state_home().join("clipdl"))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ClipdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ClipdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: ClipdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
