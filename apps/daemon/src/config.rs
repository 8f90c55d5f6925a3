//! Daemon configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/vestlink/daemon.toml`
//! - Windows: `%APPDATA%/vestlink/daemon.toml`

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use vestlink_protocol::GameId;
use vestlink_protocol::constants::{DEFAULT_HOST, DEFAULT_PORT, POLL_INTERVAL};

/// Daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind address for the control protocol.
    #[serde(default = "default_host")]
    pub host: String,

    /// Control protocol port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log poll interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Per-game log path overrides, keyed by game prefix
    /// (`alyx`, `hl2dm`, `starcitizen`, `forhonor`).
    #[serde(default)]
    pub log_paths: HashMap<String, String>,
}

fn default_host() -> String {
    DEFAULT_HOST.into()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL.as_millis() as u64
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            poll_interval_ms: default_poll_interval_ms(),
            log_paths: HashMap::new(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Saves the current configuration to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Log path overrides with recognized game prefixes, as typed keys.
    /// Unknown prefixes are logged and skipped rather than rejected.
    pub fn log_overrides(&self) -> HashMap<GameId, PathBuf> {
        let mut overrides = HashMap::new();
        for (prefix, path) in &self.log_paths {
            match GameId::from_prefix(prefix) {
                Some(game) => {
                    overrides.insert(game, PathBuf::from(path));
                }
                None => {
                    tracing::warn!(prefix, "ignoring log path override for unknown game");
                }
            }
        }
        overrides
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("vestlink").join("daemon.toml"))
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("vestlink")
            .join("daemon.toml"))
    }
}
