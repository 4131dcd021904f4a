use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub(crate) const DATA_DIR_ENV: &str = "CHATLEDGER_DATA_DIR";
const DB_FILE: &str = "chatledger.db";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Overrides the platform data directory for the database.
    pub data_dir: Option<PathBuf>,
    /// Seconds before an unconfirmed proposal expires; 0 keeps it forever.
    pub pending_ttl_secs: u64,
    pub flush_interval_ms: u64,
    /// Save attempts per key on each flush.
    pub flush_retries: u32,
    pub log_level: String,
    pub default_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: None,
            pending_ttl_secs: 3600,
            flush_interval_ms: 500,
            flush_retries: 3,
            log_level: "info".to_string(),
            default_language: "en".to_string(),
        }
    }
}

impl Settings {
    pub(crate) fn pending_ttl(&self) -> Option<chrono::Duration> {
        if self.pending_ttl_secs == 0 {
            return None;
        }
        let secs = i64::try_from(self.pending_ttl_secs).unwrap_or(i64::MAX);
        chrono::Duration::try_seconds(secs)
    }

    pub(crate) fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms.max(1))
    }

    pub(crate) fn flush_retries(&self) -> u32 {
        self.flush_retries.max(1)
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "chatledger", "ChatLedger")
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))
}

pub(crate) fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.json"))
}

/// Settings from the user's config file. A missing file gives defaults.
pub(crate) fn load_settings() -> Result<Settings> {
    load_from(&config_path()?)
}

pub(crate) fn load_from(path: &Path) -> Result<Settings> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config: {}", path.display()))
        }
    };
    serde_json::from_str(&content)
        .with_context(|| format!("Corrupt config: {}", path.display()))
}

/// Database directory: the environment override, then the setting, then
/// the platform data directory.
pub(crate) fn resolve_data_dir(settings: &Settings, env_override: Option<String>) -> Result<PathBuf> {
    if let Some(dir) = env_override.filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(dir) = &settings.data_dir {
        return Ok(dir.clone());
    }
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub(crate) fn db_path(settings: &Settings) -> Result<PathBuf> {
    let data_dir = resolve_data_dir(settings, std::env::var(DATA_DIR_ENV).ok())?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    Ok(data_dir.join(DB_FILE))
}
