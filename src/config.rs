use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const HOME_ENV: &str = "INSIGHTBOARD_HOME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Quiet period after the last buffer growth before a message is extracted.
    pub debounce_ms: u64,
    /// Marker-free buffers shorter than this are treated as still streaming.
    pub min_message_len: usize,
    /// Characters of the user query compared when deduplicating query groups.
    pub query_match_prefix: usize,
    /// Stored query text is truncated to this many characters.
    pub query_display_len: usize,
    /// Overrides `<home>/state` as the persistence directory.
    pub state_dir: Option<PathBuf>,
    /// Delay between chunks streamed by the demo assistant.
    pub demo_chunk_delay_ms: u64,
    pub demo_chunk_chars: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 800,
            min_message_len: 20,
            query_match_prefix: 50,
            query_display_len: 100,
            state_dir: None,
            demo_chunk_delay_ms: 40,
            demo_chunk_chars: 24,
        }
    }
}

impl DashboardConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn demo_chunk_delay(&self) -> Duration {
        Duration::from_millis(self.demo_chunk_delay_ms)
    }

    pub fn state_dir(&self, home: &Path) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(|| home.join("state"))
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_slice(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }

    /// Reads `<home>/config.json`, falling back to defaults when the file is
    /// absent or unreadable.
    pub fn load_or_default(home: &Path) -> Self {
        let path = home.join("config.json");
        match Self::load_from(&path) {
            Ok(Some(config)) => {
                tracing::info!(path = %path.display(), "loaded dashboard config");
                config
            }
            Ok(None) => Self::default(),
            Err(err) => {
                tracing::warn!("{err}; using default config");
                Self::default()
            }
        }
    }
}

pub fn home_dir() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return PathBuf::from(home);
    }
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".insightboard")
}
