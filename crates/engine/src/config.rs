use crate::present::DEFAULT_LONG_ARTICLE_THRESHOLD;
use crate::scheduler::DEFAULT_DEBOUNCE;
use serde::{Deserialize, Serialize};
use settings::StoreArea;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEBUG_ENV: &str = "SDLENS_DEBUG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("failed to parse {path}: {error}")]
    Toml {
        path: PathBuf,
        #[source]
        error: toml::de::Error,
    },
    /// A threshold of 0 would collapse every non-empty article, which `minimizeLongArticles`
    /// never means; the smallest accepted value is 1.
    #[error("long_article_threshold must be at least 1 (articles collapse above this many lines)")]
    ZeroThreshold,
}

/// Engine tunables, read from a TOML file. Missing keys take their defaults.
///
/// ```toml
/// debounce_ms = 120
/// long_article_threshold = 50
/// store_area = "sync"
/// debug = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub debounce_ms: u64,
    /// Articles with more rendered lines than this start collapsed when `minimizeLongArticles`
    /// is on. Must be at least 1.
    pub long_article_threshold: usize,
    pub store_area: StoreArea,
    pub debug: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            long_article_threshold: DEFAULT_LONG_ARTICLE_THRESHOLD,
            store_area: StoreArea::default(),
            debug: false,
        }
    }
}

impl EngineConfig {
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text).map_err(|error| ConfigError::Toml {
            path: path.to_path_buf(),
            error,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_toml(path, &text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.long_article_threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        Ok(())
    }

    /// `SDLENS_DEBUG=1` (or `true`) turns debug logging on regardless of the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(DEBUG_ENV) {
            self.debug = debug_flag(&value);
        }
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn debug_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
