///
/// # Configuration
///
/// Settings read from a `rill.toml` file. Every key is optional and unknown
/// keys are rejected.
///
/// ```toml
/// [interpreter]
/// max_call_depth = 256
///
/// [dump]
/// show_ranges = true
/// ```
///
/// The file is found by walking up from the directory of the input file,
/// the same way a project root is found. An explicit path bypasses the
/// search.
///

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::interpreter::DEFAULT_MAX_CALL_DEPTH;

pub const CONFIG_FILE_NAME: &str = "rill.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error("max_call_depth must be at least 1")]
    ZeroCallDepth,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub interpreter: InterpreterConfig,
    pub dump: DumpConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterpreterConfig {
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DumpConfig {
    pub show_ranges: bool,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self { show_ranges: true }
    }
}

impl Config {
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Invalid {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;
        if config.interpreter.max_call_depth == 0 {
            return Err(ConfigError::ZeroCallDepth);
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading config");
        Self::from_toml(&content, path)
    }

    /// Loads `explicit` if given, else the nearest `rill.toml` above
    /// `start`, else the defaults.
    pub fn discover(explicit: Option<&Path>, start: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match find_config(start) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }
}

/// The nearest `rill.toml` in `start` or one of its ancestors. A file path
/// starts the search in its directory.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = if start.is_file() { start.parent()? } else { start };

    loop {
        let candidate = current.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = current.parent()?;
    }
}
