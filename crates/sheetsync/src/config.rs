//! Configuration for `sheetsync`.
//!
//! Settings live in a `sheetsync.toml` file. Every key is optional:
//!
//! ```toml
//! endpoint = "https://sheets.googleapis.com/v4"
//! credentials_file = "credentials.json"
//! token_file = "token.json"
//!
//! [quota]
//! read = 50
//! write = 50
//! window_secs = 100
//! ```
//!
//! # Resolution Algorithm
//!
//! 1. The path in `SHEETSYNC_CONFIG`, if that file exists
//! 2. Current directory
//! 3. Parent directories (walk up to filesystem root)
//! 4. XDG config directory (`~/.config/sheetsync/sheetsync.toml`)
//!
//! When nothing is found the defaults apply. Relative credential and token
//! paths are resolved against the directory of the file they came from.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::quota::{DEFAULT_QUOTA, DEFAULT_WINDOW, QuotaLimiter};

pub const CONFIG_FILE_NAME: &str = "sheetsync.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SHEETSYNC_CONFIG";

/// Errors that can occur during configuration resolution or loading.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot determine the current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the Sheets API. `None` means the public endpoint.
    pub endpoint: Option<String>,

    /// Google OAuth client secrets downloaded from the Cloud console.
    pub credentials_file: PathBuf,

    /// Where the authorized token is cached between runs.
    pub token_file: PathBuf,

    pub quota: QuotaConfig,

    /// File this config was loaded from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            credentials_file: PathBuf::from("credentials.json"),
            token_file: PathBuf::from("token.json"),
            quota: QuotaConfig::default(),
            source: None,
        }
    }
}

/// Per-window request quotas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuotaConfig {
    pub read: usize,
    pub write: usize,
    pub window_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            read: DEFAULT_QUOTA,
            write: DEFAULT_QUOTA,
            window_secs: DEFAULT_WINDOW.as_secs(),
        }
    }
}

impl QuotaConfig {
    pub fn limiter(&self) -> QuotaLimiter {
        QuotaLimiter::new(self.read, self.write, Duration::from_secs(self.window_secs))
    }
}

impl Config {
    /// Finds and loads the config file using the resolution algorithm above.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file was found but could not be read or
    /// parsed. A missing config file is not an error.
    pub fn resolve() -> Result<Self, ConfigError> {
        let current = std::env::current_dir().map_err(ConfigError::CurrentDir)?;
        let env_override = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        let xdg = dirs::config_dir().map(|dir| dir.join("sheetsync").join(CONFIG_FILE_NAME));
        resolve_from(&current, env_override, xdg)
    }

    /// Loads a config file from an explicit path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.source = Some(path.to_path_buf());
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn credentials_path(&self) -> PathBuf {
        self.relative_to_source(&self.credentials_file)
    }

    pub fn token_path(&self) -> PathBuf {
        self.relative_to_source(&self.token_file)
    }

    fn relative_to_source(&self, path: &Path) -> PathBuf {
        match self.source.as_deref().and_then(Path::parent) {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn resolve_from(
    start: &Path,
    env_override: Option<PathBuf>,
    xdg: Option<PathBuf>,
) -> Result<Config, ConfigError> {
    if let Some(path) = env_override {
        if path.is_file() {
            return Config::load(&path);
        }
        warn!(path = %path.display(), "{CONFIG_ENV_VAR} points to a missing file, ignoring");
    }

    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Config::load(&candidate);
        }
    }

    if let Some(path) = xdg
        && path.is_file()
    {
        return Config::load(&path);
    }

    Ok(Config::default())
}
