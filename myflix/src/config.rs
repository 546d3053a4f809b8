//! Client configuration.
//!
//! Resolution order, later wins:
//! 1. Built-in defaults
//! 2. `<config dir>/myflix/config.toml` (or the file given with `--config`)
//! 3. `MYFLIX_*` environment variables
//! 4. Command-line flags (applied by the CLI)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::api::MissingTokenPolicy;

pub const DEFAULT_API_URL: &str = "https://andersonmovie-fda719d938ac.herokuapp.com/";

const ENV_API_URL: &str = "MYFLIX_API_URL";
const ENV_SESSION_FILE: &str = "MYFLIX_SESSION_FILE";
const ENV_TIMEOUT_SECS: &str = "MYFLIX_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the movie API.
    pub api_url: String,
    /// Transport timeout per request.
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Session file override. Defaults to the platform data directory.
    pub session_file: Option<PathBuf>,
    /// What to do when an authorized call has no stored token.
    pub missing_token: MissingTokenPolicy,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("myflix/{}", env!("CARGO_PKG_VERSION")),
            session_file: None,
            missing_token: MissingTokenPolicy::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("myflix").join("config.toml"))
    }

    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; the default path is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Apply `MYFLIX_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(path) = lookup(ENV_SESSION_FILE) {
            self.session_file = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    /// Where the session file lives.
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session_file
            .clone()
            .or_else(crate::session::FileStore::default_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.missing_token, MissingTokenPolicy::Send);
        assert!(config.user_agent.starts_with("myflix/"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"http://localhost:8080/\"\nmissing_token = \"reject\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080/");
        assert_eq!(config.missing_token, MissingTokenPolicy::Reject);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_API_URL, "http://127.0.0.1:9000/"),
            (ENV_SESSION_FILE, "/tmp/myflix-session.json"),
            (ENV_TIMEOUT_SECS, "5"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|key| env.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.api_url, "http://127.0.0.1:9000/");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(
            config.session_path(),
            Some(PathBuf::from("/tmp/myflix-session.json"))
        );
    }

    #[test]
    fn test_env_bad_timeout() {
        let mut config = Config::default();
        let err = config
            .apply_env(|key| (key == ENV_TIMEOUT_SECS).then(|| "never".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: ENV_TIMEOUT_SECS, .. }
        ));
    }
}
