//! Server configuration
//!
//! Layered as defaults, then an optional TOML file, then environment
//! variables, then command-line flags (applied by the binary).

use lca_advisory::{DEFAULT_BASE_URL, DEFAULT_INSIGHTS_MODEL, DEFAULT_TIPS_MODEL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding [`ServerConfig::bind_address`]
pub const ENV_BIND_ADDRESS: &str = "LCA_BIND_ADDRESS";
/// Environment variable overriding [`ServerConfig::storage_path`]
pub const ENV_STORAGE_PATH: &str = "LCA_STORAGE_PATH";
/// Environment variable holding the advisory API key
pub const ENV_API_KEY: &str = "GOOGLE_GEMINI_API_KEY";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`ServerConfig`]
    #[error("invalid config {path}: {source}")]
    Parse {
        /// File involved
        path: PathBuf,
        /// Decode error
        #[source]
        source: toml::de::Error,
    },

    /// Environment variable holds an unusable value
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// Advisory client settings
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// API key; advisory calls fail fast without one
    pub api_key: Option<String>,
    /// REST endpoint
    pub base_url: String,
    /// Model for insights
    pub insights_model: String,
    /// Model for quick tips
    pub tips_model: String,
    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            insights_model: DEFAULT_INSIGHTS_MODEL.to_string(),
            tips_model: DEFAULT_TIPS_MODEL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl fmt::Debug for AdvisoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisoryConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("insights_model", &self.insights_model)
            .field("tips_model", &self.tips_model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AdvisoryConfig {
    /// Request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind_address: SocketAddr,
    /// JSON snapshot file
    pub storage_path: PathBuf,
    /// Keep results in memory only
    pub ephemeral: bool,
    /// Emit JSON log lines
    pub log_json: bool,
    /// Advisory client
    pub advisory: AdvisoryConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3030)),
            storage_path: PathBuf::from("lca-storage.json"),
            ephemeral: false,
            log_json: false,
            advisory: AdvisoryConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults, or the contents of `path` when given
    ///
    /// # Errors
    /// [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply process environment overrides
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] for an unparsable bind address.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`
    ///
    /// # Errors
    /// [`ConfigError::InvalidValue`] for an unparsable bind address.
    pub fn apply_env_with(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
            self.bind_address = addr.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_BIND_ADDRESS,
                value: addr,
            })?;
        }
        if let Some(path) = lookup(ENV_STORAGE_PATH) {
            self.storage_path = PathBuf::from(path);
        }
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.advisory.api_key = Some(key);
        }
        Ok(self)
    }

    /// With bind address
    #[must_use]
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// With storage path
    #[must_use]
    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = path.into();
        self
    }

    /// With in-memory storage
    #[must_use]
    pub fn with_ephemeral(mut self, ephemeral: bool) -> Self {
        self.ephemeral = ephemeral;
        self
    }

    /// With JSON logging
    #[must_use]
    pub fn with_log_json(mut self, log_json: bool) -> Self {
        self.log_json = log_json;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = ServerConfig::load(None).unwrap();
        assert_eq!(config.bind_address.port(), 3030);
        assert_eq!(config.storage_path, PathBuf::from("lca-storage.json"));
        assert_eq!(config.advisory.insights_model, "gemini-2.0-flash");
        assert_eq!(config.advisory.tips_model, "gemini-1.5-flash");
        assert_eq!(config.advisory.timeout(), Duration::from_secs(30));
        assert!(config.advisory.api_key.is_none());
    }

    #[test]
    fn toml_overrides_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "bind_address = \"0.0.0.0:8080\"\n\n[advisory]\ntimeout_secs = 5\n"
        )
        .unwrap();

        let config = ServerConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.advisory.timeout_secs, 5);
        assert_eq!(config.advisory.tips_model, "gemini-1.5-flash");
        assert_eq!(config.storage_path, PathBuf::from("lca-storage.json"));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_address = 12").unwrap();
        assert!(matches!(
            ServerConfig::load(Some(file.path())),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BIND_ADDRESS, "127.0.0.1:9000"),
            (ENV_STORAGE_PATH, "/var/lib/lca/results.json"),
            (ENV_API_KEY, "secret"),
        ]
        .into_iter()
        .collect();

        let config = ServerConfig::default()
            .apply_env_with(|k| env.get(k).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.bind_address.port(), 9000);
        assert_eq!(config.storage_path, PathBuf::from("/var/lib/lca/results.json"));
        assert_eq!(config.advisory.api_key.as_deref(), Some("secret"));
        assert!(!format!("{:?}", config.advisory).contains("secret"));
    }

    #[test]
    fn bad_bind_address_env() {
        let err = ServerConfig::default()
            .apply_env_with(|k| (k == ENV_BIND_ADDRESS).then(|| "nope".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_BIND_ADDRESS, .. }));
    }
}
