//! Configuration management for codevis.
//!
//! Configuration is loaded from multiple sources with the following priority:
//! 1. Environment variables (highest priority)
//! 2. Project-local `codevis.toml` file
//! 3. User config `~/.config/codevis/config.toml`
//! 4. Built-in defaults (lowest priority)
//!
//! A JSON file in the upstream analyzer's `config.json` layout
//! (`graph_db.uri`, `graph_db.username`, ...) is accepted as well.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

mod defaults;

pub use defaults::*;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to parse JSON config file: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Graph store connection.
    #[serde(alias = "graph_db")]
    pub store: StoreConfig,

    /// Analyzer input.
    pub analysis: AnalysisConfig,

    /// Snapshot write behavior.
    pub sync: SyncConfig,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// Searches for config in order:
    /// 1. `./codevis.toml` (project local)
    /// 2. `~/.config/codevis/config.toml` (user config)
    /// 3. Falls back to defaults
    pub fn load() -> Result<Self, ConfigError> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_file(DEFAULT_CONFIG_FILE);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join(DEFAULT_CONFIG_DIR).join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file. `.json` files are parsed as
    /// JSON, everything else as TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let mut config: Config = if is_json {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)?
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(address) = std::env::var("CODEVIS_STORE_ADDRESS") {
            self.store.address = address;
        }
        if let Ok(username) = std::env::var("CODEVIS_STORE_USERNAME") {
            self.store.username = username;
        }
        if let Ok(password) = std::env::var("CODEVIS_STORE_PASSWORD") {
            self.store.password = password;
        }
        if let Ok(dir) = std::env::var("CODEVIS_ANALYSIS_DIR") {
            self.analysis.dir = dir;
        }
        if let Ok(program) = std::env::var("CODEVIS_PROGRAM") {
            self.analysis.program = Some(program);
        }
    }

    /// Reject configurations the pipeline cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_store()?;
        self.validate_analysis()
    }

    /// Store credentials must all be present.
    pub fn validate_store(&self) -> Result<(), ConfigError> {
        require(&[
            ("store.address", &self.store.address),
            ("store.username", &self.store.username),
            ("store.password", &self.store.password),
        ])
    }

    /// Settings needed to build a graph without a store.
    pub fn validate_analysis(&self) -> Result<(), ConfigError> {
        require(&[("analysis.dir", &self.analysis.dir)])?;
        if self.sync.report_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "sync.report_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a default config file content as a string.
    pub fn default_config_string() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

fn require(settings: &[(&str, &String)]) -> Result<(), ConfigError> {
    let missing: Vec<&str> = settings
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| *key)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "missing required settings: {}",
            missing.join(", ")
        )))
    }
}

/// Graph store connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SurrealDB endpoint (`ws://`, `http://`, `rocksdb://<path>`, `mem://`).
    #[serde(alias = "uri")]
    pub address: String,

    pub username: String,

    #[serde(skip_serializing)]
    pub password: String,

    pub namespace: String,

    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_STORE_ADDRESS.to_string(),
            username: String::new(),
            password: String::new(),
            namespace: DEFAULT_STORE_NAMESPACE.to_string(),
            database: DEFAULT_STORE_DATABASE.to_string(),
        }
    }
}

/// Analyzer input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Root directory of the analyzer output.
    pub dir: String,

    /// Facts document inside `dir`. When absent, every `*.facts.json`
    /// under `dir` is loaded.
    pub facts_file: String,

    /// Root program name. Defaults to the base name of `dir`.
    pub program: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            dir: DEFAULT_ANALYSIS_DIR.to_string(),
            facts_file: DEFAULT_FACTS_FILE.to_string(),
            program: None,
        }
    }
}

impl AnalysisConfig {
    /// Path facts are loaded from: the facts file if it exists, else `dir`.
    pub fn facts_source(&self) -> PathBuf {
        let dir = PathBuf::from(&self.dir);
        if !self.facts_file.is_empty() {
            let file = dir.join(&self.facts_file);
            if file.is_file() {
                return file;
            }
        }
        dir
    }

    /// Name of the snapshot root.
    pub fn program_name(&self) -> String {
        if let Some(program) = self.program.as_ref().filter(|p| !p.is_empty()) {
            return program.clone();
        }

        let dir = Path::new(&self.dir);
        let resolved = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        resolved
            .file_name()
            .and_then(|n| n.to_str())
            .map(String::from)
            .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string())
    }
}

/// Snapshot write configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Throughput report interval in milliseconds.
    pub report_interval_ms: u64,

    /// Treat any failed write as a failed run.
    pub strict: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            report_interval_ms: DEFAULT_REPORT_INTERVAL_MS,
            strict: false,
        }
    }
}

impl SyncConfig {
    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.address, DEFAULT_STORE_ADDRESS);
        assert_eq!(config.analysis.facts_file, DEFAULT_FACTS_FILE);
        assert_eq!(config.sync.report_interval_ms, DEFAULT_REPORT_INTERVAL_MS);
    }

    #[test]
    fn test_config_to_toml() {
        let toml_str = Config::default_config_string();
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[analysis]"));
        assert!(toml_str.contains("[sync]"));
        assert!(!toml_str.contains("password"));
    }

    #[test]
    fn test_default_config_is_invalid_without_credentials() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("store.username"));
        assert!(err.to_string().contains("store.password"));
    }

    #[test]
    fn test_program_name_override() {
        let analysis = AnalysisConfig {
            dir: "/srv/checkout/webapp".into(),
            program: Some("webapp-main".into()),
            ..Default::default()
        };
        assert_eq!(analysis.program_name(), "webapp-main");

        let analysis = AnalysisConfig {
            dir: "/srv/checkout/webapp".into(),
            ..Default::default()
        };
        assert_eq!(analysis.program_name(), "webapp");
    }
}
