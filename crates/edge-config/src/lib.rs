//! Edge configuration system
//!
//! This crate provides configuration for the animation engine and its
//! scenario runner, loaded from `edge.toml` with environment overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const CONFIG_FILE: &str = "edge.toml";

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EdgeConfig {
    /// Keyframes registry settings
    pub registry: RegistryConfig,
    /// Log filter settings
    pub logging: LoggingConfig,
    /// Scenario runner settings
    pub runner: RunnerConfig,
}

/// Keyframes registry configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Prefix for generated keyframes names
    pub namespace: String,
    /// Delay before inserted keyframes are flushed to the stylesheet
    pub flush_delay_ms: f64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (e.g. `edge_anim=debug`); `RUST_LOG` still wins
    pub filter: Option<String>,
}

/// Scenario runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Scenario file run when none is given on the command line
    pub scenario: Option<PathBuf>,
    /// Print the materialized stylesheet after the run
    pub print_stylesheet: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            namespace: "ea_".to_string(),
            flush_delay_ms: 0.0,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            scenario: None,
            print_stylesheet: true,
        }
    }
}

fn parse_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

impl EdgeConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration from `path`, or return defaults if it doesn't exist.
    ///
    /// A file that exists but fails to parse is still an error.
    pub fn load_or_default_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load_from_file(path) {
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load configuration from the default location (edge.toml in the current directory)
    /// or return default configuration if it can't be loaded
    pub fn load_or_default() -> Self {
        Self::load_from_file(CONFIG_FILE).unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    /// Unparseable numeric values are ignored.
    pub fn merge_with_env(&mut self) {
        // Registry settings
        if let Ok(namespace) = std::env::var("EDGE_NAMESPACE") {
            self.registry.namespace = namespace;
        }
        if let Ok(val) = std::env::var("EDGE_FLUSH_DELAY_MS") {
            if let Ok(delay) = val.parse::<f64>() {
                self.registry.flush_delay_ms = delay;
            }
        }

        if let Ok(filter) = std::env::var("EDGE_LOG") {
            self.logging.filter = Some(filter);
        }

        // Runner settings
        if let Ok(path) = std::env::var("EDGE_SCENARIO") {
            self.runner.scenario = Some(PathBuf::from(path));
        }
        if let Ok(val) = std::env::var("EDGE_PRINT_STYLESHEET") {
            self.runner.print_stylesheet = parse_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from edge.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EdgeConfig::default();
        assert_eq!(config.registry.namespace, "ea_");
        assert_eq!(config.registry.flush_delay_ms, 0.0);
        assert!(config.logging.filter.is_none());
        assert!(config.runner.print_stylesheet);
    }

    #[test]
    fn test_toml_serialization() {
        let config = EdgeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: EdgeConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[registry]\nnamespace = \"kf_\"\n\n[runner]\nprint_stylesheet = false"
        )
        .unwrap();

        let config = EdgeConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.registry.namespace, "kf_");
        assert_eq!(config.registry.flush_delay_ms, 0.0);
        assert!(!config.runner.print_stylesheet);
        assert!(config.runner.scenario.is_none());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edge.toml");
        assert!(matches!(
            EdgeConfig::load_from_file(&path),
            Err(ConfigError::Read { .. })
        ));
        assert_eq!(
            EdgeConfig::load_or_default_from(&path).unwrap(),
            EdgeConfig::default()
        );
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[registry\nnamespace = 1").unwrap();
        let err = EdgeConfig::load_or_default_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_merge_with_env() {
        unsafe {
            std::env::set_var("EDGE_NAMESPACE", "env_");
            std::env::set_var("EDGE_FLUSH_DELAY_MS", "16");
            std::env::set_var("EDGE_PRINT_STYLESHEET", "0");
        }

        let mut config = EdgeConfig::default();
        config.merge_with_env();

        assert_eq!(config.registry.namespace, "env_");
        assert_eq!(config.registry.flush_delay_ms, 16.0);
        assert!(!config.runner.print_stylesheet);

        unsafe {
            std::env::remove_var("EDGE_NAMESPACE");
            std::env::remove_var("EDGE_FLUSH_DELAY_MS");
            std::env::remove_var("EDGE_PRINT_STYLESHEET");
        }
    }
}
