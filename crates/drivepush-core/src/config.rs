//! Configuration module for drivepush.
//!
//! Typed configuration structs mapped to the YAML configuration file, with
//! loading, defaults and validation. Every section is optional in the file;
//! missing keys take their default value.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::quota::DEFAULT_WARNING_PERCENT;

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for drivepush.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local directory mirrored to the remote root.
    pub sync_root: PathBuf,
    pub push: PushConfig,
    pub logging: LoggingConfig,
}

/// Push behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Skip the change-list confirmation.
    pub no_prompt: bool,
    /// Do not compare content checksums when deciding whether to upload.
    pub ignore_checksum: bool,
    /// Maximum remote calls in flight per change group.
    pub max_concurrent: usize,
    /// Projected usage (percent of the limit) from which the quota is "almost exceeded".
    pub quota_warning_percent: u8,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/drivepush/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("drivepush")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

impl Default for Config {
    fn default() -> Self {
        Self {
            sync_root: dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("~"))
                .join("Drive"),
            push: PushConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            no_prompt: false,
            ignore_checksum: false,
            max_concurrent: 4,
            quota_warning_percent: DEFAULT_WARNING_PERCENT,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"push.max_concurrent"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.sync_root.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "sync_root".into(),
                message: "must not be empty".into(),
            });
        }

        if self.push.max_concurrent == 0 {
            errors.push(ValidationError {
                field: "push.max_concurrent".into(),
                message: "must be greater than 0".into(),
            });
        }

        if !(1..=100).contains(&self.push.quota_warning_percent) {
            errors.push(ValidationError {
                field: "push.quota_warning_percent".into(),
                message: format!(
                    "must be between 1 and 100, got {}",
                    self.push.quota_warning_percent
                ),
            });
        }

        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "must be one of {}, got '{}'",
                    VALID_LOG_LEVELS.join(", "),
                    self.logging.level
                ),
            });
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let cfg = Config::default();
        assert!(cfg.sync_root.to_string_lossy().contains("Drive"));
        assert!(!cfg.push.no_prompt);
        assert!(!cfg.push.ignore_checksum);
        assert_eq!(cfg.push.max_concurrent, 4);
        assert_eq!(cfg.push.quota_warning_percent, 90);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn default_config_passes_validation() {
        let errors = Config::default().validate();
        assert!(errors.is_empty(), "unexpected validation errors: {errors:?}");
    }

    #[test]
    fn load_from_yaml_file() {
        let yaml = r#"
sync_root: /tmp/test-drive
push:
  no_prompt: true
  max_concurrent: 8
logging:
  level: debug
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let cfg = Config::load(file.path()).unwrap();
        assert_eq!(cfg.sync_root, PathBuf::from("/tmp/test-drive"));
        assert!(cfg.push.no_prompt);
        assert_eq!(cfg.push.max_concurrent, 8);
        // Unspecified keys keep their defaults
        assert!(!cfg.push.ignore_checksum);
        assert_eq!(cfg.push.quota_warning_percent, 90);
        assert_eq!(cfg.logging.level, "debug");
    }

    #[test]
    fn load_or_default_falls_back_on_missing_file() {
        let cfg = Config::load_or_default(Path::new("/nonexistent/drivepush.yaml"));
        assert_eq!(cfg.push.max_concurrent, 4);
    }

    #[test]
    fn validate_reports_every_bad_field() {
        let mut cfg = Config::default();
        cfg.push.max_concurrent = 0;
        cfg.push.quota_warning_percent = 0;
        cfg.logging.level = "loud".into();

        let fields: Vec<String> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"push.max_concurrent".to_string()));
        assert!(fields.contains(&"push.quota_warning_percent".to_string()));
        assert!(fields.contains(&"logging.level".to_string()));
    }

    #[test]
    fn default_path_ends_with_config_yaml() {
        let path = Config::default_path();
        assert!(path.ends_with("drivepush/config.yaml"));
    }
}
