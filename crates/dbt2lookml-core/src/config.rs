//! Configuration schema (dbt2lookml.toml)
//!
//! Every key mirrors a command-line flag. Values given on the command line
//! win over the file; the file wins over the built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default search path for dbt_project.yml
pub const DEFAULT_PROJECT_DIR: &str = "./";

/// Default search path for manifest.json and catalog.json
pub const DEFAULT_TARGET_DIR: &str = "./target";

/// Default root for generated LookML
pub const DEFAULT_OUTPUT_DIR: &str = "./lookml";

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive understood by tracing-subscriber's EnvFilter
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARN" | "WARNING" => Ok(Self::Warn),
            "ERROR" => Ok(Self::Error),
            other => Err(ConfigError::InvalidValue("log_level".to_string(), other.to_string())),
        }
    }
}

/// Accepts the same spellings as `--log-level`, in any case, plus WARNING
impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory containing dbt_project.yml
    #[serde(default = "default_project_dir")]
    pub project_dir: PathBuf,

    /// Directory containing manifest.json and catalog.json
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,

    /// Directory that receives the generated LookML
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Only generate views for models carrying this tag
    #[serde(default)]
    pub tag: Option<String>,

    /// Generate explores for models carrying this tag
    #[serde(default)]
    pub explore_tag: Option<String>,

    /// Mirror each model's directory inside the output tree
    #[serde(default)]
    pub use_file_path: bool,

    /// Looker connection name; falls back to the dbt project name
    #[serde(default)]
    pub model_connection: Option<String>,

    /// Log verbosity
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_project_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PROJECT_DIR)
}

fn default_target_dir() -> PathBuf {
    PathBuf::from(DEFAULT_TARGET_DIR)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_dir: default_project_dir(),
            target_dir: default_target_dir(),
            output_dir: default_output_dir(),
            tag: None,
            explore_tag: None,
            use_file_path: false,
            model_connection: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    ///
    /// Relative directories in the file are resolved against the file's parent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.display().to_string(), e.to_string()))?;

        let mut config = Self::from_toml(&contents)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.project_dir = resolve(parent, &config.project_dir);
            config.target_dir = resolve(parent, &config.target_dir);
            config.output_dir = resolve(parent, &config.output_dir);
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Path of manifest.json inside the target directory
    pub fn manifest_path(&self) -> PathBuf {
        self.target_dir.join("manifest.json")
    }

    /// Path of catalog.json inside the target directory
    pub fn catalog_path(&self) -> PathBuf {
        self.target_dir.join("catalog.json")
    }

    /// Path of dbt_project.yml inside the project directory
    pub fn project_path(&self) -> PathBuf {
        self.project_dir.join("dbt_project.yml")
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    IoError(String, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
