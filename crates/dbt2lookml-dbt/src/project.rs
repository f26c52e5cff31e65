//! dbt_project.yml parsing

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The parts of dbt_project.yml we need
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbtProjectConfig {
    /// Project name; doubles as the default Looker connection name
    pub name: String,

    /// Connection profile name
    #[serde(default)]
    pub profile: Option<String>,
}

impl DbtProjectConfig {
    /// Load dbt_project.yml from file
    pub fn from_file(path: &Path) -> Result<Self, ProjectError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProjectError::NotFound(path.display().to_string()),
            _ => ProjectError::IoError(path.display().to_string(), e.to_string()),
        })?;

        let config = Self::from_str(&contents)?;
        tracing::debug!("Detected valid dbt config at {}", path.display());
        Ok(config)
    }

    /// Parse dbt_project.yml contents
    pub fn from_str(yaml: &str) -> Result<Self, ProjectError> {
        serde_yaml::from_str(yaml).map_err(|e| ProjectError::ParseError(e.to_string()))
    }
}

/// dbt_project.yml errors
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("Could not find a dbt_project.yml file at {0}. Use --project-dir to change the search path for the dbt_project.yml file.")]
    NotFound(String),

    #[error("Failed to read dbt project file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse dbt_project.yml: {0}")]
    ParseError(String),
}
