//! dbt manifest.json parsing
//!
//! Parses dbt-generated manifest.json to extract model nodes and the
//! adapter they were compiled for.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// dbt adapters whose column types can be mapped to LookML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportedAdapter {
    BigQuery,
    Postgres,
    Redshift,
    Snowflake,
    Spark,
}

impl SupportedAdapter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BigQuery => "bigquery",
            Self::Postgres => "postgres",
            Self::Redshift => "redshift",
            Self::Snowflake => "snowflake",
            Self::Spark => "spark",
        }
    }
}

impl std::fmt::Display for SupportedAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SupportedAdapter {
    type Err = ManifestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bigquery" => Ok(Self::BigQuery),
            "postgres" => Ok(Self::Postgres),
            "redshift" => Ok(Self::Redshift),
            "snowflake" => Ok(Self::Snowflake),
            "spark" => Ok(Self::Spark),
            other => Err(ManifestError::UnsupportedAdapter(other.to_string())),
        }
    }
}

/// dbt manifest.json structure (subset of fields we care about)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Metadata about the manifest
    pub metadata: ManifestMetadata,

    /// Model, test, seed and snapshot nodes
    pub nodes: HashMap<String, ManifestNode>,
}

impl Manifest {
    /// Load manifest from file
    pub fn from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ManifestError::NotFound(path.display().to_string()),
            _ => ManifestError::IoError(path.display().to_string(), e.to_string()),
        })?;

        let manifest = Self::from_str(&contents)?;
        tracing::debug!("Detected manifest at {}", path.display());
        Ok(manifest)
    }

    /// Parse manifest from JSON string
    ///
    /// Fails when the manifest was compiled for an adapter we cannot map.
    pub fn from_str(json: &str) -> Result<Self, ManifestError> {
        let manifest: Manifest = serde_json::from_str(json)
            .map_err(|e| ManifestError::ParseError(e.to_string()))?;

        manifest.adapter()?;
        Ok(manifest)
    }

    /// Adapter the project was compiled with
    pub fn adapter(&self) -> Result<SupportedAdapter, ManifestError> {
        self.metadata.adapter_type.parse()
    }

    /// Get all model nodes (filters out tests, seeds, etc.)
    pub fn models(&self) -> impl Iterator<Item = &ManifestNode> {
        self.nodes.values().filter(|node| node.is_model())
    }

    /// Get a specific node by unique_id
    pub fn get_node(&self, unique_id: &str) -> Option<&ManifestNode> {
        self.nodes.get(unique_id)
    }
}

/// Manifest metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Adapter name, e.g. "bigquery"
    pub adapter_type: String,

    #[serde(default)]
    pub dbt_version: Option<String>,

    #[serde(default)]
    pub dbt_schema_version: Option<String>,

    #[serde(default)]
    pub generated_at: Option<String>,
}

/// Model tags, written either as a list or as a single bare string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    Single(String),
}

impl Default for Tags {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Tags {
    /// Check whether a tag is present
    pub fn contains(&self, tag: &str) -> bool {
        match self {
            Self::List(tags) => tags.iter().any(|t| t == tag),
            Self::Single(single) => single == tag,
        }
    }

    /// Tags as an owned list
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::List(tags) => tags.clone(),
            Self::Single(single) => vec![single.clone()],
        }
    }
}

/// A node in the manifest (model, test, snapshot, etc.)
///
/// Model-specific fields are optional so that other resource types and
/// models compiled from empty files still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestNode {
    /// Unique identifier (e.g., "model.my_project.users")
    pub unique_id: String,

    /// Resource type (model, test, snapshot, etc.)
    pub resource_type: String,

    /// Node configuration
    #[serde(default)]
    pub config: NodeConfig,

    /// Node name (e.g., "users")
    #[serde(default)]
    pub name: Option<String>,

    /// Fully qualified relation in the warehouse (e.g., `"db"."schema"."users"`)
    #[serde(default)]
    pub relation_name: Option<String>,

    /// Schema name
    #[serde(default)]
    pub schema: Option<String>,

    /// Path to the SQL file relative to the models directory
    #[serde(default)]
    pub path: Option<String>,

    /// Path to the SQL file relative to the project root
    #[serde(default)]
    pub original_file_path: Option<String>,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Column definitions from schema YAML
    #[serde(default)]
    pub columns: HashMap<String, ColumnDefinition>,

    /// Tags
    #[serde(default)]
    pub tags: Tags,

    /// Raw `meta` block, validated later by the parser
    #[serde(default)]
    pub meta: serde_json::Value,
}

impl ManifestNode {
    pub fn is_model(&self) -> bool {
        self.resource_type == "model"
    }

    pub fn is_ephemeral(&self) -> bool {
        self.config.materialized.as_deref() == Some("ephemeral")
    }
}

/// Node configuration (from dbt_project.yml or model config)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Materialization type
    #[serde(default)]
    pub materialized: Option<String>,
}

/// Column definition from manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,

    /// Description
    #[serde(default)]
    pub description: String,

    /// Data type declared in YAML; replaced by the catalog type during parsing
    #[serde(default)]
    pub data_type: Option<String>,

    /// Raw `meta` block, validated later by the parser
    #[serde(default)]
    pub meta: serde_json::Value,

    /// Column-level constraints (dbt >= 1.5)
    #[serde(default)]
    pub constraints: Vec<ColumnConstraint>,
}

impl ColumnDefinition {
    /// Check for a `primary_key` constraint
    pub fn is_primary_key(&self) -> bool {
        self.constraints.iter().any(|c| c.constraint_type == "primary_key")
    }
}

/// A column constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnConstraint {
    /// Constraint kind (not_null, unique, primary_key, ...)
    #[serde(rename = "type")]
    pub constraint_type: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub expression: Option<String>,
}

/// Manifest parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Could not find manifest file at {0}. Use --target-dir to change the search path for the manifest.json file.")]
    NotFound(String),

    #[error("Failed to read manifest file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse manifest JSON: {0}")]
    ParseError(String),

    #[error("{0} is not a supported dbt adapter")]
    UnsupportedAdapter(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"{
        "metadata": {"adapter_type": "snowflake", "dbt_version": "1.7.4"},
        "nodes": {
            "model.shop.orders": {
                "unique_id": "model.shop.orders",
                "resource_type": "model",
                "name": "orders",
                "relation_name": "ANALYTICS.SHOP.ORDERS",
                "config": {"materialized": "table", "tags": []},
                "columns": {
                    "id": {
                        "name": "id",
                        "description": "Order id",
                        "constraints": [{"type": "primary_key"}]
                    }
                },
                "tags": "finance"
            },
            "test.shop.not_null_orders_id": {
                "unique_id": "test.shop.not_null_orders_id",
                "resource_type": "test",
                "config": {"materialized": "test"}
            }
        }
    }"#;

    #[test]
    fn parse_minimal_manifest() {
        let manifest = Manifest::from_str(MANIFEST).unwrap();

        assert_eq!(manifest.adapter().unwrap(), SupportedAdapter::Snowflake);
        assert_eq!(manifest.models().count(), 1);

        let orders = manifest.get_node("model.shop.orders").unwrap();
        assert_eq!(orders.name.as_deref(), Some("orders"));
        assert!(orders.tags.contains("finance"));
        assert!(orders.columns["id"].is_primary_key());
        assert!(orders.meta.is_null());
    }

    #[test]
    fn unsupported_adapter_is_rejected() {
        let json = MANIFEST.replace("snowflake", "duckdb");
        let err = Manifest::from_str(&json).unwrap_err();
        assert_eq!(err.to_string(), "duckdb is not a supported dbt adapter");
    }

    #[test]
    fn missing_file_names_the_flag() {
        let err = Manifest::from_file(Path::new("/nonexistent/target/manifest.json")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
        assert!(err.to_string().contains("--target-dir"));
    }

    #[test]
    fn absent_config_matches_empty_config() {
        let node: ManifestNode = serde_json::from_str(
            r#"{"unique_id": "model.shop.bare", "resource_type": "model", "name": "bare"}"#,
        )
        .unwrap();
        let empty: NodeConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(node.config, NodeConfig::default());
        assert_eq!(empty, NodeConfig::default());
        assert!(!node.is_ephemeral());
    }

    #[test]
    fn tags_list_and_single() {
        let list = Tags::List(vec!["a".to_string(), "b".to_string()]);
        assert!(list.contains("b"));
        assert!(!list.contains("c"));

        let single = Tags::Single("a".to_string());
        assert!(single.contains("a"));
        assert_eq!(single.to_vec(), vec!["a".to_string()]);
    }
}
