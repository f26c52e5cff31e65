//! dbt catalog.json parsing
//!
//! The catalog carries the column types the warehouse actually reports,
//! which the manifest only knows when a contract declares them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// dbt catalog.json structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Catalog entries keyed by node unique_id
    pub nodes: HashMap<String, CatalogNode>,
}

impl Catalog {
    /// Load catalog from file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CatalogError::NotFound(path.display().to_string()),
            _ => CatalogError::IoError(path.display().to_string(), e.to_string()),
        })?;

        let catalog = Self::from_str(&contents)?;
        tracing::debug!("Detected catalog at {}", path.display());
        Ok(catalog)
    }

    /// Parse catalog from JSON string
    ///
    /// Column keys and names are lower-cased, so lookups are case-insensitive.
    pub fn from_str(json: &str) -> Result<Self, CatalogError> {
        let mut catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| CatalogError::ParseError(e.to_string()))?;

        for node in catalog.nodes.values_mut() {
            node.columns = std::mem::take(&mut node.columns)
                .into_values()
                .map(|mut column| {
                    column.name = column.name.to_lowercase();
                    (column.name.clone(), column)
                })
                .collect();
        }

        Ok(catalog)
    }

    /// Check whether a node was materialized
    pub fn contains(&self, unique_id: &str) -> bool {
        self.nodes.contains_key(unique_id)
    }

    /// Look up a column of a node (column name is matched case-insensitively)
    pub fn column(&self, unique_id: &str, column: &str) -> Option<&CatalogColumn> {
        self.nodes
            .get(unique_id)?
            .columns
            .get(&column.to_lowercase())
    }
}

/// A materialized relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogNode {
    pub metadata: CatalogNodeMetadata,

    /// Columns keyed by lower-cased name
    pub columns: HashMap<String, CatalogColumn>,
}

/// Relation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogNodeMetadata {
    /// Relation kind as reported by the warehouse (e.g., "BASE TABLE", "view")
    #[serde(rename = "type")]
    pub relation_type: String,

    pub schema: String,

    pub name: String,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub owner: Option<String>,
}

/// A warehouse column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogColumn {
    /// Warehouse type, e.g. "INT64" or "character varying"
    #[serde(rename = "type")]
    pub column_type: String,

    #[serde(default)]
    pub comment: Option<String>,

    /// Ordinal position in the relation
    pub index: u32,

    pub name: String,
}

/// Catalog parsing errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Could not find catalog file at {0}. Use --target-dir to change the search path for the catalog.json file.")]
    NotFound(String),

    #[error("Failed to read catalog file {0}: {1}")]
    IoError(String, String),

    #[error("Failed to parse catalog JSON: {0}")]
    ParseError(String),
}
