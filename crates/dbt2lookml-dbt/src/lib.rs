//! dbt artifact parsing and validation
//!
//! This crate handles:
//! - Parsing manifest.json, catalog.json and dbt_project.yml
//! - Validating dbt2looker `meta` blocks on models and columns
//! - Joining manifest models with catalog column types

pub mod manifest;
pub mod catalog;
pub mod project;
pub mod meta;
pub mod parser;

pub use manifest::{Manifest, ManifestNode, ManifestMetadata, NodeConfig, ColumnDefinition, ColumnConstraint, Tags, SupportedAdapter, ManifestError};
pub use catalog::{Catalog, CatalogNode, CatalogNodeMetadata, CatalogColumn, CatalogError};
pub use project::{DbtProjectConfig, ProjectError};
pub use meta::{ColumnMeta, DimensionMeta, MeasureMeta, ModelMeta, JoinMeta, MetaError};
pub use parser::{TypedModel, TypedColumn, ParsedModels, ParseError, parse_models, parse_typed_models, tags_match};
