//! Model selection and catalog typing
//!
//! Turns raw manifest/catalog artifacts into validated, typed models that
//! the generator can consume without further lookups.

use crate::catalog::Catalog;
use crate::manifest::{Manifest, ManifestError, ManifestNode};
use crate::meta::{ColumnMeta, MetaError, ModelMeta};
use dbt2lookml_core::{Diagnostic, DiagnosticCode, Location, Severity};
use std::collections::BTreeMap;
use std::path::Path;

/// A column with its warehouse type resolved from the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn {
    /// Lower-cased column name
    pub name: String,

    pub description: String,

    /// Warehouse type from catalog.json; None when the catalog lacks the column
    pub data_type: Option<String>,

    pub meta: ColumnMeta,

    /// Column carries a `primary_key` constraint
    pub primary_key: bool,

    /// Ordinal position in the warehouse relation
    pub index: Option<u32>,
}

/// A materialized model ready for LookML generation
#[derive(Debug, Clone, PartialEq)]
pub struct TypedModel {
    pub unique_id: String,
    pub name: String,
    pub relation_name: String,
    pub schema: Option<String>,

    /// SQL file path relative to the models directory
    pub path: String,

    pub description: String,
    pub tags: Vec<String>,

    /// Columns in warehouse order; columns unknown to the warehouse come last
    pub columns: Vec<TypedColumn>,

    pub meta: ModelMeta,
}

impl TypedModel {
    /// Find a column by name (case-insensitive)
    pub fn column(&self, name: &str) -> Option<&TypedColumn> {
        let name = name.to_lowercase();
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Directory part of the model path ("" for models at the root)
    pub fn directory(&self) -> String {
        Path::new(&self.path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// True when at least one column has a warehouse type
    pub fn is_typed(&self) -> bool {
        self.columns.iter().any(|c| c.data_type.is_some())
    }

    /// Total number of measures over all columns
    pub fn measure_count(&self) -> usize {
        self.columns.iter().map(|c| c.meta.measure_count()).sum()
    }
}

/// Output of [`parse_typed_models`]
#[derive(Debug, Clone, Default)]
pub struct ParsedModels {
    /// Models present in both manifest and catalog, sorted by name
    pub models: Vec<TypedModel>,

    /// Number of selected models that had no catalog entry
    pub skipped: usize,

    /// Non-fatal findings
    pub diagnostics: Vec<Diagnostic>,
}

/// Check whether a model carries a tag
pub fn tags_match(tag: &str, node: &ManifestNode) -> bool {
    node.tags.contains(tag)
}

/// Select materialized (non-ephemeral) models, optionally filtered by tag
///
/// Fails on a model without a name, which is what dbt produces for an
/// empty model file.
pub fn parse_models<'a>(
    manifest: &'a Manifest,
    tag: Option<&str>,
) -> Result<Vec<&'a ManifestNode>, ParseError> {
    let mut models: Vec<&ManifestNode> = manifest
        .models()
        .filter(|node| !node.is_ephemeral())
        .collect();

    if let Some(empty) = models.iter().find(|node| node.name.is_none()) {
        tracing::error!(
            "Cannot parse model with id: \"{}\" - is the model file empty?",
            empty.unique_id
        );
        return Err(ParseError::EmptyModel(empty.unique_id.clone()));
    }

    if let Some(tag) = tag {
        models.retain(|node| tags_match(tag, node));
    }

    models.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.unique_id.cmp(&b.unique_id)));
    Ok(models)
}

/// Select models and resolve their column types from the catalog
pub fn parse_typed_models(
    manifest: &Manifest,
    catalog: &Catalog,
    tag: Option<&str>,
) -> Result<ParsedModels, ParseError> {
    let adapter = manifest.adapter()?;
    let nodes = parse_models(manifest, tag)?;

    tracing::debug!("Parsed {} models from manifest.json", nodes.len());

    let mut parsed = ParsedModels::default();

    for node in nodes {
        if !catalog.contains(&node.unique_id) {
            let relation = node.relation_name.as_deref().unwrap_or("<unknown relation>");
            tracing::warn!(
                "Model {} not found in catalog. No looker view will be generated. \
                 Check if model has materialized in {} at {}",
                node.unique_id,
                adapter,
                relation
            );
            parsed.diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::ModelMissingFromCatalog,
                    Severity::Warn,
                    format!("Model not found in catalog; check it has materialized in {} at {}", adapter, relation),
                )
                .with_location(model_location(node)),
            );
            parsed.skipped += 1;
            continue;
        }

        let model = type_model(node, catalog)?;

        tracing::debug!(
            "Model {} has {} columns with {} measures",
            model.name,
            model.columns.len(),
            model.measure_count()
        );

        if !model.is_typed() {
            tracing::debug!(
                "Model {} has no typed columns, no dimensions will be generated",
                model.unique_id
            );
            parsed.diagnostics.push(
                Diagnostic::new(
                    DiagnosticCode::ModelUntyped,
                    Severity::Info,
                    "Model has no typed columns, no dimensions will be generated",
                )
                .with_location(model_location(node)),
            );
        }

        parsed.models.push(model);
    }

    tracing::debug!("Found catalog entries for {} models", parsed.models.len());
    tracing::debug!("Catalog entries missing for {} models", parsed.skipped);

    Ok(parsed)
}

fn model_location(node: &ManifestNode) -> Location {
    let location = Location::model(&node.unique_id);
    match &node.original_file_path {
        Some(file) => location.with_file(file),
        None => location,
    }
}

fn type_model(node: &ManifestNode, catalog: &Catalog) -> Result<TypedModel, ParseError> {
    let name = node
        .name
        .clone()
        .ok_or_else(|| ParseError::EmptyModel(node.unique_id.clone()))?;

    let relation_name = node.relation_name.clone().ok_or_else(|| ParseError::MissingField {
        model: node.unique_id.clone(),
        field: "relation_name",
    })?;

    // Names are case-insensitive: entries differing only by case collapse,
    // and the entry whose manifest key sorts last wins.
    let mut keys: Vec<&String> = node.columns.keys().collect();
    keys.sort();

    let mut by_name: BTreeMap<String, TypedColumn> = BTreeMap::new();
    for key in keys {
        let definition = &node.columns[key];
        let column_name = if definition.name.is_empty() { key } else { &definition.name };
        let column_name = column_name.to_lowercase();
        let location = format!("{}.{}", node.unique_id, column_name);
        let catalog_column = catalog.column(&node.unique_id, &column_name);

        let column = TypedColumn {
            description: definition.description.clone(),
            data_type: catalog_column.map(|c| c.column_type.clone()),
            meta: ColumnMeta::from_value(&definition.meta, &location)?,
            primary_key: definition.is_primary_key(),
            index: catalog_column.map(|c| c.index),
            name: column_name.clone(),
        };

        if by_name.insert(column_name, column).is_some() {
            tracing::warn!(
                "Model {} declares column {} more than once with different case; keeping the {:?} entry",
                node.unique_id,
                key.to_lowercase(),
                key
            );
        }
    }

    let mut columns: Vec<TypedColumn> = by_name.into_values().collect();
    columns.sort_by(|a, b| {
        a.index
            .is_none()
            .cmp(&b.index.is_none())
            .then_with(|| a.index.cmp(&b.index))
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(TypedModel {
        unique_id: node.unique_id.clone(),
        name,
        relation_name,
        schema: node.schema.clone(),
        path: node.path.clone().unwrap_or_default(),
        description: node.description.clone(),
        tags: node.tags.to_vec(),
        columns,
        meta: ModelMeta::from_value(&node.meta, &node.unique_id)?,
    })
}

/// Model parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Cannot parse model with id: \"{0}\" - is the model file empty?")]
    EmptyModel(String),

    #[error("Model {model} is missing required field '{field}'")]
    MissingField { model: String, field: &'static str },

    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest(nodes: serde_json::Value) -> Manifest {
        Manifest::from_str(&json!({"metadata": {"adapter_type": "bigquery"}, "nodes": nodes}).to_string())
            .unwrap()
    }

    fn model(id: &str, name: &str, materialized: &str, tags: serde_json::Value) -> serde_json::Value {
        json!({
            "unique_id": id,
            "resource_type": "model",
            "name": name,
            "relation_name": format!("`proj`.`ds`.`{}`", name),
            "path": format!("marts/{}.sql", name),
            "config": {"materialized": materialized},
            "tags": tags,
            "columns": {
                "ID": {"name": "ID", "description": "identifier", "constraints": [{"type": "primary_key"}]},
                "created_at": {"name": "created_at", "description": ""},
                "note": {"name": "note", "description": ""}
            }
        })
    }

    fn catalog(ids: &[&str]) -> Catalog {
        let nodes: serde_json::Map<String, serde_json::Value> = ids
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    json!({
                        "metadata": {"type": "table", "schema": "ds", "name": id},
                        "columns": {
                            "created_at": {"type": "TIMESTAMP", "index": 2, "name": "created_at"},
                            "id": {"type": "INT64", "index": 1, "name": "id"}
                        }
                    }),
                )
            })
            .collect();
        Catalog::from_str(&json!({ "nodes": nodes }).to_string()).unwrap()
    }

    #[test]
    fn ephemeral_and_non_model_nodes_are_excluded() {
        let manifest = manifest(json!({
            "model.p.a": model("model.p.a", "a", "table", json!([])),
            "model.p.b": model("model.p.b", "b", "ephemeral", json!([])),
            "seed.p.c": {"unique_id": "seed.p.c", "resource_type": "seed", "name": "c"}
        }));

        let models = parse_models(&manifest, None).unwrap();
        let names: Vec<_> = models.iter().filter_map(|m| m.name.as_deref()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn tag_filter_accepts_list_or_string() {
        let manifest = manifest(json!({
            "model.p.a": model("model.p.a", "a", "view", json!(["looker", "core"])),
            "model.p.b": model("model.p.b", "b", "view", json!("looker")),
            "model.p.c": model("model.p.c", "c", "view", json!(["core"]))
        }));

        let models = parse_models(&manifest, Some("looker")).unwrap();
        let names: Vec<_> = models.iter().filter_map(|m| m.name.as_deref()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn columns_differing_by_case_collapse() {
        let mut node = model("model.p.a", "a", "table", json!([]));
        node["columns"] = json!({
            "ID": {"name": "ID", "description": "upper"},
            "id": {"name": "id", "description": "lower"}
        });
        let manifest = manifest(json!({ "model.p.a": node }));

        let parsed = parse_typed_models(&manifest, &catalog(&["model.p.a"]), None).unwrap();
        let columns = &parsed.models[0].columns;
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].description, "lower");
        assert_eq!(columns[0].data_type.as_deref(), Some("INT64"));
    }

    #[test]
    fn empty_model_file_is_fatal() {
        let manifest = manifest(json!({
            "model.p.empty": {"unique_id": "model.p.empty", "resource_type": "model", "config": {"materialized": "view"}}
        }));

        let err = parse_models(&manifest, None).unwrap_err();
        assert!(matches!(err, ParseError::EmptyModel(id) if id == "model.p.empty"));
    }

    #[test]
    fn catalog_types_replace_declared_types() {
        let manifest = manifest(json!({"model.p.a": model("model.p.a", "a", "table", json!([]))}));
        let parsed = parse_typed_models(&manifest, &catalog(&["model.p.a"]), None).unwrap();

        let model = &parsed.models[0];
        let names: Vec<_> = model.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "created_at", "note"]);

        let id = model.column("Id").unwrap();
        assert_eq!(id.data_type.as_deref(), Some("INT64"));
        assert!(id.primary_key);
        assert!(model.column("note").unwrap().data_type.is_none());
        assert_eq!(model.directory(), "marts");
    }

    #[test]
    fn models_missing_from_catalog_are_skipped() {
        let manifest = manifest(json!({
            "model.p.a": model("model.p.a", "a", "table", json!([])),
            "model.p.b": model("model.p.b", "b", "table", json!([]))
        }));

        let parsed = parse_typed_models(&manifest, &catalog(&["model.p.b"]), None).unwrap();
        assert_eq!(parsed.models.len(), 1);
        assert_eq!(parsed.models[0].name, "b");
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.diagnostics[0].code, DiagnosticCode::ModelMissingFromCatalog);
    }

    #[test]
    fn untyped_model_gets_info_diagnostic() {
        let manifest = manifest(json!({"model.p.a": model("model.p.a", "a", "table", json!([]))}));
        let catalog = Catalog::from_str(
            &json!({"nodes": {"model.p.a": {"metadata": {"type": "table", "schema": "ds", "name": "a"}, "columns": {}}}})
                .to_string(),
        )
        .unwrap();

        let parsed = parse_typed_models(&manifest, &catalog, None).unwrap();
        assert!(!parsed.models[0].is_typed());
        assert_eq!(parsed.diagnostics[0].code, DiagnosticCode::ModelUntyped);
        assert_eq!(parsed.diagnostics[0].severity, Severity::Info);
    }

    #[test]
    fn invalid_column_meta_is_fatal() {
        let mut node = model("model.p.a", "a", "table", json!([]));
        node["columns"]["ID"]["meta"] = json!({"measures": {"n": {"type": "count", "filters": [{"x": "1", "y": "2"}]}}});
        let manifest = manifest(json!({ "model.p.a": node }));

        let err = parse_typed_models(&manifest, &catalog(&["model.p.a"]), None).unwrap_err();
        assert!(matches!(err, ParseError::Meta(MetaError::MultipleFilterNames(_))));
    }
}
