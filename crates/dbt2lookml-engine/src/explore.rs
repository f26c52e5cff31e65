//! Explore generation
//!
//! One `.model.lkml` per tagged dbt model, exposing the model's view as an
//! explore with the joins declared in model meta. View names are assumed to
//! equal model names, which requires model names to be unique across the
//! project's packages.

use crate::lkml;
use dbt2lookml_core::{Explore, Join, LookmlFile, ModelFile};
use dbt2lookml_dbt::TypedModel;

/// Include pattern for views written at the root of `views/`
pub const VIEWS_INCLUDE: &str = "/views/*";

/// Include pattern for views written in mirrored model directories
pub const NESTED_VIEWS_INCLUDE: &str = "/views/**/*.view.lkml";

/// Build the model file structure for a dbt model
pub fn build_model_file(model: &TypedModel, connection: &str, use_file_path: bool) -> ModelFile {
    let joins = model
        .meta
        .joins
        .iter()
        .map(|join| Join {
            name: join.join.clone(),
            join_type: join.join_type,
            relationship: join.relationship,
            sql_on: join.sql_on.clone(),
            view_label: join
                .view_label
                .clone()
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| join.join.clone()),
        })
        .collect();

    let include = if use_file_path { NESTED_VIEWS_INCLUDE } else { VIEWS_INCLUDE };

    ModelFile {
        connection: connection.to_string(),
        include: include.to_string(),
        explore: Explore {
            name: model.name.clone(),
            description: model.description.clone(),
            joins,
        },
    }
}

/// Build and serialize the model file for a dbt model
pub fn model_file(model: &TypedModel, connection: &str, use_file_path: bool) -> LookmlFile {
    let contents = lkml::dump_model(&build_model_file(model, connection, use_file_path));

    LookmlFile {
        directory: if use_file_path { model.directory() } else { String::new() },
        filename: format!("{}.model.lkml", model.name),
        contents,
    }
}
