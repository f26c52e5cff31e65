//! Whole-project generation

use crate::error::GenerateError;
use crate::{explore, view};
use dbt2lookml_core::{Diagnostic, LookmlFile};
use dbt2lookml_dbt::{SupportedAdapter, TypedModel};

/// Options shared by every generated file
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Mirror each model's directory in the output tree
    pub use_file_path: bool,

    /// Models carrying this tag also get a `.model.lkml` with an explore
    pub explore_tag: Option<String>,

    /// Looker connection name written into model files
    pub connection: String,
}

/// Everything produced for a project
#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub views: Vec<LookmlFile>,
    pub models: Vec<LookmlFile>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate views for all models and model files for explore-tagged ones
pub fn generate(
    models: &[TypedModel],
    adapter: SupportedAdapter,
    options: &GenerateOptions,
) -> Result<Generated, GenerateError> {
    let mut generated = Generated::default();

    for model in models {
        let (file, diagnostics) = view::view_file(model, adapter, options.use_file_path)?;
        generated.views.push(file);
        generated.diagnostics.extend(diagnostics);
    }

    if let Some(tag) = &options.explore_tag {
        generated.models = models
            .iter()
            .filter(|model| model.has_tag(tag))
            .map(|model| explore::model_file(model, &options.connection, options.use_file_path))
            .collect();
    }

    Ok(generated)
}
