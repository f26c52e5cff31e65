//! Writing generated files to disk
//!
//! Views land in `<output>/views/<directory>/`, model files in
//! `<output>/<directory>/`.

use crate::error::GenerateError;
use crate::generator::Generated;
use dbt2lookml_core::LookmlFile;
use std::path::{Path, PathBuf};

/// Sub-directory of the output root that holds view files
pub const VIEWS_DIR: &str = "views";

/// Write every generated file; returns written paths relative to `output_dir`
pub fn write_all(output_dir: &Path, generated: &Generated) -> Result<Vec<PathBuf>, GenerateError> {
    let mut written = Vec::with_capacity(generated.views.len() + generated.models.len());

    for file in &generated.views {
        written.push(write_file(output_dir, &Path::new(VIEWS_DIR).join(&file.directory), file)?);
    }
    for file in &generated.models {
        written.push(write_file(output_dir, Path::new(&file.directory), file)?);
    }

    Ok(written)
}

fn write_file(output_dir: &Path, directory: &Path, file: &LookmlFile) -> Result<PathBuf, GenerateError> {
    let relative = directory.join(&file.filename);
    let path = output_dir.join(&relative);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    std::fs::write(&path, &file.contents).map_err(|source| GenerateError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::debug!("Wrote {}", path.display());
    Ok(relative)
}
