//! Generation errors

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(
        "Model {model} contains a measure that references a non-existent column: {column}\n\
         Ensure that dbt model {model} contains a column: {column}"
    )]
    UnknownFilterColumn { model: String, column: String },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
