//! Diagnostic codes for non-fatal findings
//!
//! IMPORTANT: Diagnostic codes are versioned and stable.
//! NEVER rename or remove codes - they are part of the report format.
//! Add new codes with new names only.

use serde::{Deserialize, Serialize};

/// Diagnostic code registry (v1)
///
/// These codes are STABLE and VERSIONED.
/// Do NOT rename or remove codes - only add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticCode {
    // Artifact coverage (1xxx)
    /// Model is in manifest.json but was never materialized into catalog.json
    ModelMissingFromCatalog,

    /// Model has no column with a warehouse type, so no dimensions are generated
    ModelUntyped,

    // Type mapping (2xxx)
    /// Warehouse column type has no LookML equivalent for the adapter
    ColumnTypeUnsupported,
}

impl DiagnosticCode {
    /// Get the diagnostic code as a stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModelMissingFromCatalog => "MODEL_MISSING_FROM_CATALOG",
            Self::ModelUntyped => "MODEL_UNTYPED",
            Self::ColumnTypeUnsupported => "COLUMN_TYPE_UNSUPPORTED",
        }
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Warning - output was generated but is incomplete
    Warn,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
        }
    }
}

/// Where in the dbt project a finding originates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Model unique_id (e.g., "model.jaffle_shop.orders")
    pub model: String,

    /// Column name, when the finding is about a single column
    pub column: Option<String>,

    /// Model file path relative to the project root
    pub file: Option<String>,
}

impl Location {
    /// Location pointing at a whole model
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            column: None,
            file: None,
        }
    }

    /// Location pointing at one column of a model
    pub fn column(model: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            column: Some(column.into()),
            file: None,
        }
    }

    /// Attach the model file path
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.model)?;
        if let Some(column) = &self.column {
            write!(f, ".{}", column)?;
        }
        if let Some(file) = &self.file {
            write!(f, " ({})", file)?;
        }
        Ok(())
    }
}

/// A diagnostic message with structured metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Stable diagnostic code
    pub code: DiagnosticCode,

    /// Severity level
    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    /// Source location (best-effort)
    pub location: Option<Location>,
}

impl Diagnostic {
    /// Create a new diagnostic with minimal fields
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}
