//! dbt2lookml Core
//!
//! Stable domain types shared by the ingestion and generation crates.
//! Never rename diagnostic codes - they are part of the report format.

pub mod diagnostic;
pub mod lookml;
pub mod report;
pub mod config;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, Location};
pub use lookml::{
    LookerType, MeasureType, JoinType, JoinRelationship, ValueFormatName, Hidden, Timeframe,
    View, Dimension, DimensionGroup, Measure, MeasureFilter, ModelFile, Explore, Join, LookmlFile,
};
pub use report::{Report, ReportVersion, RunSummary};
pub use config::{Config, ConfigError, LogLevel};
