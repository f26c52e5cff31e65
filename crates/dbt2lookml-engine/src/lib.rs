//! dbt2lookml engine - LookML generation
//!
//! This crate turns typed dbt models into LookML:
//! - Warehouse type mapping per adapter
//! - View and explore construction
//! - LookML serialization
//! - Writing the output tree

pub mod types;
pub mod lkml;
pub mod view;
pub mod explore;
pub mod generator;
pub mod writer;
mod error;

pub use error::GenerateError;
pub use generator::{generate, GenerateOptions, Generated};
pub use types::looker_type;
pub use view::{build_view, view_file, ViewBuild};
pub use explore::{build_model_file, model_file};
pub use writer::write_all;
