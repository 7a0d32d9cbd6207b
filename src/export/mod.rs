//! Export of diagnostic runs.
//!
//! Provides a CSV tick time series and a JSON session summary. Both are
//! debugging artefacts written under an `exports/` directory by default.

mod csv_export;
mod json_export;

pub use csv_export::{CsvExporter, TickRecord};
pub use json_export::{export_session_json, export_session_json_to, SessionSummary};
