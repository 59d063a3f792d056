//! # Clinicdb - Dental Clinic Data Pipeline
//!
//! Schema provisioning, CSV bulk loading, and billing reports for a dental
//! clinic database.
//!
//! Clinicdb provides:
//! - Idempotent SQLite schema for dentists, patients, appointments, and billing
//! - A bulk loader driven by a static per-table column registry
//! - Fixed reporting queries (roster, appointment counts, billing totals)
//! - A bar chart of total billing per patient rendered to SVG

pub mod chart;
pub mod config;
pub mod loader;
pub mod record;
pub mod report;
pub mod storage;
pub mod ui;

// Re-exports for convenient access
pub use loader::{BulkLoader, LoadMode, LoadReport};
pub use record::{Appointment, Billing, Dentist, Patient, PatientTotal};
pub use report::ReportEngine;
pub use storage::ClinicStore;

/// Result type alias for Clinicdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Clinicdb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unsupported table: {0}")]
    UnsupportedTable(String),

    #[error("Data row {row} in `{table}` has {got} fields, expected {expected}")]
    RowShape {
        table: &'static str,
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Malformed `{column}` value {value:?} in data row {row} of `{table}`")]
    MalformedField {
        table: &'static str,
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("Insert into `{table}` failed at data row {row}: {source}")]
    RowInsert {
        table: &'static str,
        row: usize,
        source: rusqlite::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Chart error: {0}")]
    Chart(String),
}
