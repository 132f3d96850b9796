//! Error types for the fixed_index crate

use chrono::NaiveDate;
use thiserror::Error;

/// Custom error types for the fixed_index crate
#[derive(Debug, Error)]
pub enum FixedIndexError {
    /// Invalid mode, malformed row shape or invalid seasonal window
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A date fell outside a seasonal window
    #[error("date {date} is outside the seasonal window {start_month:02}-{end_month:02}")]
    OutOfWindow {
        date: NaiveDate,
        start_month: u32,
        end_month: u32,
    },

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, FixedIndexError>;
