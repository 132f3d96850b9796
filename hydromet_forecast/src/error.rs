//! Error types for the hydromet_forecast crate

use fixed_index::{FixedIndexError, Period};
use thiserror::Error;

/// Custom error types for the hydromet_forecast crate
#[derive(Debug, Error)]
pub enum HydroForecastError {
    /// Invalid model choice, hyperparameter, predictor wiring or window
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Calendar errors from the fixed_index crate, including dates outside
    /// a seasonal window
    #[error(transparent)]
    Calendar(#[from] FixedIndexError),

    /// Not enough history, rows or folds for the requested operation
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A required value is missing where completeness is mandatory
    #[error("missing value in series '{series}' at period {period}")]
    MissingData { series: String, period: Period },

    /// Predict was requested before the model was trained
    #[error("model state error: {0}")]
    ModelState(String),

    /// A progress observer requested an abort
    #[error("aborted: {0}")]
    Aborted(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, HydroForecastError>;
