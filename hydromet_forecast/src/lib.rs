//! # Hydromet Forecast
//!
//! A Rust library for forecasting river-basin hydrological variables over
//! fixed calendar periods (pentadal, decadal, monthly, seasonal).
//!
//! ## Features
//!
//! - Lagged feature assembly aligned to the fixed-period calendar, with a
//!   leakage-free default policy (exogenous features exclude the target
//!   period)
//! - A closed regression model catalogue (linear, ridge) behind a
//!   fit/predict capability boundary
//! - Deterministic k-fold cross-validation with hydrological skill metrics
//!   (RMSE, mean bias, Nash-Sutcliffe efficiency, R²)
//! - Exhaustive seasonal grid search over predictor/lag combinations
//! - Progress reporting through an observer port with cooperative abort
//!
//! ## Quick Start
//!
//! ```no_run
//! use fixed_index::{read_csv, Mode};
//! use hydromet_forecast::evaluation::CrossValidator;
//! use hydromet_forecast::features::Predictor;
//! use hydromet_forecast::forecaster::Forecaster;
//! use hydromet_forecast::progress::NoProgress;
//! use hydromet_forecast::regression::{ModelSpec, SupportedModels};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load data
//! let discharge = read_csv("Q.csv", "discharge", Mode::Monthly)?;
//! let precipitation = read_csv("P.csv", "precipitation", Mode::Monthly)?;
//!
//! // Configure the model setup
//! let spec = ModelSpec::new(SupportedModels::LinearRegression);
//! let predictors = vec![
//!     Predictor::new(discharge.clone(), 3)?,
//!     Predictor::new(precipitation.clone(), 3)?,
//! ];
//! let mut forecaster = Forecaster::new(spec, discharge.clone(), predictors)?;
//!
//! // Assess the setup, then forecast
//! let assessment = forecaster.train_and_evaluate(&CrossValidator::default(), &mut NoProgress)?;
//! println!("{}", assessment);
//!
//! let targetdate = chrono::NaiveDate::from_ymd_opt(2011, 6, 1).unwrap();
//! let value = forecaster.predict(targetdate, &[discharge, precipitation])?;
//! println!("forecast: {:.2}", value);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod evaluation;
pub mod features;
pub mod forecaster;
pub mod progress;
pub mod regression;
pub mod seasonal;

// Re-export commonly used types
pub use crate::error::HydroForecastError;
pub use crate::evaluation::{CrossValidator, EvaluationResult};
pub use crate::features::{FeatureRow, Predictor};
pub use crate::forecaster::Forecaster;
pub use crate::progress::{NoProgress, ProgressObserver};
pub use crate::regression::{ModelSpec, Regressor, SupportedModels};
pub use crate::seasonal::{Candidate, SeasonalGridSearch, SearchOutcome};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
