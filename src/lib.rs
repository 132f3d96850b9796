//! # Hydromet Forecasting
//!
//! Umbrella crate for the hydromet forecasting workspace. It re-exports the
//! two member crates:
//!
//! - [`fixed_index`]: the fixed-period calendar and the annually periodic
//!   timeseries built on it (pentadal, decadal, monthly, daily, seasonal).
//! - [`hydromet_forecast`]: lagged feature assembly, regression model
//!   catalogue, leakage-free cross-validation and the seasonal grid search.
//!
//! ## Example
//!
//! ```
//! use hydromet_forecasting::fixed_index::{FixedIndexTimeseries, Mode};
//!
//! let rows = vec![(2010, vec![Some(12.0); 12])];
//! let discharge = FixedIndexTimeseries::from_rows("discharge", Mode::Monthly, rows).unwrap();
//! assert_eq!(discharge.len(), 12);
//! ```

pub use fixed_index;
pub use hydromet_forecast;
