//! # Fixed Index
//!
//! Calendar arithmetic and timeseries types for data with annual periodicity.
//!
//! Hydrological services report discharge and precipitation over fixed
//! calendar periods that general-purpose time series libraries do not model:
//! pentads (5-day), decads (10-day), months, days (with a 365-day template)
//! and seasonal windows such as April to September. "Fixed index" means every
//! year has the same number of periods and each period occupies the same
//! position in every year.
//!
//! The crate provides:
//!
//! - [`Mode`]: the period frequency, with unambiguous date-to-period and
//!   period-to-date arithmetic (including leap-day folding).
//! - [`FixedIndexTimeseries`]: an immutable, ordered mapping from periods to
//!   values, with lag slicing, period shifting and downsampling.
//! - [`read_csv`]: a loader for the one-row-per-year tabular format.
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use fixed_index::{Mode, Period};
//!
//! let date = NaiveDate::from_ymd_opt(2011, 6, 15).unwrap();
//! let period = Mode::Monthly.date_to_period(date).unwrap();
//! assert_eq!(period, Period::new(2011, 5));
//! ```

pub mod calendar;
pub mod csv;
pub mod error;
pub mod timeseries;

pub use crate::calendar::{Mode, Period};
pub use crate::csv::read_csv;
pub use crate::error::{FixedIndexError, Result};
pub use crate::timeseries::FixedIndexTimeseries;
