//! Period calendar: date to period arithmetic for every supported frequency

use crate::error::{FixedIndexError, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cumulative days before each month in a 365-day template year.
const DAYS_BEFORE_MONTH: [u32; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Period frequency of a fixed-index timeseries.
///
/// Every mode divides the year into the same periods every year. The daily
/// mode uses a 365-day template: February 29 folds into February 28, so
/// indices after February are identical in leap and common years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// 5-day periods, six per month; the sixth absorbs remainder days.
    Pentadal,
    /// 10-day periods, three per month; the third absorbs remainder days.
    Decadal,
    /// Calendar months.
    Monthly,
    /// Calendar days over a 365-day template.
    Daily,
    /// A single period per year spanning whole months, e.g. April-September.
    /// Windows must not cross a year boundary; build with [`Mode::seasonal`].
    Seasonal { start_month: u32, end_month: u32 },
}

/// A period identity: a year and a zero-based index within that year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub index: u32,
}

impl Period {
    pub fn new(year: i32, index: u32) -> Self {
        Self { year, index }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:02}", self.year, self.index)
    }
}

impl Mode {
    /// Create a validated seasonal mode.
    pub fn seasonal(start_month: u32, end_month: u32) -> Result<Self> {
        if !(1..=12).contains(&start_month) || !(1..=12).contains(&end_month) {
            return Err(FixedIndexError::Configuration(format!(
                "seasonal window months must be in 1..=12, got {:02}-{:02}",
                start_month, end_month
            )));
        }
        if start_month > end_month {
            return Err(FixedIndexError::Configuration(format!(
                "seasonal window must not span a year boundary: start month {:02} is after end month {:02}",
                start_month, end_month
            )));
        }
        Ok(Mode::Seasonal {
            start_month,
            end_month,
        })
    }

    /// Number of periods per year for this mode.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Mode::Pentadal => 72,
            Mode::Decadal => 36,
            Mode::Monthly => 12,
            Mode::Daily => 365,
            Mode::Seasonal { .. } => 1,
        }
    }

    /// Map a calendar date to the period that contains it.
    pub fn date_to_period(&self, date: NaiveDate) -> Result<Period> {
        self.check_window()?;
        let year = date.year();
        let month0 = date.month0();
        let day = date.day();
        let index = match self {
            Mode::Pentadal => month0 * 6 + ((day - 1) / 5).min(5),
            Mode::Decadal => month0 * 3 + ((day - 1) / 10).min(2),
            Mode::Monthly => month0,
            Mode::Daily => {
                // Fold Feb 29 into Feb 28 so every year has 365 periods.
                let day = if date.month() == 2 && day == 29 { 28 } else { day };
                DAYS_BEFORE_MONTH[month0 as usize] + day - 1
            }
            Mode::Seasonal {
                start_month,
                end_month,
            } => {
                if date.month() < *start_month || date.month() > *end_month {
                    return Err(FixedIndexError::OutOfWindow {
                        date,
                        start_month: *start_month,
                        end_month: *end_month,
                    });
                }
                0
            }
        };
        Ok(Period::new(year, index))
    }

    /// First calendar day of a period; the inverse of [`Mode::date_to_period`]
    /// on canonical dates.
    pub fn period_to_canonical_date(&self, period: Period) -> Result<NaiveDate> {
        self.check_window()?;
        if period.index >= self.periods_per_year() {
            return Err(FixedIndexError::Configuration(format!(
                "period index {} out of range for {} mode ({} periods per year)",
                period.index,
                self,
                self.periods_per_year()
            )));
        }
        let (month, day) = match self {
            Mode::Pentadal => (period.index / 6 + 1, (period.index % 6) * 5 + 1),
            Mode::Decadal => (period.index / 3 + 1, (period.index % 3) * 10 + 1),
            Mode::Monthly => (period.index + 1, 1),
            Mode::Daily => {
                let month0 = DAYS_BEFORE_MONTH
                    .iter()
                    .rposition(|&d| d <= period.index)
                    .unwrap_or(0);
                (
                    month0 as u32 + 1,
                    period.index - DAYS_BEFORE_MONTH[month0] + 1,
                )
            }
            Mode::Seasonal { start_month, .. } => (*start_month, 1),
        };
        NaiveDate::from_ymd_opt(period.year, month, day).ok_or_else(|| {
            FixedIndexError::Configuration(format!(
                "period {} has no canonical date in {} mode",
                period, self
            ))
        })
    }

    /// All periods of one year, in chronological order.
    pub fn enumerate_periods(&self, year: i32) -> Vec<Period> {
        (0..self.periods_per_year())
            .map(|index| Period::new(year, index))
            .collect()
    }

    /// Shift a period by `n` periods, crossing year boundaries as needed.
    pub fn shift_period(&self, period: Period, n: i64) -> Period {
        let ppy = i64::from(self.periods_per_year());
        let total = i64::from(period.year) * ppy + i64::from(period.index) + n;
        Period::new(total.div_euclid(ppy) as i32, total.rem_euclid(ppy) as u32)
    }

    fn check_window(&self) -> Result<()> {
        if let Mode::Seasonal {
            start_month,
            end_month,
        } = self
        {
            // Re-validate so hand-built Seasonal values cannot bypass `seasonal`.
            Mode::seasonal(*start_month, *end_month)?;
        }
        Ok(())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Pentadal => write!(f, "pentadal"),
            Mode::Decadal => write!(f, "decadal"),
            Mode::Monthly => write!(f, "monthly"),
            Mode::Daily => write!(f, "daily"),
            Mode::Seasonal {
                start_month,
                end_month,
            } => write!(f, "seasonal {:02}-{:02}", start_month, end_month),
        }
    }
}
