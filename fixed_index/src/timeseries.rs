//! Annually periodic timeseries keyed by fixed periods

use crate::calendar::{Mode, Period};
use crate::error::{FixedIndexError, Result};
use std::collections::{BTreeMap, BTreeSet};

/// An immutable, ordered mapping from periods to values.
///
/// Built once from year rows and never mutated in place; operations that
/// change the data ([`shift`](Self::shift), [`downsample`](Self::downsample))
/// return a new series. Missing values are represented by absence, never by
/// zero or NaN.
#[derive(Debug, Clone)]
pub struct FixedIndexTimeseries {
    name: String,
    mode: Mode,
    values: BTreeMap<Period, f64>,
}

impl FixedIndexTimeseries {
    /// Build a series from rows of `(year, period values)`.
    ///
    /// Each row must carry exactly `periods_per_year` cells for `mode`;
    /// `None` and non-finite cells become missing values. Duplicate years
    /// are rejected.
    pub fn from_rows(name: &str, mode: Mode, rows: Vec<(i32, Vec<Option<f64>>)>) -> Result<Self> {
        let ppy = mode.periods_per_year() as usize;
        let mut values = BTreeMap::new();
        let mut seen_years = BTreeSet::new();
        for (year, cells) in rows {
            if cells.len() != ppy {
                return Err(FixedIndexError::Configuration(format!(
                    "series '{}': row for year {} has {} cells, {} mode requires {}",
                    name,
                    year,
                    cells.len(),
                    mode,
                    ppy
                )));
            }
            if !seen_years.insert(year) {
                return Err(FixedIndexError::Configuration(format!(
                    "series '{}': duplicate row for year {}",
                    name, year
                )));
            }
            for (index, cell) in cells.into_iter().enumerate() {
                // NaN and infinities denote missing, same as an absent cell.
                if let Some(value) = cell.filter(|v| v.is_finite()) {
                    values.insert(Period::new(year, index as u32), value);
                }
            }
        }
        Ok(Self {
            name: name.to_string(),
            mode,
            values,
        })
    }

    /// Series identity, used in error diagnostics and predictor matching.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Value at `period`, or `None` when missing.
    pub fn get(&self, period: Period) -> Option<f64> {
        self.values.get(&period).copied()
    }

    /// Earliest period with a known value.
    pub fn first_period(&self) -> Option<Period> {
        self.values.keys().next().copied()
    }

    /// Latest period with a known value.
    pub fn last_period(&self) -> Option<Period> {
        self.values.keys().next_back().copied()
    }

    /// Number of present (non-missing) values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over all present `(period, value)` pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.values.iter().map(|(p, v)| (*p, *v))
    }

    /// Up to `count` periods chronologically ending at `target`, oldest first.
    ///
    /// The window is truncated at the series' first known period, so fewer
    /// than `count` entries come back when history is short; gaps inside the
    /// window stay in place as `None`. Never more than `count`, never padded.
    pub fn slice_preceding(&self, target: Period, count: usize) -> Vec<(Period, Option<f64>)> {
        let first = match self.first_period() {
            Some(first) => first,
            None => return Vec::new(),
        };
        (0..count)
            .rev()
            .map(|back| self.mode.shift_period(target, -(back as i64)))
            .filter(|period| *period >= first)
            .map(|period| (period, self.get(period)))
            .collect()
    }

    /// A new series with every period shifted by `n` periods.
    ///
    /// Lets lagged variants of a series be expressed without re-indexing the
    /// underlying data by hand.
    pub fn shift(&self, n: i64) -> Self {
        let values = self
            .values
            .iter()
            .map(|(period, value)| (self.mode.shift_period(*period, n), *value))
            .collect();
        Self {
            name: self.name.clone(),
            mode: self.mode,
            values,
        }
    }

    /// Aggregate to a coarser mode by arithmetic mean of member periods.
    ///
    /// A target period is missing unless every member period is present;
    /// partial windows never average silently. Valid targets are any mode
    /// with fewer periods per year than the source; seasonal targets take
    /// their members from the window months only.
    pub fn downsample(&self, to: Mode) -> Result<Self> {
        if to.periods_per_year() >= self.mode.periods_per_year() {
            return Err(FixedIndexError::Configuration(format!(
                "series '{}': cannot downsample from {} to {} mode",
                self.name, self.mode, to
            )));
        }
        let mut values = BTreeMap::new();
        let (first, last) = match (self.first_period(), self.last_period()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Ok(Self {
                    name: self.name.clone(),
                    mode: to,
                    values,
                })
            }
        };
        for year in first.year..=last.year {
            // Group this year's source periods under the target period that
            // contains their canonical date.
            let mut groups: BTreeMap<Period, Vec<Option<f64>>> = BTreeMap::new();
            for source in self.mode.enumerate_periods(year) {
                let date = self.mode.period_to_canonical_date(source)?;
                match to.date_to_period(date) {
                    Ok(target) => groups.entry(target).or_default().push(self.get(source)),
                    // Dates outside a seasonal window carry no data downstream.
                    Err(FixedIndexError::OutOfWindow { .. }) => continue,
                    Err(err) => return Err(err),
                }
            }
            for (target, members) in groups {
                if members.iter().all(Option::is_some) {
                    let sum: f64 = members.iter().flatten().sum();
                    values.insert(target, sum / members.len() as f64);
                }
            }
        }
        Ok(Self {
            name: self.name.clone(),
            mode: to,
            values,
        })
    }
}
