//! Lagged feature assembly aligned to target periods
//!
//! Feature windows are expressed in each predictor's own calendar: the
//! target date is mapped into the predictor's mode and the lag window is
//! counted back from there. A monthly predictor can therefore feed a
//! seasonal target; a seasonal window starting in April with a monthly
//! predictor and lag length 3 pulls January through March.
//!
//! Leakage policy: exogenous features exclude the target period itself by
//! default, so nothing observed during the forecasted period enters the
//! feature vector. [`Predictor::including_target`] opts in explicitly for
//! series that are known before the period ends.

use crate::error::{HydroForecastError, Result};
use chrono::NaiveDate;
use fixed_index::{FixedIndexError, FixedIndexTimeseries, Period};

/// One predictor series with its lag window configuration.
#[derive(Debug, Clone)]
pub struct Predictor {
    series: FixedIndexTimeseries,
    lag_length: usize,
    include_target: bool,
}

impl Predictor {
    /// Use the `lag_length` periods preceding the target period.
    pub fn new(series: FixedIndexTimeseries, lag_length: usize) -> Result<Self> {
        if lag_length == 0 {
            return Err(HydroForecastError::Configuration(format!(
                "predictor '{}': lag length must be at least 1",
                series.name()
            )));
        }
        Ok(Self {
            series,
            lag_length,
            include_target: false,
        })
    }

    /// Shift the window forward by one period so it ends at the target
    /// period itself instead of the period before it.
    pub fn including_target(mut self) -> Self {
        self.include_target = true;
        self
    }

    pub fn name(&self) -> &str {
        self.series.name()
    }

    pub fn series(&self) -> &FixedIndexTimeseries {
        &self.series
    }

    pub fn lag_length(&self) -> usize {
        self.lag_length
    }

    pub fn include_target(&self) -> bool {
        self.include_target
    }

    /// Replace the backing series, keeping the window configuration.
    /// Used at prediction time when fresh data arrives under the same name.
    pub(crate) fn with_series(&self, series: FixedIndexTimeseries) -> Self {
        Self {
            series,
            lag_length: self.lag_length,
            include_target: self.include_target,
        }
    }

    /// The window periods for a target date, oldest first, in this
    /// predictor's own calendar.
    fn window_periods(&self, target_date: NaiveDate) -> fixed_index::Result<Vec<Period>> {
        let mode = self.series.mode();
        let anchor = mode.date_to_period(target_date)?;
        let newest_back = i64::from(!self.include_target);
        Ok((0..self.lag_length as i64)
            .rev()
            .map(|back| mode.shift_period(anchor, -(back + newest_back)))
            .collect())
    }

    /// Window values for a target date; `None` when the date cannot be
    /// mapped into this predictor's calendar (seasonal window miss).
    fn window_values(&self, target_date: NaiveDate) -> fixed_index::Result<Option<Vec<(Period, Option<f64>)>>> {
        match self.window_periods(target_date) {
            Ok(periods) => Ok(Some(
                periods
                    .into_iter()
                    .map(|period| (period, self.series.get(period)))
                    .collect(),
            )),
            Err(FixedIndexError::OutOfWindow { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// One assembled training row.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    /// Target period the label belongs to
    pub target: Period,
    /// Concatenated lag windows, in predictor order, oldest first per window
    pub features: Vec<f64>,
    /// Observed target value
    pub label: f64,
}

/// Assemble training rows for every labelled period of `y`.
///
/// Rows with any missing feature slot or an unmappable window are silently
/// dropped; training tolerates gaps, prediction does not (see
/// [`prediction_features`]).
pub fn training_rows(
    predictors: &[Predictor],
    y: &FixedIndexTimeseries,
) -> Result<Vec<FeatureRow>> {
    let mut rows = Vec::new();
    'periods: for (target, label) in y.iter() {
        let target_date = y.mode().period_to_canonical_date(target)?;
        let mut features = Vec::with_capacity(predictors.iter().map(Predictor::lag_length).sum());
        for predictor in predictors {
            match predictor.window_values(target_date)? {
                Some(values) if values.iter().all(|(_, v)| v.is_some()) => {
                    features.extend(values.into_iter().filter_map(|(_, v)| v));
                }
                _ => continue 'periods,
            }
        }
        rows.push(FeatureRow {
            target,
            features,
            label,
        });
    }
    Ok(rows)
}

/// Assemble the single feature vector for a prediction at `target_date`.
///
/// A prediction cannot drop part of itself: any missing feature slot fails
/// with an insufficient-data error naming the series and period.
pub fn prediction_features(predictors: &[Predictor], target_date: NaiveDate) -> Result<Vec<f64>> {
    let mut features = Vec::with_capacity(predictors.iter().map(Predictor::lag_length).sum());
    for predictor in predictors {
        let periods = predictor.window_periods(target_date)?;
        for period in periods {
            match predictor.series().get(period) {
                Some(value) => features.push(value),
                None => {
                    return Err(HydroForecastError::InsufficientData(format!(
                        "series '{}' has no value at period {} needed to predict for {}",
                        predictor.name(),
                        period,
                        target_date
                    )))
                }
            }
        }
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use fixed_index::Mode;

    fn monthly(name: &str, rows: Vec<(i32, Vec<Option<f64>>)>) -> FixedIndexTimeseries {
        FixedIndexTimeseries::from_rows(name, Mode::Monthly, rows).unwrap()
    }

    fn full_year(year: i32, values: [f64; 12]) -> (i32, Vec<Option<f64>>) {
        (year, values.iter().copied().map(Some).collect())
    }

    #[test]
    fn windows_exclude_the_target_period_by_default() {
        let series = monthly(
            "P",
            vec![full_year(
                2010,
                [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            )],
        );
        let predictor = Predictor::new(series, 3).unwrap();
        // Target June 2010: window is March, April, May.
        let date = NaiveDate::from_ymd_opt(2010, 6, 1).unwrap();
        let features = prediction_features(&[predictor], date).unwrap();
        assert_eq!(features, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn including_target_shifts_the_window() {
        let series = monthly(
            "P",
            vec![full_year(
                2010,
                [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            )],
        );
        let predictor = Predictor::new(series, 3).unwrap().including_target();
        let date = NaiveDate::from_ymd_opt(2010, 6, 1).unwrap();
        let features = prediction_features(&[predictor], date).unwrap();
        assert_eq!(features, vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn zero_lag_length_is_rejected() {
        let series = monthly("P", vec![full_year(2010, [0.0; 12])]);
        assert!(matches!(
            Predictor::new(series, 0),
            Err(HydroForecastError::Configuration(_))
        ));
    }

    #[test]
    fn training_rows_drop_incomplete_periods_silently() {
        let mut x_cells: Vec<Option<f64>> = (1..=12).map(|v| Some(v as f64)).collect();
        x_cells[0] = None; // January gap in the predictor
        let x = monthly("P", vec![(2010, x_cells)]);
        let y = monthly("Q", vec![full_year(2010, [10.0; 12])]);

        let predictor = Predictor::new(x, 2).unwrap();
        let rows = training_rows(&[predictor], &y).unwrap();

        // Periods needing January or pre-2010 history are dropped: usable
        // targets are April..December (their two-month windows are complete).
        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0].target, Period::new(2010, 3));
        assert_eq!(rows[0].features, vec![2.0, 3.0]);
        assert_approx_eq!(rows[0].label, 10.0);
    }

    #[test]
    fn feature_order_is_predictor_then_oldest_first() {
        let a = monthly(
            "A",
            vec![full_year(
                2010,
                [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            )],
        );
        let b = monthly(
            "B",
            vec![full_year(
                2010,
                [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0, 110.0, 120.0],
            )],
        );
        let predictors = vec![
            Predictor::new(a, 2).unwrap(),
            Predictor::new(b, 1).unwrap(),
        ];
        let date = NaiveDate::from_ymd_opt(2010, 4, 1).unwrap();
        let features = prediction_features(&predictors, date).unwrap();
        assert_eq!(features, vec![2.0, 3.0, 30.0]);
    }

    #[test]
    fn missing_prediction_slot_is_an_error() {
        let mut cells: Vec<Option<f64>> = (1..=12).map(|v| Some(v as f64)).collect();
        cells[4] = None; // May gap
        let x = monthly("P", vec![(2010, cells)]);
        let predictor = Predictor::new(x, 3).unwrap();
        let date = NaiveDate::from_ymd_opt(2010, 7, 1).unwrap();
        let result = prediction_features(&[predictor], date);
        assert!(matches!(
            result,
            Err(HydroForecastError::InsufficientData(_))
        ));
    }

    #[test]
    fn seasonal_target_pulls_from_monthly_predictors() {
        let x = monthly(
            "snow",
            vec![full_year(
                2010,
                [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            )],
        );
        let predictor = Predictor::new(x, 3).unwrap();
        // April-September seasonal period canonical date is April 1.
        let date = NaiveDate::from_ymd_opt(2010, 4, 1).unwrap();
        let features = prediction_features(&[predictor], date).unwrap();
        assert_eq!(features, vec![1.0, 2.0, 3.0]);
    }
}
