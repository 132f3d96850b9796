//! Regression model catalogue and the fit/predict capability boundary
//!
//! The forecasting engine only depends on the [`Regressor`] trait; the
//! concrete algorithm behind it is selected at runtime from a closed
//! catalogue ([`SupportedModels`]) with static per-variant parameter tables.
//! Swapping algorithms must not change evaluator or forecaster behavior.

use crate::error::{HydroForecastError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Debug;

pub mod linear;
pub mod ridge;

pub use linear::LinearRegression;
pub use ridge::RidgeRegression;

/// Fit/predict capability expected from every regression algorithm.
pub trait Regressor: Debug {
    /// Fit the model to a feature matrix and target vector.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    /// Predict targets for a feature matrix.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>>;

    /// Name of the algorithm
    fn name(&self) -> &'static str;
}

/// Closed catalogue of selectable regression algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SupportedModels {
    LinearRegression,
    RidgeRegression,
}

impl SupportedModels {
    /// All catalogue entries.
    pub fn list() -> &'static [SupportedModels] {
        &[
            SupportedModels::LinearRegression,
            SupportedModels::RidgeRegression,
        ]
    }
}

impl fmt::Display for SupportedModels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SupportedModels::LinearRegression => write!(f, "linear_regression"),
            SupportedModels::RidgeRegression => write!(f, "ridge_regression"),
        }
    }
}

/// A hyperparameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParamValue {
    Bool(bool),
    Float(f64),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

/// Admissible values for one hyperparameter: an enumerated choice set or a
/// closed numeric range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ParamRange {
    Choices(Vec<ParamValue>),
    FloatRange { min: f64, max: f64 },
}

impl ParamRange {
    fn admits(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (ParamRange::Choices(choices), v) => choices.contains(v),
            (ParamRange::FloatRange { min, max }, ParamValue::Float(v)) => {
                *min <= *v && *v <= *max
            }
            (ParamRange::FloatRange { .. }, _) => false,
        }
    }
}

/// A catalogue entry: one algorithm with its parameter tables.
///
/// Workflow, mirroring the runtime-selection design:
/// 1. `SupportedModels::list()` enumerates the catalogue;
/// 2. `RegressionModel::build(kind)` yields the entry with its
///    `selectable_parameters` and `default_parameters` tables;
/// 3. `configure(overrides)` validates the overrides against the tables and
///    returns a ready [`Regressor`] instance.
#[derive(Debug, Clone)]
pub struct RegressionModel {
    kind: SupportedModels,
    selectable: BTreeMap<&'static str, ParamRange>,
    defaults: BTreeMap<&'static str, ParamValue>,
}

impl RegressionModel {
    /// Look up the catalogue entry for `kind`.
    pub fn build(kind: SupportedModels) -> Self {
        let mut selectable = BTreeMap::new();
        let mut defaults = BTreeMap::new();
        match kind {
            SupportedModels::LinearRegression => {
                selectable.insert(
                    "fit_intercept",
                    ParamRange::Choices(vec![ParamValue::Bool(true), ParamValue::Bool(false)]),
                );
                defaults.insert("fit_intercept", ParamValue::Bool(true));
            }
            SupportedModels::RidgeRegression => {
                selectable.insert(
                    "fit_intercept",
                    ParamRange::Choices(vec![ParamValue::Bool(true), ParamValue::Bool(false)]),
                );
                defaults.insert("fit_intercept", ParamValue::Bool(true));
                selectable.insert(
                    "lambda",
                    ParamRange::FloatRange {
                        min: 0.0,
                        max: 1000.0,
                    },
                );
                defaults.insert("lambda", ParamValue::Float(1.0));
            }
        }
        Self {
            kind,
            selectable,
            defaults,
        }
    }

    pub fn kind(&self) -> SupportedModels {
        self.kind
    }

    /// Admissible ranges and choices per hyperparameter.
    pub fn selectable_parameters(&self) -> &BTreeMap<&'static str, ParamRange> {
        &self.selectable
    }

    /// Default value per hyperparameter.
    pub fn default_parameters(&self) -> &BTreeMap<&'static str, ParamValue> {
        &self.defaults
    }

    /// Instantiate the algorithm, validating `overrides` against the tables.
    ///
    /// Unknown parameter names and out-of-range values fail with a
    /// configuration error; omitted parameters take their defaults.
    pub fn configure(
        &self,
        overrides: Option<&BTreeMap<String, ParamValue>>,
    ) -> Result<Box<dyn Regressor>> {
        let mut params = self.defaults.clone();
        if let Some(overrides) = overrides {
            for (name, value) in overrides {
                let (key, range) =
                    self.selectable.get_key_value(name.as_str()).ok_or_else(|| {
                        HydroForecastError::Configuration(format!(
                            "unknown parameter '{}' for model {}",
                            name, self.kind
                        ))
                    })?;
                if !range.admits(value) {
                    return Err(HydroForecastError::Configuration(format!(
                        "value {} for parameter '{}' of model {} is outside {:?}",
                        value, name, self.kind, range
                    )));
                }
                params.insert(*key, value.clone());
            }
        }

        let fit_intercept = matches!(params.get("fit_intercept"), Some(ParamValue::Bool(true)));
        Ok(match self.kind {
            SupportedModels::LinearRegression => Box::new(LinearRegression::new(fit_intercept)),
            SupportedModels::RidgeRegression => {
                let lambda = match params.get("lambda") {
                    Some(ParamValue::Float(v)) => *v,
                    _ => 1.0,
                };
                Box::new(RidgeRegression::new(fit_intercept, lambda))
            }
        })
    }
}

/// A model choice plus overrides, cheap to clone and rebuild per fold.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    kind: SupportedModels,
    overrides: BTreeMap<String, ParamValue>,
}

impl ModelSpec {
    pub fn new(kind: SupportedModels) -> Self {
        Self {
            kind,
            overrides: BTreeMap::new(),
        }
    }

    /// Override one hyperparameter. Validated on [`ModelSpec::build`].
    pub fn with_parameter(mut self, name: &str, value: ParamValue) -> Self {
        self.overrides.insert(name.to_string(), value);
        self
    }

    pub fn kind(&self) -> SupportedModels {
        self.kind
    }

    /// Instantiate a fresh, unfitted regressor.
    pub fn build(&self) -> Result<Box<dyn Regressor>> {
        let overrides = if self.overrides.is_empty() {
            None
        } else {
            Some(&self.overrides)
        };
        RegressionModel::build(self.kind).configure(overrides)
    }
}

/// Check a feature matrix and target vector for shape problems before
/// fitting.
pub(crate) fn check_training_shape(x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    if x.is_empty() || y.is_empty() {
        return Err(HydroForecastError::InsufficientData(
            "training set is empty".to_string(),
        ));
    }
    if x.len() != y.len() {
        return Err(HydroForecastError::Configuration(format!(
            "feature matrix has {} rows but target vector has {}",
            x.len(),
            y.len()
        )));
    }
    let width = x[0].len();
    if width == 0 || x.iter().any(|row| row.len() != width) {
        return Err(HydroForecastError::Configuration(
            "feature matrix rows must be non-empty and of equal width".to_string(),
        ));
    }
    Ok(width)
}

/// Solve the normal equations for (optionally intercept-augmented,
/// optionally ridge-regularized) least squares.
///
/// Returns `(coefficients, intercept)`; the intercept is 0 when
/// `fit_intercept` is false. The intercept is never regularized.
pub(crate) fn solve_normal_equations(
    x: &[Vec<f64>],
    y: &[f64],
    fit_intercept: bool,
    lambda: f64,
) -> Result<(Vec<f64>, f64)> {
    let width = check_training_shape(x, y)?;
    let offset = usize::from(fit_intercept);
    let dim = width + offset;

    let mut a = vec![vec![0.0; dim]; dim];
    let mut b = vec![0.0; dim];
    for (row, &target) in x.iter().zip(y) {
        for i in 0..dim {
            let xi = if fit_intercept && i == 0 {
                1.0
            } else {
                row[i - offset]
            };
            b[i] += xi * target;
            for j in i..dim {
                let xj = if fit_intercept && j == 0 {
                    1.0
                } else {
                    row[j - offset]
                };
                a[i][j] += xi * xj;
            }
        }
    }
    // Mirror the upper triangle and regularize the non-intercept diagonal.
    for i in 0..dim {
        for j in 0..i {
            a[i][j] = a[j][i];
        }
        if i >= offset {
            a[i][i] += lambda;
        }
    }

    let solution = solve_linear_system(a, b)?;
    if fit_intercept {
        Ok((solution[1..].to_vec(), solution[0]))
    } else {
        Ok((solution, 0.0))
    }
}

/// Gaussian elimination with partial pivoting.
fn solve_linear_system(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&r, &s| a[r][col].abs().total_cmp(&a[s][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(HydroForecastError::InsufficientData(
                "normal matrix is singular; training rows are too few or collinear".to_string(),
            ));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);
        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for col in row + 1..n {
            acc -= a[row][col] * solution[col];
        }
        solution[row] = acc / a[row][row];
    }
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn catalogue_lists_both_models() {
        assert_eq!(SupportedModels::list().len(), 2);
    }

    #[test]
    fn defaults_fall_inside_selectable_ranges() {
        for &kind in SupportedModels::list() {
            let entry = RegressionModel::build(kind);
            for (name, value) in entry.default_parameters() {
                let range = &entry.selectable_parameters()[name];
                assert!(range.admits(value), "{} default {} out of range", kind, name);
            }
        }
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let entry = RegressionModel::build(SupportedModels::LinearRegression);
        let mut overrides = BTreeMap::new();
        overrides.insert("n_estimators".to_string(), ParamValue::Float(50.0));
        let result = entry.configure(Some(&overrides));
        assert!(matches!(
            result,
            Err(HydroForecastError::Configuration(_))
        ));
    }

    #[test]
    fn out_of_range_parameter_is_rejected() {
        let entry = RegressionModel::build(SupportedModels::RidgeRegression);
        let mut overrides = BTreeMap::new();
        overrides.insert("lambda".to_string(), ParamValue::Float(-1.0));
        assert!(entry.configure(Some(&overrides)).is_err());
        overrides.insert("lambda".to_string(), ParamValue::Float(10.0));
        assert!(entry.configure(Some(&overrides)).is_ok());
    }

    #[test]
    fn solver_recovers_known_system() {
        let a = vec![
            vec![2.0, 1.0, 0.0],
            vec![1.0, 3.0, 1.0],
            vec![0.0, 1.0, 2.0],
        ];
        // Solution (1, 2, 3).
        let b = vec![4.0, 10.0, 8.0];
        let solution = solve_linear_system(a, b).unwrap();
        assert_approx_eq!(solution[0], 1.0, 1e-9);
        assert_approx_eq!(solution[1], 2.0, 1e-9);
        assert_approx_eq!(solution[2], 3.0, 1e-9);
    }

    #[test]
    fn singular_system_is_insufficient_data() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let b = vec![1.0, 2.0];
        assert!(matches!(
            solve_linear_system(a, b),
            Err(HydroForecastError::InsufficientData(_))
        ));
    }
}
