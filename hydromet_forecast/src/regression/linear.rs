//! Ordinary least squares via the normal equations

use crate::error::{HydroForecastError, Result};
use crate::regression::{solve_normal_equations, Regressor};

/// Ordinary least squares regression with an optional intercept term.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    fit_intercept: bool,
    /// `(coefficients, intercept)` once fitted
    weights: Option<(Vec<f64>, f64)>,
}

impl LinearRegression {
    pub fn new(fit_intercept: bool) -> Self {
        Self {
            fit_intercept,
            weights: None,
        }
    }

    /// Fitted coefficients, if any.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.weights.as_ref().map(|(c, _)| c.as_slice())
    }

    /// Fitted intercept; 0 when `fit_intercept` is false.
    pub fn intercept(&self) -> Option<f64> {
        self.weights.as_ref().map(|(_, b)| *b)
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.weights = Some(solve_normal_equations(x, y, self.fit_intercept, 0.0)?);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let (coefficients, intercept) = self.weights.as_ref().ok_or_else(|| {
            HydroForecastError::ModelState(
                "linear regression must be fitted before predicting".to_string(),
            )
        })?;
        x.iter()
            .map(|row| {
                if row.len() != coefficients.len() {
                    return Err(HydroForecastError::Configuration(format!(
                        "prediction row has {} features, model was fitted with {}",
                        row.len(),
                        coefficients.len()
                    )));
                }
                Ok(intercept
                    + row
                        .iter()
                        .zip(coefficients)
                        .map(|(xi, wi)| xi * wi)
                        .sum::<f64>())
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "linear_regression"
    }
}
