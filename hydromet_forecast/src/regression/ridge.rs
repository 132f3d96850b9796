//! Ridge regression: least squares with L2-penalized coefficients

use crate::error::{HydroForecastError, Result};
use crate::regression::{solve_normal_equations, Regressor};

/// Ridge regression; `lambda` shrinks the coefficients, the intercept is
/// never penalized. `lambda = 0` is ordinary least squares.
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    fit_intercept: bool,
    lambda: f64,
    weights: Option<(Vec<f64>, f64)>,
}

impl RidgeRegression {
    pub fn new(fit_intercept: bool, lambda: f64) -> Self {
        Self {
            fit_intercept,
            lambda,
            weights: None,
        }
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn coefficients(&self) -> Option<&[f64]> {
        self.weights.as_ref().map(|(c, _)| c.as_slice())
    }
}

impl Regressor for RidgeRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        self.weights = Some(solve_normal_equations(
            x,
            y,
            self.fit_intercept,
            self.lambda,
        )?);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>> {
        let (coefficients, intercept) = self.weights.as_ref().ok_or_else(|| {
            HydroForecastError::ModelState(
                "ridge regression must be fitted before predicting".to_string(),
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
        "ridge_regression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn zero_lambda_matches_least_squares() {
        let x: Vec<Vec<f64>> = (0..15).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| 1.5 + 2.0 * r[0]).collect();

        let mut model = RidgeRegression::new(true, 0.0);
        model.fit(&x, &y).unwrap();
        assert_approx_eq!(model.coefficients().unwrap()[0], 2.0, 1e-6);
    }

    #[test]
    fn larger_lambda_shrinks_coefficients() {
        let x: Vec<Vec<f64>> = (0..15).map(|i| vec![i as f64]).collect();
        let y: Vec<f64> = x.iter().map(|r| 2.0 * r[0]).collect();

        let mut weak = RidgeRegression::new(true, 0.1);
        let mut strong = RidgeRegression::new(true, 100.0);
        weak.fit(&x, &y).unwrap();
        strong.fit(&x, &y).unwrap();
        assert!(
            strong.coefficients().unwrap()[0].abs() < weak.coefficients().unwrap()[0].abs()
        );
    }

    #[test]
    fn ridge_handles_collinear_features() {
        // Duplicated column: singular for OLS, solvable with a penalty.
        let x: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, i as f64]).collect();
        let y: Vec<f64> = (0..10).map(|i| 3.0 * i as f64).collect();

        let mut model = RidgeRegression::new(true, 1.0);
        assert!(model.fit(&x, &y).is_ok());
    }
}
