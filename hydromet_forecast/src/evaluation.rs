//! Cross-validation and forecast skill metrics
//!
//! Fold policy: rows arrive sorted by target period, are shuffled once with
//! a seeded RNG and dealt round-robin into `k` folds. Every row lands in
//! exactly one fold and the partition is identical for a given row set,
//! `k` and seed, so evaluation results are reproducible run to run.

use crate::error::{HydroForecastError, Result};
use crate::features::FeatureRow;
use crate::progress::ProgressObserver;
use crate::regression::ModelSpec;
use fixed_index::Period;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::fmt;

/// Root mean squared error of predictions against observations.
/// NaN on empty or mismatched input.
pub fn rmse(observed: &[f64], predicted: &[f64]) -> f64 {
    if observed.is_empty() || observed.len() != predicted.len() {
        return f64::NAN;
    }
    let sum: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(o, p)| (p - o).powi(2))
        .sum();
    (sum / observed.len() as f64).sqrt()
}

/// Mean bias: average of predicted minus observed. Positive means the model
/// overpredicts. NaN on empty or mismatched input.
pub fn mean_bias(observed: &[f64], predicted: &[f64]) -> f64 {
    if observed.is_empty() || observed.len() != predicted.len() {
        return f64::NAN;
    }
    observed
        .iter()
        .zip(predicted)
        .map(|(o, p)| p - o)
        .sum::<f64>()
        / observed.len() as f64
}

/// Nash-Sutcliffe efficiency: 1 minus the ratio of model error variance to
/// observed variance. 1 is a perfect fit, 0 no better than the observed
/// mean. NaN on empty, mismatched or constant observations.
pub fn nash_sutcliffe(observed: &[f64], predicted: &[f64]) -> f64 {
    if observed.is_empty() || observed.len() != predicted.len() {
        return f64::NAN;
    }
    let mean = observed.iter().sum::<f64>() / observed.len() as f64;
    let denominator: f64 = observed.iter().map(|o| (o - mean).powi(2)).sum();
    if denominator == 0.0 {
        return f64::NAN;
    }
    let numerator: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(o, p)| (o - p).powi(2))
        .sum();
    1.0 - numerator / denominator
}

/// Coefficient of determination as the squared Pearson correlation between
/// observations and predictions. NaN when either side is constant.
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    if observed.is_empty() || observed.len() != predicted.len() {
        return f64::NAN;
    }
    let n = observed.len() as f64;
    let mean_o = observed.iter().sum::<f64>() / n;
    let mean_p = predicted.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_o = 0.0;
    let mut var_p = 0.0;
    for (o, p) in observed.iter().zip(predicted) {
        cov += (o - mean_o) * (p - mean_p);
        var_o += (o - mean_o).powi(2);
        var_p += (p - mean_p).powi(2);
    }
    if var_o == 0.0 || var_p == 0.0 {
        return f64::NAN;
    }
    (cov * cov) / (var_o * var_p)
}

/// One held-out prediction.
#[derive(Debug, Clone, Serialize)]
pub struct ResidualRecord {
    pub period: Period,
    pub observed: f64,
    pub predicted: f64,
    /// observed minus predicted
    pub residual: f64,
}

/// Immutable outcome of one cross-validation run: per-fold residuals plus
/// aggregate skill metrics over all held-out predictions.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResult {
    folds: Vec<Vec<ResidualRecord>>,
    rmse: f64,
    mean_bias: f64,
    nash_sutcliffe: f64,
    r_squared: f64,
}

impl EvaluationResult {
    fn new(folds: Vec<Vec<ResidualRecord>>) -> Self {
        let mut observed = Vec::new();
        let mut predicted = Vec::new();
        for record in folds.iter().flatten() {
            observed.push(record.observed);
            predicted.push(record.predicted);
        }
        Self {
            rmse: rmse(&observed, &predicted),
            mean_bias: mean_bias(&observed, &predicted),
            nash_sutcliffe: nash_sutcliffe(&observed, &predicted),
            r_squared: r_squared(&observed, &predicted),
            folds,
        }
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    pub fn mean_bias(&self) -> f64 {
        self.mean_bias
    }

    pub fn nash_sutcliffe(&self) -> f64 {
        self.nash_sutcliffe
    }

    pub fn r_squared(&self) -> f64 {
        self.r_squared
    }

    pub fn fold_count(&self) -> usize {
        self.folds.len()
    }

    /// Residual records of one fold, or `None` for an out-of-range index.
    pub fn fold(&self, index: usize) -> Option<&[ResidualRecord]> {
        self.folds.get(index).map(Vec::as_slice)
    }

    /// All held-out records across folds, chronologically ordered.
    /// This is the residual series a report renders.
    pub fn records(&self) -> Vec<&ResidualRecord> {
        let mut records: Vec<&ResidualRecord> = self.folds.iter().flatten().collect();
        records.sort_by_key(|r| r.period);
        records
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cross-Validation Metrics:")?;
        writeln!(f, "  RMSE:           {:.4}", self.rmse)?;
        writeln!(f, "  Mean bias:      {:.4}", self.mean_bias)?;
        writeln!(f, "  Nash-Sutcliffe: {:.4}", self.nash_sutcliffe)?;
        writeln!(f, "  R²:             {:.4}", self.r_squared)?;
        Ok(())
    }
}

/// K-fold cross-validation over assembled feature rows.
#[derive(Debug, Clone, Copy)]
pub struct CrossValidator {
    k: usize,
    seed: u64,
}

impl Default for CrossValidator {
    fn default() -> Self {
        Self {
            k: 5,
            seed: Self::DEFAULT_SEED,
        }
    }
}

impl CrossValidator {
    /// Seed for the fold shuffle; fixed so identical inputs partition
    /// identically across runs.
    pub const DEFAULT_SEED: u64 = 42;

    pub fn new(k: usize) -> Result<Self> {
        if k < 2 {
            return Err(HydroForecastError::Configuration(format!(
                "cross-validation needs at least 2 folds, got {}",
                k
            )));
        }
        Ok(Self {
            k,
            seed: Self::DEFAULT_SEED,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Deterministic partition of `0..n` into `k` disjoint folds covering
    /// every index exactly once.
    pub fn partition(&self, n: usize) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);
        let mut folds = vec![Vec::with_capacity(n / self.k + 1); self.k];
        for (position, index) in indices.into_iter().enumerate() {
            folds[position % self.k].push(index);
        }
        folds
    }

    /// Cross-validate a model specification over `rows`.
    ///
    /// Each fold fits a fresh model on the complement and predicts the
    /// held-out rows. The observer is invoked after each fold; an observer
    /// error aborts the run and nothing partial is returned.
    pub fn evaluate(
        &self,
        spec: &ModelSpec,
        target_name: &str,
        rows: &[FeatureRow],
        observer: &mut dyn ProgressObserver,
    ) -> Result<EvaluationResult> {
        if rows.len() < self.k {
            return Err(HydroForecastError::InsufficientData(format!(
                "series '{}': {} usable rows cannot fill {} folds",
                target_name,
                rows.len(),
                self.k
            )));
        }

        let folds = self.partition(rows.len());
        let mut outcomes = Vec::with_capacity(self.k);
        for (fold_number, held_out) in folds.iter().enumerate() {
            let train_x: Vec<Vec<f64>> = folds
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != fold_number)
                .flat_map(|(_, fold)| fold.iter().map(|&i| rows[i].features.clone()))
                .collect();
            let train_y: Vec<f64> = folds
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != fold_number)
                .flat_map(|(_, fold)| fold.iter().map(|&i| rows[i].label))
                .collect();
            let test_x: Vec<Vec<f64>> = held_out.iter().map(|&i| rows[i].features.clone()).collect();

            let mut model = spec.build()?;
            model.fit(&train_x, &train_y)?;
            let predicted = model.predict(&test_x)?;

            let mut fold_records = Vec::with_capacity(held_out.len());
            for (&i, &p) in held_out.iter().zip(&predicted) {
                if !p.is_finite() {
                    return Err(HydroForecastError::MissingData {
                        series: target_name.to_string(),
                        period: rows[i].target,
                    });
                }
                fold_records.push(ResidualRecord {
                    period: rows[i].target,
                    observed: rows[i].label,
                    predicted: p,
                    residual: rows[i].label - p,
                });
            }
            fold_records.sort_by_key(|r| r.period);
            outcomes.push(fold_records);

            observer.on_progress(fold_number + 1, self.k)?;
        }

        Ok(EvaluationResult::new(outcomes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rstest::rstest;

    #[test]
    fn metrics_on_a_known_pair() {
        let observed = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];
        assert_approx_eq!(rmse(&observed, &predicted), 10.0_f64.sqrt(), 1e-9);
        assert_approx_eq!(mean_bias(&observed, &predicted), 0.0, 1e-9);
        assert!(nash_sutcliffe(&observed, &predicted) > 0.9);
        assert!(r_squared(&observed, &predicted) > 0.9);
    }

    #[test]
    fn perfect_predictions_score_one() {
        let observed = vec![1.0, 2.0, 3.0, 4.0];
        assert_approx_eq!(nash_sutcliffe(&observed, &observed), 1.0);
        assert_approx_eq!(r_squared(&observed, &observed), 1.0);
        assert_approx_eq!(rmse(&observed, &observed), 0.0);
    }

    #[test]
    fn degenerate_input_yields_nan() {
        assert!(rmse(&[], &[]).is_nan());
        assert!(mean_bias(&[1.0], &[1.0, 2.0]).is_nan());
        assert!(nash_sutcliffe(&[2.0, 2.0], &[1.0, 3.0]).is_nan());
        assert!(r_squared(&[1.0, 2.0], &[5.0, 5.0]).is_nan());
    }

    #[rstest]
    #[case(2, 7)]
    #[case(3, 9)]
    #[case(5, 23)]
    #[case(7, 7)]
    fn partition_is_a_disjoint_cover(#[case] k: usize, #[case] n: usize) {
        let validator = CrossValidator::new(k).unwrap();
        let folds = validator.partition(n);
        assert_eq!(folds.len(), k);

        let mut seen = vec![0usize; n];
        for fold in &folds {
            for &index in fold {
                seen[index] += 1;
            }
        }
        // Union of held-out rows equals the full row set, pairwise disjoint.
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn partition_is_deterministic() {
        let validator = CrossValidator::new(4).unwrap();
        assert_eq!(validator.partition(17), validator.partition(17));
        let reseeded = CrossValidator::new(4).unwrap().with_seed(7);
        assert_ne!(validator.partition(17), reseeded.partition(17));
    }

    #[test]
    fn fold_lookup_is_bounds_checked() {
        let record = ResidualRecord {
            period: Period::new(2010, 0),
            observed: 1.0,
            predicted: 1.0,
            residual: 0.0,
        };
        let result = EvaluationResult::new(vec![vec![record]]);
        assert!(result.fold(0).is_some());
        assert!(result.fold(1).is_none());
    }

    #[test]
    fn fewer_folds_than_two_is_rejected() {
        assert!(CrossValidator::new(1).is_err());
        assert!(CrossValidator::new(2).is_ok());
    }
}
