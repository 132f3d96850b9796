//! Seasonal grid search over predictor and lag-length combinations
//!
//! For seasonal targets (one period per year) the useful predictor set is
//! rarely known in advance. The grid search enumerates every subset of the
//! candidate predictors up to a maximum size, crossed with every candidate
//! lag length per member, cross-validates each combination and ranks them
//! by out-of-fold RMSE. Selection is deterministic: ties break toward the
//! smaller combination, then lexicographic predictor order.

use crate::error::{HydroForecastError, Result};
use crate::evaluation::{CrossValidator, EvaluationResult};
use crate::features::{training_rows, Predictor};
use crate::forecaster::Forecaster;
use crate::progress::{NoProgress, ProgressObserver};
use crate::regression::ModelSpec;
use fixed_index::{FixedIndexTimeseries, Mode};
use serde::Serialize;

/// One candidate predictor series with the lag lengths to try.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub series: FixedIndexTimeseries,
    pub lag_lengths: Vec<usize>,
}

impl Candidate {
    pub fn new(series: FixedIndexTimeseries, lag_lengths: Vec<usize>) -> Self {
        Self {
            series,
            lag_lengths,
        }
    }
}

/// One evaluated (or skipped) combination in the ranked report.
#[derive(Debug, Clone, Serialize)]
pub struct CombinationReport {
    /// `(series name, lag length)` per member, in candidate order
    pub predictors: Vec<(String, usize)>,
    /// Cross-validated RMSE; `None` when the combination had too few
    /// usable rows and was skipped
    pub rmse: Option<f64>,
}

impl CombinationReport {
    pub fn is_skipped(&self) -> bool {
        self.rmse.is_none()
    }
}

/// Result of a finished grid search.
#[derive(Debug)]
pub struct SearchOutcome {
    /// Forecaster for the winning combination, trained on all usable rows
    pub forecaster: Forecaster,
    /// Cross-validation result of the winning combination
    pub evaluation: EvaluationResult,
    /// Every combination, best first; skipped combinations at the end
    pub ranking: Vec<CombinationReport>,
    /// Number of combinations the search enumerated
    pub search_space: usize,
}

/// Exhaustive predictor/lag grid search for a seasonal target.
#[derive(Debug)]
pub struct SeasonalGridSearch {
    spec: ModelSpec,
    target: FixedIndexTimeseries,
    candidates: Vec<Candidate>,
    max_predictors: usize,
    validator: CrossValidator,
}

impl SeasonalGridSearch {
    /// Configure a search. The target must be a seasonal-mode series;
    /// `max_predictors` bounds the combination size and thereby the search
    /// space.
    pub fn new(
        spec: ModelSpec,
        target: FixedIndexTimeseries,
        candidates: Vec<Candidate>,
        max_predictors: usize,
        validator: CrossValidator,
    ) -> Result<Self> {
        if !matches!(target.mode(), Mode::Seasonal { .. }) {
            return Err(HydroForecastError::Configuration(format!(
                "grid search target '{}' must be seasonal, got {} mode",
                target.name(),
                target.mode()
            )));
        }
        if candidates.is_empty() {
            return Err(HydroForecastError::Configuration(
                "grid search needs at least one candidate predictor".to_string(),
            ));
        }
        if max_predictors == 0 {
            return Err(HydroForecastError::Configuration(
                "maximum predictor count must be at least 1".to_string(),
            ));
        }
        for (i, candidate) in candidates.iter().enumerate() {
            if candidate.lag_lengths.is_empty() || candidate.lag_lengths.contains(&0) {
                return Err(HydroForecastError::Configuration(format!(
                    "candidate '{}' needs non-zero lag lengths",
                    candidate.series.name()
                )));
            }
            if candidates[i + 1..]
                .iter()
                .any(|other| other.series.name() == candidate.series.name())
            {
                return Err(HydroForecastError::Configuration(format!(
                    "duplicate candidate name '{}'",
                    candidate.series.name()
                )));
            }
        }
        spec.build()?;
        let max_predictors = max_predictors.min(candidates.len());
        Ok(Self {
            spec,
            target,
            candidates,
            max_predictors,
            validator,
        })
    }

    /// Number of combinations the search will evaluate: every candidate
    /// subset up to the maximum size, crossed with the per-member lag
    /// choices.
    pub fn search_space_size(&self) -> usize {
        self.subsets()
            .iter()
            .map(|subset| {
                subset
                    .iter()
                    .map(|&i| self.candidates[i].lag_lengths.len())
                    .product::<usize>()
            })
            .sum()
    }

    /// Run the search. Progress is reported per combination; an observer
    /// error aborts and discards all accumulated results.
    pub fn run(&self, observer: &mut dyn ProgressObserver) -> Result<SearchOutcome> {
        let total = self.search_space_size();
        let mut ranking = Vec::with_capacity(total);
        let mut step = 0;

        for subset in self.subsets() {
            for lags in self.lag_assignments(&subset) {
                step += 1;
                let members: Vec<(String, usize)> = subset
                    .iter()
                    .zip(&lags)
                    .map(|(&i, &lag)| (self.candidates[i].series.name().to_string(), lag))
                    .collect();

                let predictors = self.build_predictors(&subset, &lags)?;
                let rows = training_rows(&predictors, &self.target)?;
                let rmse = if rows.len() < self.validator.k() {
                    None
                } else {
                    match self.validator.evaluate(
                        &self.spec,
                        self.target.name(),
                        &rows,
                        &mut NoProgress,
                    ) {
                        Ok(evaluation) => Some(evaluation.rmse()),
                        // Degenerate combinations (collinear windows) are
                        // ranked as skipped rather than failing the search.
                        Err(HydroForecastError::InsufficientData(_)) => None,
                        Err(err) => return Err(err),
                    }
                };
                ranking.push(CombinationReport {
                    predictors: members,
                    rmse,
                });
                observer.on_progress(step, total)?;
            }
        }

        // Best first: lower RMSE, then fewer predictors, then lexicographic
        // predictor order; skipped combinations sort last.
        ranking.sort_by(|a, b| match (a.rmse, b.rmse) {
            (Some(ra), Some(rb)) => ra
                .total_cmp(&rb)
                .then_with(|| a.predictors.len().cmp(&b.predictors.len()))
                .then_with(|| a.predictors.cmp(&b.predictors)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.predictors.cmp(&b.predictors),
        });

        let winner = ranking.first().filter(|r| !r.is_skipped()).ok_or_else(|| {
            HydroForecastError::InsufficientData(format!(
                "series '{}': no predictor combination had enough usable rows",
                self.target.name()
            ))
        })?;

        let predictors = self.predictors_by_name(&winner.predictors)?;
        let mut forecaster =
            Forecaster::new(self.spec.clone(), self.target.clone(), predictors)?;
        let rows = training_rows(forecaster.predictors(), &self.target)?;
        let evaluation = self.validator.evaluate(
            &self.spec,
            self.target.name(),
            &rows,
            &mut NoProgress,
        )?;
        forecaster.train()?;

        Ok(SearchOutcome {
            forecaster,
            evaluation,
            ranking,
            search_space: total,
        })
    }

    /// Candidate index subsets of size 1..=max, in input (lexicographic
    /// rank) order.
    fn subsets(&self) -> Vec<Vec<usize>> {
        fn extend(
            start: usize,
            n: usize,
            remaining: usize,
            current: &mut Vec<usize>,
            out: &mut Vec<Vec<usize>>,
        ) {
            if remaining == 0 {
                out.push(current.clone());
                return;
            }
            for i in start..n {
                current.push(i);
                extend(i + 1, n, remaining - 1, current, out);
                current.pop();
            }
        }

        let mut out = Vec::new();
        for size in 1..=self.max_predictors {
            extend(0, self.candidates.len(), size, &mut Vec::new(), &mut out);
        }
        out
    }

    /// Cartesian product of the lag choices of one subset, in input order.
    fn lag_assignments(&self, subset: &[usize]) -> Vec<Vec<usize>> {
        let mut assignments = vec![Vec::new()];
        for &i in subset {
            let mut next = Vec::with_capacity(assignments.len() * self.candidates[i].lag_lengths.len());
            for assignment in &assignments {
                for &lag in &self.candidates[i].lag_lengths {
                    let mut extended = assignment.clone();
                    extended.push(lag);
                    next.push(extended);
                }
            }
            assignments = next;
        }
        assignments
    }

    fn build_predictors(&self, subset: &[usize], lags: &[usize]) -> Result<Vec<Predictor>> {
        subset
            .iter()
            .zip(lags)
            .map(|(&i, &lag)| Predictor::new(self.candidates[i].series.clone(), lag))
            .collect()
    }

    fn predictors_by_name(&self, members: &[(String, usize)]) -> Result<Vec<Predictor>> {
        members
            .iter()
            .map(|(name, lag)| {
                let candidate = self
                    .candidates
                    .iter()
                    .find(|c| c.series.name() == name.as_str())
                    .ok_or_else(|| {
                        HydroForecastError::Configuration(format!(
                            "no candidate named '{}'",
                            name
                        ))
                    })?;
                Predictor::new(candidate.series.clone(), *lag)
            })
            .collect()
    }
}
