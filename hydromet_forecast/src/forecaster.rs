//! Forecaster: trains a configured model on lagged features and predicts
//! single target periods

use crate::error::{HydroForecastError, Result};
use crate::evaluation::{CrossValidator, EvaluationResult};
use crate::features::{prediction_features, training_rows, Predictor};
use crate::progress::ProgressObserver;
use crate::regression::{ModelSpec, Regressor};
use chrono::NaiveDate;
use fixed_index::{FixedIndexTimeseries, Period};

/// Forecasting workflow for one target series.
///
/// A forecaster exclusively owns its regression model instance. It starts
/// untrained; [`train`](Self::train) or
/// [`train_and_evaluate`](Self::train_and_evaluate) move it to trained, and
/// only an explicit new training call refits it. Prediction before training
/// fails with a model state error.
#[derive(Debug)]
pub struct Forecaster {
    spec: ModelSpec,
    y: FixedIndexTimeseries,
    predictors: Vec<Predictor>,
    model: Option<Box<dyn Regressor>>,
    training_periods: Vec<Period>,
}

impl Forecaster {
    /// Create an untrained forecaster.
    ///
    /// Predictor names must be unique: they are the identities used to match
    /// fresh series at prediction time. The model specification is validated
    /// here so a bad hyperparameter fails fast, not at the first fold.
    pub fn new(
        spec: ModelSpec,
        y: FixedIndexTimeseries,
        predictors: Vec<Predictor>,
    ) -> Result<Self> {
        if predictors.is_empty() {
            return Err(HydroForecastError::Configuration(format!(
                "forecaster for '{}' needs at least one predictor",
                y.name()
            )));
        }
        for (i, a) in predictors.iter().enumerate() {
            if predictors[i + 1..].iter().any(|b| b.name() == a.name()) {
                return Err(HydroForecastError::Configuration(format!(
                    "duplicate predictor name '{}'",
                    a.name()
                )));
            }
        }
        spec.build()?;
        Ok(Self {
            spec,
            y,
            predictors,
            model: None,
            training_periods: Vec::new(),
        })
    }

    pub fn target(&self) -> &FixedIndexTimeseries {
        &self.y
    }

    pub fn predictors(&self) -> &[Predictor] {
        &self.predictors
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Target periods whose rows entered the last training call.
    pub fn training_periods(&self) -> &[Period] {
        &self.training_periods
    }

    /// Fit the model on every complete feature row of the target series.
    pub fn train(&mut self) -> Result<()> {
        let rows = training_rows(&self.predictors, &self.y)?;
        if rows.is_empty() {
            return Err(HydroForecastError::InsufficientData(format!(
                "series '{}': no period has both a label and a complete feature window",
                self.y.name()
            )));
        }
        let x: Vec<Vec<f64>> = rows.iter().map(|r| r.features.clone()).collect();
        let labels: Vec<f64> = rows.iter().map(|r| r.label).collect();

        let mut model = self.spec.build()?;
        model.fit(&x, &labels)?;
        self.model = Some(model);
        self.training_periods = rows.into_iter().map(|r| r.target).collect();
        Ok(())
    }

    /// Cross-validate the model setup, then train on the full row set.
    ///
    /// The returned evaluation describes out-of-fold skill; the forecaster
    /// ends up trained on all usable rows. If the observer aborts, the
    /// forecaster keeps its previous state.
    pub fn train_and_evaluate(
        &mut self,
        validator: &CrossValidator,
        observer: &mut dyn ProgressObserver,
    ) -> Result<EvaluationResult> {
        let rows = training_rows(&self.predictors, &self.y)?;
        let evaluation = validator.evaluate(&self.spec, self.y.name(), &rows, observer)?;
        self.train()?;
        Ok(evaluation)
    }

    /// Predict the target value for the period containing `targetdate`.
    ///
    /// `pool` is an unordered collection of series matched to this
    /// forecaster's predictors by name and mode; unused entries are ignored.
    /// Missing feature values fail explicitly: a prediction cannot drop
    /// part of itself.
    pub fn predict(&self, targetdate: NaiveDate, pool: &[FixedIndexTimeseries]) -> Result<f64> {
        let model = self.model.as_ref().ok_or_else(|| {
            HydroForecastError::ModelState(format!(
                "forecaster for '{}' has not been trained; call train() first",
                self.y.name()
            ))
        })?;

        let mut resolved = Vec::with_capacity(self.predictors.len());
        for predictor in &self.predictors {
            let series = pool
                .iter()
                .find(|s| s.name() == predictor.name())
                .ok_or_else(|| {
                    HydroForecastError::Configuration(format!(
                        "prediction input has no series named '{}'",
                        predictor.name()
                    ))
                })?;
            if series.mode() != predictor.series().mode() {
                return Err(HydroForecastError::Configuration(format!(
                    "series '{}' is {} but the forecaster was built with {}",
                    series.name(),
                    series.mode(),
                    predictor.series().mode()
                )));
            }
            resolved.push(predictor.with_series(series.clone()));
        }

        let features = prediction_features(&resolved, targetdate)?;
        let predicted = model.predict(&[features])?;
        Ok(predicted[0])
    }
}
