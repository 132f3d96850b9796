use assert_approx_eq::assert_approx_eq;
use fixed_index::Period;
use pretty_assertions::assert_eq;
use hydromet_forecast::error::HydroForecastError;
use hydromet_forecast::evaluation::CrossValidator;
use hydromet_forecast::features::FeatureRow;
use hydromet_forecast::progress::NoProgress;
use hydromet_forecast::regression::{ModelSpec, SupportedModels};

fn linear_rows(n: usize) -> Vec<FeatureRow> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            FeatureRow {
                target: Period::new(2000 + (i / 12) as i32, (i % 12) as u32),
                features: vec![x, (i % 5) as f64],
                label: 2.0 + 3.0 * x - 0.5 * (i % 5) as f64,
            }
        })
        .collect()
}

#[test]
fn noiseless_relation_evaluates_near_perfectly() {
    let rows = linear_rows(40);
    let validator = CrossValidator::new(4).unwrap();
    let spec = ModelSpec::new(SupportedModels::LinearRegression);

    let result = validator
        .evaluate(&spec, "Q", &rows, &mut NoProgress)
        .unwrap();

    assert!(result.rmse() < 1e-6);
    assert_approx_eq!(result.nash_sutcliffe(), 1.0, 1e-9);
    assert_approx_eq!(result.r_squared(), 1.0, 1e-9);
    assert_approx_eq!(result.mean_bias(), 0.0, 1e-6);
}

#[test]
fn every_row_is_held_out_exactly_once() {
    let rows = linear_rows(23);
    let validator = CrossValidator::new(5).unwrap();
    let spec = ModelSpec::new(SupportedModels::LinearRegression);

    let result = validator
        .evaluate(&spec, "Q", &rows, &mut NoProgress)
        .unwrap();

    assert_eq!(result.fold_count(), 5);
    let mut held_out: Vec<Period> = (0..result.fold_count())
        .flat_map(|f| result.fold(f).unwrap().iter().map(|r| r.period))
        .collect();
    held_out.sort();
    held_out.dedup();
    assert_eq!(held_out.len(), rows.len());
}

#[test]
fn progress_is_reported_per_fold() {
    let rows = linear_rows(20);
    let validator = CrossValidator::new(4).unwrap();
    let spec = ModelSpec::new(SupportedModels::LinearRegression);

    let mut calls = Vec::new();
    let mut observer = |current: usize, total: usize| calls.push((current, total));
    validator.evaluate(&spec, "Q", &rows, &mut observer).unwrap();

    assert_eq!(calls, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
}

#[test]
fn fewer_rows_than_folds_is_insufficient_data() {
    let rows = linear_rows(3);
    let validator = CrossValidator::new(5).unwrap();
    let spec = ModelSpec::new(SupportedModels::LinearRegression);

    let result = validator.evaluate(&spec, "Q", &rows, &mut NoProgress);
    assert!(matches!(
        result,
        Err(HydroForecastError::InsufficientData(_))
    ));
}

#[test]
fn residuals_are_observed_minus_predicted() {
    let rows = linear_rows(30);
    let validator = CrossValidator::default();
    let spec = ModelSpec::new(SupportedModels::LinearRegression);

    let result = validator
        .evaluate(&spec, "Q", &rows, &mut NoProgress)
        .unwrap();
    for record in result.records() {
        assert_approx_eq!(
            record.residual,
            record.observed - record.predicted,
            1e-12
        );
    }
}

#[test]
fn identical_inputs_evaluate_identically() {
    let rows = linear_rows(25);
    let validator = CrossValidator::default();
    let spec = ModelSpec::new(SupportedModels::RidgeRegression);

    let first = validator
        .evaluate(&spec, "Q", &rows, &mut NoProgress)
        .unwrap();
    let second = validator
        .evaluate(&spec, "Q", &rows, &mut NoProgress)
        .unwrap();
    assert_eq!(first.rmse(), second.rmse());
    assert_eq!(first.nash_sutcliffe(), second.nash_sutcliffe());
}

#[test]
fn assessment_exports_to_json() {
    let rows = linear_rows(30);
    let validator = CrossValidator::new(3).unwrap();
    let spec = ModelSpec::new(SupportedModels::LinearRegression);

    let result = validator
        .evaluate(&spec, "Q", &rows, &mut NoProgress)
        .unwrap();

    // Residual records serialize for bulletin export.
    let json = serde_json::to_string(result.fold(0).unwrap()).unwrap();
    assert!(json.contains("\"observed\""));
    assert!(json.contains("\"predicted\""));
    assert!(json.contains("\"residual\""));
}
