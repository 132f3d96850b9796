//! Monthly discharge forecast from lagged discharge and precipitation.
//!
//! Builds two synthetic monthly series with a known linear dependence,
//! cross-validates a linear model and issues a forecast for June 2011.
//!
//! Run with: cargo run --example basic_forecast

use chrono::NaiveDate;
use fixed_index::{FixedIndexTimeseries, Mode};
use hydromet_forecast::evaluation::CrossValidator;
use hydromet_forecast::features::Predictor;
use hydromet_forecast::forecaster::Forecaster;
use hydromet_forecast::regression::{ModelSpec, RegressionModel, SupportedModels};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn monthly_series(name: &str, years: std::ops::Range<i32>, seed: u64) -> FixedIndexTimeseries {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = years
        .map(|year| {
            let values = (0..12).map(|_| Some(rng.gen_range(5.0..80.0))).collect();
            (year, values)
        })
        .collect();
    FixedIndexTimeseries::from_rows(name, Mode::Monthly, rows).unwrap()
}

/// discharge(t) = 12 + 0.6 * precipitation(t-1) + 0.3 * discharge(t-1)
fn derive_discharge(precipitation: &FixedIndexTimeseries) -> FixedIndexTimeseries {
    let base = monthly_series("discharge", 2000..2012, 7);
    let rows = (2001..2012)
        .map(|year| {
            let values = (0..12)
                .map(|index| {
                    let t = fixed_index::Period::new(year, index);
                    let prev = Mode::Monthly.shift_period(t, -1);
                    Some(12.0 + 0.6 * precipitation.get(prev)? + 0.3 * base.get(prev)?)
                })
                .collect();
            (year, values)
        })
        .collect();
    FixedIndexTimeseries::from_rows("discharge", Mode::Monthly, rows).unwrap()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The model catalogue and its tunable hyperparameters.
    println!("available models:");
    for &kind in SupportedModels::list() {
        let model = RegressionModel::build(kind);
        println!("  {:?}", kind);
        for (name, range) in model.selectable_parameters() {
            println!("    {} in {:?}", name, range);
        }
    }
    println!();

    let precipitation = monthly_series("precipitation", 2000..2012, 11);
    let discharge = derive_discharge(&precipitation);

    let spec = ModelSpec::new(SupportedModels::LinearRegression);
    let predictors = vec![
        Predictor::new(discharge.clone(), 2)?,
        Predictor::new(precipitation.clone(), 2)?,
    ];
    let mut forecaster = Forecaster::new(spec, discharge.clone(), predictors)?;

    let validator = CrossValidator::new(5)?;
    let mut print_progress = |current: usize, total: usize| {
        println!("fold {current}/{total}");
    };
    let assessment = forecaster.train_and_evaluate(&validator, &mut print_progress)?;
    println!("\n{assessment}");

    let targetdate = NaiveDate::from_ymd_opt(2011, 6, 1).ok_or("bad date")?;
    let value = forecaster.predict(targetdate, &[discharge, precipitation])?;
    println!("\nforecast for June 2011: {value:.2} m3/s");

    Ok(())
}
