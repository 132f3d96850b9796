//! Seasonal volume forecast via exhaustive predictor/lag grid search.
//!
//! The April-September discharge norm is predicted from monthly snow depth
//! and air temperature observed before the season starts. The search tries
//! every predictor subset and lag assignment, ranks them by out-of-fold
//! RMSE and returns the winner trained on all data.
//!
//! Run with: cargo run --example seasonal_grid_search

use chrono::NaiveDate;
use fixed_index::{FixedIndexTimeseries, Mode, Period};
use hydromet_forecast::evaluation::CrossValidator;
use hydromet_forecast::regression::{ModelSpec, ParamValue, SupportedModels};
use hydromet_forecast::seasonal::{Candidate, SeasonalGridSearch};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const YEARS: std::ops::Range<i32> = 1995..2020;

fn monthly_series(name: &str, seed: u64) -> FixedIndexTimeseries {
    let mut rng = StdRng::seed_from_u64(seed);
    let rows = YEARS
        .map(|year| {
            let values = (0..12).map(|_| Some(rng.gen_range(20.0..200.0))).collect();
            (year, values)
        })
        .collect();
    FixedIndexTimeseries::from_rows(name, Mode::Monthly, rows).unwrap()
}

/// Seasonal volume driven by the March snow pack plus weather noise.
fn seasonal_target(snow: &FixedIndexTimeseries) -> FixedIndexTimeseries {
    let mut rng = StdRng::seed_from_u64(99);
    let rows = YEARS
        .map(|year| {
            let march = snow.get(Period::new(year, 2)).unwrap();
            let noise = rng.gen_range(-1.0..1.0);
            (year, vec![Some(40.0 + 0.75 * march + noise)])
        })
        .collect();
    let mode = Mode::seasonal(4, 9).unwrap();
    FixedIndexTimeseries::from_rows("volume", mode, rows).unwrap()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let snow = monthly_series("snow_depth", 3);
    let temperature = monthly_series("temperature", 17);
    let volume = seasonal_target(&snow);

    let spec = ModelSpec::new(SupportedModels::RidgeRegression)
        .with_parameter("lambda", ParamValue::Float(0.1));
    let candidates = vec![
        Candidate::new(snow.clone(), vec![1, 2, 3]),
        Candidate::new(temperature.clone(), vec![1, 2]),
    ];
    let search = SeasonalGridSearch::new(spec, volume, candidates, 2, CrossValidator::new(5)?)?;
    println!("evaluating {} combinations", search.search_space_size());

    let mut print_progress = |current: usize, total: usize| {
        if current % 5 == 0 || current == total {
            println!("  {current}/{total}");
        }
    };
    let outcome = search.run(&mut print_progress)?;

    println!("\nranking (best first):");
    for report in outcome.ranking.iter().take(5) {
        let members: Vec<String> = report
            .predictors
            .iter()
            .map(|(name, lag)| format!("{name}(lag {lag})"))
            .collect();
        match report.rmse {
            Some(rmse) => println!("  rmse {:8.3}  [{}]", rmse, members.join(", ")),
            None => println!("  skipped       [{}]", members.join(", ")),
        }
    }

    println!("\nwinner assessment:\n{}", outcome.evaluation);

    // Any date inside the season addresses the same seasonal period.
    let targetdate = NaiveDate::from_ymd_opt(2019, 4, 1).ok_or("bad date")?;
    let value = outcome.forecaster.predict(targetdate, &[snow, temperature])?;
    println!("\nApril-September 2019 forecast: {value:.2}");

    Ok(())
}
