//! CSV loader for the one-row-per-year tabular format

use crate::calendar::Mode;
use crate::error::{FixedIndexError, Result};
use crate::timeseries::FixedIndexTimeseries;
use std::path::Path;

/// Read a fixed-index series from a CSV file.
///
/// Each record is one year: the first field is the year, the remaining
/// fields are the period values in order. Empty, non-numeric and non-finite
/// cells denote missing values; a record whose cell count does not match
/// `periods_per_year` for `mode` fails with a configuration error.
pub fn read_csv<P: AsRef<Path>>(path: P, name: &str, mode: Mode) -> Result<FixedIndexTimeseries> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let mut fields = record.iter();
        let year_field = fields.next().unwrap_or("");
        let year: i32 = year_field.parse().map_err(|_| {
            FixedIndexError::Configuration(format!(
                "series '{}': record {} does not start with a year, got '{}'",
                name,
                line + 1,
                year_field
            ))
        })?;
        let cells: Vec<Option<f64>> = fields.map(|cell| cell.parse::<f64>().ok()).collect();
        rows.push((year, cells));
    }

    FixedIndexTimeseries::from_rows(name, mode, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Period;
    use assert_approx_eq::assert_approx_eq;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn reads_monthly_rows() {
        let file = write_csv(
            "2010,21.6,21.4,23.1,31.8,20.6,45.3,25.2,11.3,23.9,29.6,28.1,27\n\
             2011,20.1,19.8,22.5,30.2,21.9,44.0,26.3,12.0,24.1,28.8,27.5,26.2\n",
        );
        let ts = read_csv(file.path(), "discharge", Mode::Monthly).unwrap();
        assert_eq!(ts.len(), 24);
        assert_approx_eq!(ts.get(Period::new(2010, 5)).unwrap(), 45.3);
        assert_approx_eq!(ts.get(Period::new(2011, 0)).unwrap(), 20.1);
    }

    #[test]
    fn empty_and_non_numeric_cells_become_missing() {
        let file = write_csv("2010,1,2,,4,5,6,7,n/a,9,10,11,12\n");
        let ts = read_csv(file.path(), "discharge", Mode::Monthly).unwrap();
        assert_eq!(ts.get(Period::new(2010, 2)), None);
        assert_eq!(ts.get(Period::new(2010, 7)), None);
        assert_eq!(ts.len(), 10);
    }

    #[test]
    fn non_finite_cells_become_missing() {
        // "NaN" and "inf" parse as f64 but are not real observations.
        let file = write_csv("2010,1,2,NaN,4,inf,6,7,-inf,9,10,11,12\n");
        let ts = read_csv(file.path(), "discharge", Mode::Monthly).unwrap();
        assert_eq!(ts.get(Period::new(2010, 2)), None);
        assert_eq!(ts.get(Period::new(2010, 4)), None);
        assert_eq!(ts.get(Period::new(2010, 7)), None);
        assert_eq!(ts.len(), 9);
    }

    #[test]
    fn short_record_is_rejected() {
        let file = write_csv("2010,1,2,3\n");
        let result = read_csv(file.path(), "discharge", Mode::Monthly);
        assert!(matches!(result, Err(FixedIndexError::Configuration(_))));
    }

    #[test]
    fn bad_year_field_is_rejected() {
        let file = write_csv("first,1,2,3,4,5,6,7,8,9,10,11,12\n");
        let result = read_csv(file.path(), "discharge", Mode::Monthly);
        assert!(matches!(result, Err(FixedIndexError::Configuration(_))));
    }
}
