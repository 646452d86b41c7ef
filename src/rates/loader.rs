//! Load age-specific death rates from CSV
//!
//! Expected layout: the first column holds the age-bucket label, each further
//! column is one country.
//!
//! ```text
//! age,usa,uganda
//! 0-4,124.4,1514.2
//! 5-9,11.0,131.6
//! ...
//! ```

use super::DeathRateTable;
use crate::error::{record_line, Result, StandardizationError};
use crate::population::{AgeBucket, AgeSeries};
use csv::{ReaderBuilder, Trim};
use log::info;
use std::io::Read;
use std::path::Path;

/// Default location of the death-rate table
pub const DEFAULT_DEATH_RATES_PATH: &str = "data/death_rates_by_age.csv";

/// Load a death-rate table from a CSV file
pub fn load_death_rates<P: AsRef<Path>>(path: P) -> Result<DeathRateTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let table = death_rates_from_reader(file)?;
    info!(
        "Loaded death rates for {} countries over {} age buckets from {}",
        table.len(),
        table.buckets().len(),
        path.display()
    );
    Ok(table)
}

/// Load a death-rate table from any reader
pub fn death_rates_from_reader<R: Read>(reader: R) -> Result<DeathRateTable> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(StandardizationError::parse(1, "expected an age column and at least one country column"));
    }
    let countries: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let mut columns: Vec<AgeSeries> = vec![AgeSeries::new(); countries.len()];

    for result in csv_reader.records() {
        let record = result?;
        let row = record_line(&record);
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        let bucket: AgeBucket = record[0].parse()?;

        for (column, country) in countries.iter().enumerate() {
            let cell = record.get(column + 1).unwrap_or("");
            let rate: f64 = cell.parse().map_err(|_| {
                StandardizationError::parse(row, format!("invalid rate {:?} for {} at {}", cell, country, bucket))
            })?;
            columns[column].insert(bucket, rate)?;
        }
    }

    let mut table = DeathRateTable::new();
    for (country, rates) in countries.into_iter().zip(columns) {
        table.insert(country, rates)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_reader() {
        let data = "age,usa,uganda\n0-4, 124.4 ,1514.2\n5-9,11.0,131.6\n10+,800.5,900.25\n";
        let table = death_rates_from_reader(data.as_bytes()).unwrap();

        assert_eq!(table.countries(), &["usa".to_string(), "uganda".to_string()]);
        assert_eq!(table.get("usa").unwrap().to_vec(), vec![124.4, 11.0, 800.5]);
        assert_eq!(table.get("uganda").unwrap().to_vec(), vec![1514.2, 131.6, 900.25]);
        assert_eq!(table.buckets(), AgeBucket::five_year_layout(10));
    }

    #[test]
    fn test_rows_may_arrive_out_of_order() {
        let data = "age,usa\n85+,3.0\n0-4,1.0\n5-84,2.0\n";
        let table = death_rates_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.get("usa").unwrap().to_vec(), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_invalid_rate_reports_row() {
        let data = "age,usa\n0-4,1.0\n5-9,n/a\n";
        let result = death_rates_from_reader(data.as_bytes());
        match result {
            Err(StandardizationError::Parse { row, message }) => {
                assert_eq!(row, 3);
                assert!(message.contains("usa"), "{}", message);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_bucket_label() {
        let data = "age,usa\nchildren,1.0\n";
        assert!(matches!(
            death_rates_from_reader(data.as_bytes()),
            Err(StandardizationError::InvalidAgeBucket(_))
        ));
    }

    #[test]
    fn test_requires_country_column() {
        let data = "age\n0-4\n";
        assert!(death_rates_from_reader(data.as_bytes()).is_err());
    }
}
