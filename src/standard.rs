//! Reference standard populations
//!
//! The WHO World Standard Population (2000-2025) is built in. Other standards
//! can be loaded from a two-column CSV (`age,weight`); weights may be counts or
//! percentages since they are normalized on load.

use crate::error::{record_line, Result, StandardizationError};
use crate::population::{AgeBucket, AgeSeries, PopulationProportions};
use csv::{ReaderBuilder, Trim};
use log::info;
use std::io::Read;
use std::path::Path;

/// WHO World Standard Population, percent per five-year bucket (0-4 ... 80-84, 85+)
///
/// Table 1 of the GPE Discussion Paper No. 31. The published column does not
/// add up to exactly 100.
pub const WHO_WORLD_STANDARD_PERCENT: [f64; 18] = [
    8.86, 8.69, 8.60, 8.47, 8.22, 7.93, 7.61, 7.15, 6.59, 6.04, 5.37, 4.55, 3.72, 2.96, 2.21,
    1.52, 0.91, 0.63,
];

/// A named reference age distribution
#[derive(Debug, Clone)]
pub struct StandardPopulation {
    name: String,
    proportions: PopulationProportions,
}

impl StandardPopulation {
    /// WHO World Standard over the reference 18-bucket layout
    pub fn who_world() -> Self {
        let total: f64 = WHO_WORLD_STANDARD_PERCENT.iter().sum();
        let shares: AgeSeries = AgeBucket::reference_layout()
            .into_iter()
            .zip(WHO_WORLD_STANDARD_PERCENT.iter().map(|percent| percent / total))
            .collect();
        Self {
            name: "WHO World Standard".to_string(),
            proportions: PopulationProportions::from_normalized(shares),
        }
    }

    /// Normalize arbitrary weights into a standard population
    pub fn from_weights(name: impl Into<String>, weights: AgeSeries) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            proportions: PopulationProportions::from_weights(&weights)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn proportions(&self) -> &PopulationProportions {
        &self.proportions
    }
}

impl Default for StandardPopulation {
    fn default() -> Self {
        Self::who_world()
    }
}

/// Load a standard population from an `age,weight` CSV file
pub fn load_standard_population<P: AsRef<Path>>(path: P) -> Result<StandardPopulation> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "custom standard".to_string());
    let standard = standard_population_from_reader(name, file)?;
    info!("Loaded standard population '{}' ({} buckets) from {}", standard.name(), standard.proportions().len(), path.display());
    Ok(standard)
}

/// Load a standard population from any reader
pub fn standard_population_from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<StandardPopulation> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut weights = AgeSeries::new();

    for result in csv_reader.records() {
        let record = result?;
        let row = record_line(&record);
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        if record.len() < 2 {
            return Err(StandardizationError::parse(row, "expected age,weight"));
        }
        let bucket: AgeBucket = record[0].parse()?;
        let weight: f64 = record[1]
            .parse()
            .map_err(|_| StandardizationError::parse(row, format!("invalid weight {:?}", &record[1])))?;
        weights.insert(bucket, weight)?;
    }

    StandardPopulation::from_weights(name, weights)
}
