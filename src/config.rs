//! Run configuration for the country comparison
//!
//! Loaded from a JSON file; every field has a default matching the USA and
//! Uganda comparison for 2019 against the WHO World Standard.

use crate::error::{Result, StandardizationError};
use crate::population::loader::DEFAULT_UN_POPULATION_PATH;
use crate::rates::loader::DEFAULT_DEATH_RATES_PATH;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One population to compare
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountrySpec {
    /// Display name in the report
    pub label: String,
    /// Column header in the death-rate table
    pub rate_column: String,
    /// `Location` value in the UN population file
    pub population_location: String,
}

impl CountrySpec {
    pub fn new(label: &str, rate_column: &str, population_location: &str) -> Self {
        Self {
            label: label.to_string(),
            rate_column: rate_column.to_string(),
            population_location: population_location.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_death_rates_path")]
    pub death_rates_path: PathBuf,

    #[serde(default = "default_population_path")]
    pub population_path: PathBuf,

    /// `age,weight` CSV; the built-in WHO World Standard when absent
    #[serde(default)]
    pub standard_path: Option<PathBuf>,

    /// Year of the population distribution
    #[serde(default = "default_year")]
    pub year: i32,

    #[serde(default = "default_countries")]
    pub countries: Vec<CountrySpec>,

    /// Where the age-distribution table is written
    #[serde(default = "default_distribution_output")]
    pub distribution_output: PathBuf,
}

fn default_death_rates_path() -> PathBuf { PathBuf::from(DEFAULT_DEATH_RATES_PATH) }
fn default_population_path() -> PathBuf { PathBuf::from(DEFAULT_UN_POPULATION_PATH) }
fn default_year() -> i32 { 2019 }
fn default_distribution_output() -> PathBuf { PathBuf::from("populations.csv") }

fn default_countries() -> Vec<CountrySpec> {
    vec![
        CountrySpec::new("USA", "usa", "United States of America"),
        CountrySpec::new("Uganda", "uganda", "Uganda"),
    ]
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            death_rates_path: default_death_rates_path(),
            population_path: default_population_path(),
            standard_path: None,
            year: default_year(),
            countries: default_countries(),
            distribution_output: default_distribution_output(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// At least one country, and labels unique so report rows are unambiguous
    pub fn validate(&self) -> Result<()> {
        if self.countries.is_empty() {
            return Err(StandardizationError::Config("no countries configured".to_string()));
        }
        let mut labels = HashSet::new();
        for country in &self.countries {
            if !labels.insert(country.label.as_str()) {
                return Err(StandardizationError::Config(format!("duplicate country label {:?}", country.label)));
            }
        }
        Ok(())
    }

    pub fn population_locations(&self) -> Vec<String> {
        self.countries.iter().map(|c| c.population_location.clone()).collect()
    }
}
