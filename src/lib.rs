//! Mortality Standardization - crude and age-standardized death rates across populations
//!
//! This library provides:
//! - Age-bucketed population distributions and death-rate tables keyed by age bucket
//! - Crude and age-standardized rates against the WHO World Standard or a custom standard
//! - CSV loaders for UN WPP population data and death-rate tables
//! - Text, CSV and JSON reporting of a country comparison
//! - Regional (continent-level) female mortality aggregation with name reconciliation

pub mod error;
pub mod population;
pub mod rates;
pub mod standard;
pub mod standardize;
pub mod report;
pub mod config;
pub mod analysis;
pub mod regional;

// Re-export commonly used types
pub use error::{Result, StandardizationError};
pub use population::{AgeBucket, AgeSeries, PopulationDistribution, PopulationProportions};
pub use rates::DeathRateTable;
pub use standard::StandardPopulation;
pub use standardize::{crude_rate, normalize, standardized_rate, CountryRates, Standardizer};
pub use report::ComparisonReport;
pub use config::{AnalysisConfig, CountrySpec};
pub use analysis::{compare_countries, run_comparison};
