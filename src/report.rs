//! Text, CSV and JSON output of a country comparison

use crate::error::{Result, StandardizationError};
use crate::population::{AgeBucket, PopulationProportions};
use crate::standardize::{format_rate, CountryRates};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Width in characters of the longest bar in the text chart
pub const DEFAULT_BAR_WIDTH: usize = 40;

/// Proportions of one population, labelled for display
#[derive(Debug, Clone, Serialize)]
pub struct NamedDistribution {
    pub name: String,
    pub proportions: PopulationProportions,
}

/// Everything a comparison run produces
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub year: i32,
    pub standard: String,
    pub rates: Vec<CountryRates>,
    pub distributions: Vec<NamedDistribution>,
}

impl ComparisonReport {
    pub fn new(
        year: i32,
        standard: impl Into<String>,
        rates: Vec<CountryRates>,
        distributions: Vec<NamedDistribution>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            year,
            standard: standard.into(),
            rates,
            distributions,
        }
    }

    /// Crude and age-standardized rates, one decimal place
    ///
    /// ```text
    /// Crude Death Rates
    ///     USA:     878.6
    ///     Uganda:  557.4
    /// Age-Standardized Death Rates
    ///     ...
    /// ```
    pub fn render_rates(&self) -> String {
        let width = self.rates.iter().map(|r| r.country.chars().count() + 1).max().unwrap_or(0) + 2;
        let mut out = String::new();

        out.push_str("Crude Death Rates\n");
        for rates in &self.rates {
            out.push_str(&format!("\t{:<width$}{}\n", format!("{}:", rates.country), format_rate(rates.crude_rate), width = width));
        }

        out.push_str("Age-Standardized Death Rates\n");
        for rates in &self.rates {
            out.push_str(&format!("\t{:<width$}{}\n", format!("{}:", rates.country), format_rate(rates.standardized_rate), width = width));
        }
        out
    }

    /// One horizontal bar chart per population
    pub fn render_distributions(&self, bar_width: usize) -> String {
        let max_share = self
            .distributions
            .iter()
            .flat_map(|d| d.proportions.as_series().to_vec())
            .fold(0.0_f64, f64::max);
        let mut out = String::new();

        for distribution in &self.distributions {
            out.push_str(&format!("{}\n", distribution.name));
            for (bucket, share) in distribution.proportions.as_series().iter() {
                let bar_len = if max_share > 0.0 {
                    (share / max_share * bar_width as f64).round() as usize
                } else {
                    0
                };
                out.push_str(&format!("  {:>6} {:<bar_width$} {:.4}\n", bucket.to_string(), "#".repeat(bar_len), share, bar_width = bar_width));
            }
        }
        out
    }

    /// Distribution table: one row per age bucket, one column per population
    ///
    /// All distributions must share the same buckets.
    pub fn write_distribution_csv<W: Write>(&self, writer: W) -> Result<()> {
        let Some(first) = self.distributions.first() else {
            return Err(StandardizationError::Config("no distributions to write".to_string()));
        };
        for other in &self.distributions[1..] {
            other.proportions.as_series().check_alignment(first.proportions.as_series())?;
        }

        let mut csv_writer = csv::Writer::from_writer(writer);
        let mut header = vec!["age".to_string()];
        header.extend(self.distributions.iter().map(|d| d.name.clone()));
        csv_writer.write_record(&header)?;

        let buckets: Vec<AgeBucket> = first.proportions.as_series().buckets().copied().collect();
        for bucket in buckets {
            let mut row = vec![bucket.to_string()];
            for distribution in &self.distributions {
                let share = distribution.proportions.get(&bucket).unwrap_or(0.0);
                row.push(format!("{:.6}", share));
            }
            csv_writer.write_record(&row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
