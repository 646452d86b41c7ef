//! Crude and age-standardized death rates
//!
//! A death rate for a whole population is a weighted average of its
//! age-specific rates. The crude rate weights each age bucket by the
//! population's own age structure; the age-standardized rate weights by a
//! fixed reference structure (the standard population), which removes the
//! effect of differing age structures when comparing populations.
//!
//! The slice functions ([`normalize`], [`crude_rate`], [`standardized_rate`])
//! operate on positionally aligned vectors. The keyed entry points
//! ([`weighted_rate`], [`Standardizer`]) check that both sides cover the same
//! age buckets first.

use crate::error::{Result, StandardizationError};
use crate::population::{AgeSeries, PopulationProportions};
use crate::standard::StandardPopulation;
use log::debug;
use serde::Serialize;

/// Divide each count by the total so the result sums to one
///
/// Empty and all-zero input fail with `ZeroTotalPopulation`; negative or
/// non-finite counts fail with `InvalidValue`.
pub fn normalize(counts: &[f64]) -> Result<Vec<f64>> {
    for (index, &value) in counts.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(StandardizationError::InvalidValue { index, value });
        }
    }

    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return Err(StandardizationError::ZeroTotalPopulation);
    }

    Ok(counts.iter().map(|count| count / total).collect())
}

/// Death rate weighted by the population's own age structure
pub fn crude_rate(rates: &[f64], population_proportions: &[f64]) -> Result<f64> {
    dot(rates, population_proportions)
}

/// Death rate weighted by a reference standard age structure
///
/// Same arithmetic as [`crude_rate`]; only the meaning of the weights differs.
pub fn standardized_rate(rates: &[f64], standard_proportions: &[f64]) -> Result<f64> {
    dot(rates, standard_proportions)
}

fn dot(rates: &[f64], weights: &[f64]) -> Result<f64> {
    if rates.len() != weights.len() {
        return Err(StandardizationError::LengthMismatch {
            rates: rates.len(),
            weights: weights.len(),
        });
    }
    Ok(rates.iter().zip(weights).map(|(rate, weight)| rate * weight).sum())
}

/// Weighted rate over keyed series, after checking the bucket sets match
pub fn weighted_rate(rates: &AgeSeries, weights: &AgeSeries) -> Result<f64> {
    rates.check_alignment(weights)?;
    dot(&rates.to_vec(), &weights.to_vec())
}

/// Round to one decimal place for display
///
/// Rounds the exact decimal value of the float, ties to even, so `17.04`
/// becomes `17.0` and `17.06` becomes `17.1`.
pub fn round_rate(rate: f64) -> f64 {
    format_rate(rate).parse().unwrap_or(rate)
}

/// [`round_rate`] as display text
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}", rate)
}

/// Crude and standardized rates for one population
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryRates {
    pub country: String,
    pub crude_rate: f64,
    pub standardized_rate: f64,
}

/// Computes rates against a fixed standard population
#[derive(Debug, Clone)]
pub struct Standardizer {
    standard: StandardPopulation,
}

impl Standardizer {
    pub fn new(standard: StandardPopulation) -> Self {
        Self { standard }
    }

    /// Standardizer using the WHO World Standard population
    pub fn who_world() -> Self {
        Self::new(StandardPopulation::who_world())
    }

    pub fn standard(&self) -> &StandardPopulation {
        &self.standard
    }

    /// Rate weighted by the population's own proportions
    pub fn crude_rate(&self, rates: &AgeSeries, population: &PopulationProportions) -> Result<f64> {
        weighted_rate(rates, population.as_series())
    }

    /// Rate weighted by the standard population
    pub fn standardized_rate(&self, rates: &AgeSeries) -> Result<f64> {
        weighted_rate(rates, self.standard.proportions().as_series())
    }

    /// Both rates for one country
    pub fn compare(
        &self,
        country: &str,
        rates: &AgeSeries,
        population: &PopulationProportions,
    ) -> Result<CountryRates> {
        let crude = self.crude_rate(rates, population)?;
        let standardized = self.standardized_rate(rates)?;
        debug!(
            "{}: crude {:.4}, standardized {:.4} ({})",
            country,
            crude,
            standardized,
            self.standard.name()
        );
        Ok(CountryRates {
            country: country.to_string(),
            crude_rate: crude,
            standardized_rate: standardized,
        })
    }
}

impl Default for Standardizer {
    fn default() -> Self {
        Self::who_world()
    }
}
