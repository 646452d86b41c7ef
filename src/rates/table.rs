//! Age-specific death rates for several countries over a shared bucket layout

use crate::error::{Result, StandardizationError};
use crate::population::{AgeBucket, AgeSeries};
use std::collections::HashMap;

/// Death rates (per 100,000 or any consistent unit) by age bucket, one series per country
///
/// All series cover exactly the same buckets; this is checked on insert.
#[derive(Debug, Clone, Default)]
pub struct DeathRateTable {
    /// Country names in insertion order
    countries: Vec<String>,
    rates: HashMap<String, AgeSeries>,
}

impl DeathRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a country; its buckets must match those already in the table
    pub fn insert(&mut self, country: impl Into<String>, rates: AgeSeries) -> Result<()> {
        let country = country.into();
        if self.rates.contains_key(&country) {
            return Err(StandardizationError::Config(format!("duplicate country {:?}", country)));
        }
        if let Some(first) = self.countries.first().and_then(|name| self.rates.get(name)) {
            rates.check_alignment(first)?;
        }
        self.countries.push(country.clone());
        self.rates.insert(country, rates);
        Ok(())
    }

    /// Rates for one country, failing loudly when absent
    pub fn get(&self, country: &str) -> Result<&AgeSeries> {
        self.rates
            .get(country)
            .ok_or_else(|| StandardizationError::missing_country(country))
    }

    pub fn contains(&self, country: &str) -> bool {
        self.rates.contains_key(country)
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    /// The shared bucket layout, youngest first
    pub fn buckets(&self) -> Vec<AgeBucket> {
        self.countries
            .first()
            .and_then(|name| self.rates.get(name))
            .map(|series| series.buckets().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: &[f64]) -> AgeSeries {
        let layout = AgeBucket::five_year_layout((values.len() as u8 - 1) * 5);
        AgeSeries::from_layout(&layout, values).unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = DeathRateTable::new();
        table.insert("usa", series(&[1.0, 2.0, 3.0])).unwrap();
        table.insert("uganda", series(&[4.0, 5.0, 6.0])).unwrap();

        assert_eq!(table.countries(), &["usa".to_string(), "uganda".to_string()]);
        assert_eq!(table.get("uganda").unwrap().to_vec(), vec![4.0, 5.0, 6.0]);
        assert_eq!(table.buckets().len(), 3);
        assert!(table.contains("usa"));
    }

    #[test]
    fn test_missing_country_fails() {
        let mut table = DeathRateTable::new();
        table.insert("usa", series(&[1.0, 2.0])).unwrap();
        assert!(matches!(
            table.get("uganda"),
            Err(StandardizationError::MissingCountry { .. })
        ));
    }

    #[test]
    fn test_misaligned_country_rejected() {
        let mut table = DeathRateTable::new();
        table.insert("usa", series(&[1.0, 2.0, 3.0])).unwrap();
        let result = table.insert("uganda", series(&[1.0, 2.0]));
        assert!(matches!(result, Err(StandardizationError::BucketMismatch { .. })));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_country_rejected() {
        let mut table = DeathRateTable::new();
        table.insert("usa", series(&[1.0])).unwrap();
        assert!(table.insert("usa", series(&[1.0])).is_err());
    }
}
