//! Per-year aggregation over the members of a region

use super::{DemographicRecord, MortalityRecord};
use crate::error::{Result, StandardizationError};
use crate::standardize::{crude_rate, normalize};
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{btree_map, hash_map, BTreeMap, BTreeSet, HashMap};

/// Female population and deaths summed over a region for one year
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RegionYear {
    pub year: i32,
    pub female_population: f64,
    pub female_deaths: f64,
}

/// Population-weighted all-ages death rate of a region for one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalRate {
    pub year: i32,
    pub death_rate_per_100k: f64,
    /// Countries with both a rate and a population that year
    pub countries: usize,
    /// Female population of those countries
    pub population_covered: f64,
}

/// Sum female population and deaths per year over `members`
pub fn aggregate_by_year(records: &[DemographicRecord], members: &BTreeSet<String>) -> BTreeMap<i32, RegionYear> {
    let mut by_year: BTreeMap<i32, RegionYear> = BTreeMap::new();
    for record in records.iter().filter(|record| members.contains(&record.region)) {
        let entry = by_year
            .entry(record.year)
            .or_insert_with(|| RegionYear { year: record.year, ..Default::default() });
        entry.female_population += record.female_population;
        entry.female_deaths += record.female_deaths;
    }
    by_year
}

/// Female population per year of a single named region (e.g. the UN's own "South America" aggregate)
pub fn region_totals(records: &[DemographicRecord], region: &str) -> BTreeMap<i32, f64> {
    records
        .iter()
        .filter(|record| record.region == region)
        .map(|record| (record.year, record.female_population))
        .collect()
}

/// Largest absolute difference between two per-year series over their common years
pub fn max_abs_difference(left: &BTreeMap<i32, f64>, right: &BTreeMap<i32, f64>) -> Option<f64> {
    left.iter()
        .filter_map(|(year, value)| right.get(year).map(|other| (value - other).abs()))
        .fold(None, |max, diff| Some(max.map_or(diff, |m: f64| m.max(diff))))
}

/// Countries that have at least one mortality record
pub fn countries_with_data(mortality: &[MortalityRecord]) -> BTreeSet<String> {
    mortality.iter().map(|record| record.country.clone()).collect()
}

/// Share of the members' female population living in countries with mortality data, per year
pub fn coverage_by_year(
    records: &[DemographicRecord],
    members: &BTreeSet<String>,
    with_data: &BTreeSet<String>,
) -> Result<BTreeMap<i32, f64>> {
    let covered_members: BTreeSet<String> = members.intersection(with_data).cloned().collect();
    let totals = aggregate_by_year(records, members);
    let covered = aggregate_by_year(records, &covered_members);

    let mut coverage = BTreeMap::new();
    for (year, total) in totals {
        if total.female_population <= 0.0 {
            return Err(StandardizationError::ZeroTotalPopulation);
        }
        let covered_population = covered.get(&year).map_or(0.0, |c| c.female_population);
        coverage.insert(year, covered_population / total.female_population);
    }
    Ok(coverage)
}

/// Years whose coverage falls below `threshold`
pub fn years_below_coverage(coverage: &BTreeMap<i32, f64>, threshold: f64) -> Vec<i32> {
    coverage
        .iter()
        .filter(|(_, share)| **share < threshold)
        .map(|(&year, _)| year)
        .collect()
}

/// Population-weighted all-ages death rate per year over members with data
///
/// Each year's rate is the crude rate of the countries' rates weighted by
/// their share of the covered female population. Years are computed in
/// parallel.
pub fn regional_death_rates(
    records: &[DemographicRecord],
    mortality: &[MortalityRecord],
    members: &BTreeSet<String>,
) -> Result<Vec<RegionalRate>> {
    let mut population: HashMap<(&str, i32), f64> = HashMap::new();
    for record in records.iter().filter(|record| members.contains(&record.region)) {
        match population.entry((record.region.as_str(), record.year)) {
            hash_map::Entry::Vacant(slot) => {
                slot.insert(record.female_population);
            }
            hash_map::Entry::Occupied(_) => {
                return Err(duplicate_row("population", &record.region, record.year));
            }
        }
    }

    let mut rates_by_year: BTreeMap<i32, BTreeMap<&str, f64>> = BTreeMap::new();
    for record in mortality.iter().filter(|record| members.contains(&record.country)) {
        if !population.contains_key(&(record.country.as_str(), record.year)) {
            warn!("No population for {} in {}, rate ignored", record.country, record.year);
            continue;
        }
        match rates_by_year.entry(record.year).or_default().entry(record.country.as_str()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(record.death_rate_per_100k);
            }
            btree_map::Entry::Occupied(_) => {
                return Err(duplicate_row("mortality", &record.country, record.year));
            }
        }
    }

    let years: Vec<(i32, BTreeMap<&str, f64>)> = rates_by_year.into_iter().collect();
    years
        .par_iter()
        .map(|(year, country_rates)| -> Result<RegionalRate> {
            let populations: Vec<f64> = country_rates
                .keys()
                .map(|country| population[&(*country, *year)])
                .collect();
            let rates: Vec<f64> = country_rates.values().copied().collect();
            let weights = normalize(&populations)?;
            let rate = crude_rate(&rates, &weights)?;
            debug!("{}: {} countries, rate {:.3}", year, country_rates.len(), rate);
            Ok(RegionalRate {
                year: *year,
                death_rate_per_100k: rate,
                countries: country_rates.len(),
                population_covered: populations.iter().sum(),
            })
        })
        .collect()
}

fn duplicate_row(source: &str, region: &str, year: i32) -> StandardizationError {
    StandardizationError::Config(format!("duplicate {} row for {} in {}", source, region, year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(region: &str, year: i32, population: f64, deaths: f64) -> DemographicRecord {
        DemographicRecord {
            region: region.to_string(),
            year,
            female_population: population,
            female_deaths: deaths,
        }
    }

    fn rate(country: &str, year: i32, value: f64) -> MortalityRecord {
        MortalityRecord { country: country.to_string(), year, death_rate_per_100k: value }
    }

    fn members(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn fixture() -> Vec<DemographicRecord> {
        vec![
            record("Brazil", 2018, 800.0, 8.0),
            record("Brazil", 2019, 810.0, 8.1),
            record("Chile", 2018, 150.0, 1.0),
            record("Chile", 2019, 160.0, 1.2),
            record("Bolivia", 2018, 50.0, 0.5),
            record("Bolivia", 2019, 30.0, 0.4),
            record("Kenya", 2019, 400.0, 4.0),
            record("South America", 2018, 1000.0, 9.5),
            record("South America", 2019, 1004.0, 9.7),
        ]
    }

    #[test]
    fn test_aggregate_by_year() {
        let totals = aggregate_by_year(&fixture(), &members(&["Brazil", "Chile", "Bolivia"]));
        assert_eq!(totals.len(), 2);
        assert_relative_eq!(totals[&2018].female_population, 1000.0);
        assert_relative_eq!(totals[&2019].female_population, 1000.0);
        assert_relative_eq!(totals[&2019].female_deaths, 9.7, epsilon = 1e-12);
    }

    #[test]
    fn test_compare_with_published_aggregate() {
        let records = fixture();
        let summed: BTreeMap<i32, f64> = aggregate_by_year(&records, &members(&["Brazil", "Chile", "Bolivia"]))
            .into_iter()
            .map(|(year, totals)| (year, totals.female_population))
            .collect();
        let published = region_totals(&records, "South America");
        assert_eq!(max_abs_difference(&summed, &published), Some(4.0));
        assert_eq!(max_abs_difference(&summed, &BTreeMap::new()), None);
    }

    #[test]
    fn test_coverage_by_year() {
        let records = fixture();
        let region = members(&["Brazil", "Chile", "Bolivia"]);
        let with_data = members(&["Brazil", "Chile", "Kenya"]);
        let coverage = coverage_by_year(&records, &region, &with_data).unwrap();

        assert_relative_eq!(coverage[&2018], 0.95);
        assert_relative_eq!(coverage[&2019], 0.97);
        assert!(years_below_coverage(&coverage, 0.8).is_empty());
        assert_eq!(years_below_coverage(&coverage, 0.96), vec![2018]);
    }

    #[test]
    fn test_coverage_zero_population() {
        let records = vec![record("Brazil", 2019, 0.0, 0.0)];
        let result = coverage_by_year(&records, &members(&["Brazil"]), &members(&["Brazil"]));
        assert!(matches!(result, Err(StandardizationError::ZeroTotalPopulation)));
    }

    #[test]
    fn test_regional_death_rates_weight_by_population() {
        let mortality = vec![
            rate("Brazil", 2019, 2.0),
            rate("Chile", 2019, 10.0),
            rate("Brazil", 2018, 3.0),
            rate("Kenya", 2019, 100.0),
            // No population row for 2017
            rate("Chile", 2017, 50.0),
        ];
        let rates = regional_death_rates(&fixture(), &mortality, &members(&["Brazil", "Chile", "Bolivia"])).unwrap();

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].year, 2018);
        assert_eq!(rates[0].countries, 1);
        assert_relative_eq!(rates[0].death_rate_per_100k, 3.0);

        assert_eq!(rates[1].year, 2019);
        assert_eq!(rates[1].countries, 2);
        assert_relative_eq!(rates[1].population_covered, 970.0);
        // (810 * 2 + 160 * 10) / 970
        assert_relative_eq!(rates[1].death_rate_per_100k, 3220.0 / 970.0, epsilon = 1e-12);
    }

    #[test]
    fn test_regional_death_rates_rejects_duplicate_mortality_rows() {
        let records = vec![record("Brazil", 2019, 100.0, 1.0), record("Chile", 2019, 100.0, 1.0)];
        let mortality = vec![rate("Brazil", 2019, 10.0), rate("Brazil", 2019, 10.0), rate("Chile", 2019, 0.0)];
        let result = regional_death_rates(&records, &mortality, &members(&["Brazil", "Chile"]));
        match result {
            Err(StandardizationError::Config(message)) => {
                assert_eq!(message, "duplicate mortality row for Brazil in 2019");
            }
            other => panic!("expected duplicate row error, got {:?}", other),
        }

        let deduplicated = vec![rate("Brazil", 2019, 10.0), rate("Chile", 2019, 0.0)];
        let rates = regional_death_rates(&records, &deduplicated, &members(&["Brazil", "Chile"])).unwrap();
        assert_eq!(rates[0].countries, 2);
        assert_relative_eq!(rates[0].population_covered, 200.0);
        assert_relative_eq!(rates[0].death_rate_per_100k, 5.0);
    }

    #[test]
    fn test_regional_death_rates_rejects_duplicate_population_rows() {
        let records = vec![record("Brazil", 2019, 100.0, 1.0), record("Brazil", 2019, 300.0, 3.0)];
        let mortality = vec![rate("Brazil", 2019, 10.0)];
        let result = regional_death_rates(&records, &mortality, &members(&["Brazil"]));
        assert!(matches!(result, Err(StandardizationError::Config(message)) if message.contains("population row for Brazil")));
    }

    #[test]
    fn test_countries_with_data() {
        let mortality = vec![rate("Brazil", 2019, 2.0), rate("Brazil", 2018, 2.0), rate("Chile", 2019, 1.0)];
        assert_eq!(countries_with_data(&mortality), members(&["Brazil", "Chile"]));
    }
}
