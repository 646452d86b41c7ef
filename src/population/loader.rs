//! Load population by five-year age group from UN World Population Prospects CSV

use super::{AgeBucket, AgeSeries, PopulationDistribution, PopulationProportions, REFERENCE_OPEN_AGE};
use crate::error::{Result, StandardizationError};
use csv::{ReaderBuilder, Trim};
use log::{debug, info};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// Default location of the WPP population-by-age file
pub const DEFAULT_UN_POPULATION_PATH: &str = "data/WPP2022_PopulationByAge5GroupSex_Medium.csv";

/// Raw CSV row; the WPP file has many more columns, which are ignored
#[derive(Debug, serde::Deserialize)]
struct UnPopulationRow {
    #[serde(rename = "Location")]
    location: String,
    #[serde(rename = "Time")]
    year: i32,
    #[serde(rename = "AgeGrp")]
    age_group: String,
    #[serde(rename = "PopTotal")]
    pop_total: f64,
}

/// Population distributions for a set of locations in a single year
#[derive(Debug, Clone)]
pub struct UnPopulation {
    year: i32,
    distributions: HashMap<String, PopulationDistribution>,
}

impl UnPopulation {
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn locations(&self) -> impl Iterator<Item = &str> + '_ {
        self.distributions.keys().map(String::as_str)
    }

    /// Distribution as published (e.g. 0-4 ... 95-99, 100+)
    pub fn distribution(&self, location: &str) -> Result<&PopulationDistribution> {
        self.distributions
            .get(location)
            .ok_or_else(|| StandardizationError::missing_country(location))
    }

    /// Proportions over the reference layout, with ages 85 and over folded into 85+
    pub fn proportions(&self, location: &str) -> Result<PopulationProportions> {
        population_proportions(self.distribution(location)?)
    }
}

/// Fold a distribution into the reference layout and normalize it
pub fn population_proportions(distribution: &PopulationDistribution) -> Result<PopulationProportions> {
    distribution
        .collapse_open_interval(REFERENCE_OPEN_AGE)?
        .proportions()
}

/// Load the given locations for one year from a WPP CSV file
pub fn load_un_population<P: AsRef<Path>>(path: P, locations: &[String], year: i32) -> Result<UnPopulation> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let population = un_population_from_reader(file, locations, year)?;
    info!(
        "Loaded {} population distributions for {} from {}",
        population.distributions.len(),
        year,
        path.display()
    );
    Ok(population)
}

/// Load the given locations for one year from any reader
///
/// Every requested location must have at least one row for `year`.
pub fn un_population_from_reader<R: Read>(reader: R, locations: &[String], year: i32) -> Result<UnPopulation> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut series: HashMap<String, AgeSeries> = HashMap::new();
    let mut skipped = 0usize;

    for result in csv_reader.deserialize() {
        let row: UnPopulationRow = result?;
        if row.year != year || !locations.iter().any(|location| *location == row.location) {
            skipped += 1;
            continue;
        }
        let bucket: AgeBucket = row.age_group.parse()?;
        series.entry(row.location).or_default().insert(bucket, row.pop_total)?;
    }
    debug!("Skipped {} population rows outside the requested locations/year", skipped);

    let mut distributions = HashMap::new();
    for location in locations {
        let counts = series
            .remove(location)
            .ok_or_else(|| StandardizationError::missing_country(location.as_str()))?;
        distributions.insert(location.clone(), PopulationDistribution::new(counts)?);
    }

    Ok(UnPopulation { year, distributions })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn wpp_fixture() -> String {
        let mut data = String::from("SortOrder,Location,Time,AgeGrp,AgeGrpStart,PopMale,PopFemale,PopTotal\n");
        for (location, base) in [("Uganda", 2000.0), ("United States of America", 1000.0)] {
            for year in [2018, 2019] {
                for (index, bucket) in AgeBucket::five_year_layout(100).iter().enumerate() {
                    // Young-heavy for Uganda, flat for the USA
                    let total = if location == "Uganda" { base / (index + 1) as f64 } else { base };
                    let total = total + (year - 2018) as f64;
                    data.push_str(&format!(
                        "1,{},{},{},{},0,0,{}\n",
                        location,
                        year,
                        bucket,
                        bucket.lower(),
                        total
                    ));
                }
            }
        }
        data.push_str("1,Kenya,2019,0-4,0,0,0,500\n");
        data
    }

    #[test]
    fn test_load_filters_location_and_year() {
        let data = wpp_fixture();
        let locations = vec!["Uganda".to_string(), "United States of America".to_string()];
        let population = un_population_from_reader(data.as_bytes(), &locations, 2019).unwrap();

        assert_eq!(population.year(), 2019);
        let mut loaded: Vec<&str> = population.locations().collect();
        loaded.sort();
        assert_eq!(loaded, vec!["Uganda", "United States of America"]);

        let usa = population.distribution("United States of America").unwrap();
        assert_eq!(usa.counts().len(), 21);
        assert_abs_diff_eq!(usa.total(), 21.0 * 1001.0, epsilon = 1e-9);
    }

    #[test]
    fn test_proportions_fold_to_reference_layout() {
        let data = wpp_fixture();
        let locations = vec!["United States of America".to_string()];
        let population = un_population_from_reader(data.as_bytes(), &locations, 2019).unwrap();
        let proportions = population.proportions("United States of America").unwrap();

        let buckets: Vec<AgeBucket> = proportions.as_series().buckets().copied().collect();
        assert_eq!(buckets, AgeBucket::reference_layout());
        assert_abs_diff_eq!(proportions.as_series().total(), 1.0, epsilon = 1e-9);
        // Flat population: 4 of 21 buckets are 85 and over
        assert_abs_diff_eq!(proportions.get(&AgeBucket::open(85)).unwrap(), 4.0 / 21.0, epsilon = 1e-12);
        assert_abs_diff_eq!(proportions.get(&AgeBucket::closed(0, 4).unwrap()).unwrap(), 1.0 / 21.0, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_location() {
        let data = wpp_fixture();
        let locations = vec!["Atlantis".to_string()];
        let result = un_population_from_reader(data.as_bytes(), &locations, 2019);
        assert!(matches!(result, Err(StandardizationError::MissingCountry { country }) if country == "Atlantis"));
    }

    #[test]
    fn test_missing_year() {
        let data = wpp_fixture();
        let locations = vec!["Uganda".to_string()];
        assert!(un_population_from_reader(data.as_bytes(), &locations, 1950).is_err());
    }

    #[test]
    fn test_unknown_location_lookup() {
        let data = wpp_fixture();
        let locations = vec!["Uganda".to_string()];
        let population = un_population_from_reader(data.as_bytes(), &locations, 2019).unwrap();
        assert!(population.proportions("Kenya").is_err());
    }
}
