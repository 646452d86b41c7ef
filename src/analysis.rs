//! Country comparison driver: load, compute, assemble the report

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::population::{load_un_population, UnPopulation};
use crate::rates::{load_death_rates, DeathRateTable};
use crate::report::{ComparisonReport, NamedDistribution};
use crate::standard::{load_standard_population, StandardPopulation};
use crate::standardize::Standardizer;
use log::info;

/// Label of the standard population column in the distribution output
pub const STANDARD_LABEL: &str = "WHO";

/// Compute crude and standardized rates for every configured country
pub fn compare_countries(
    config: &AnalysisConfig,
    rates: &DeathRateTable,
    population: &UnPopulation,
    standardizer: &Standardizer,
) -> Result<ComparisonReport> {
    let mut country_rates = Vec::with_capacity(config.countries.len());
    let mut distributions = Vec::with_capacity(config.countries.len() + 1);

    for country in &config.countries {
        let country_series = rates.get(&country.rate_column)?;
        let proportions = population.proportions(&country.population_location)?;
        country_rates.push(standardizer.compare(&country.label, country_series, &proportions)?);
        distributions.push(NamedDistribution { name: country.label.clone(), proportions });
    }

    let standard = standardizer.standard();
    let standard_label = if config.standard_path.is_some() { standard.name() } else { STANDARD_LABEL };
    distributions.push(NamedDistribution {
        name: standard_label.to_string(),
        proportions: standard.proportions().clone(),
    });

    Ok(ComparisonReport::new(population.year(), standard.name(), country_rates, distributions))
}

/// Load every input named by the config and run the comparison
pub fn run_comparison(config: &AnalysisConfig) -> Result<ComparisonReport> {
    config.validate()?;

    let standard = match &config.standard_path {
        Some(path) => load_standard_population(path)?,
        None => StandardPopulation::who_world(),
    };
    info!("Standardizing against {}", standard.name());

    let rates = load_death_rates(&config.death_rates_path)?;
    let population = load_un_population(&config.population_path, &config.population_locations(), config.year)?;

    compare_countries(config, &rates, &population, &Standardizer::new(standard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CountrySpec;
    use crate::error::StandardizationError;
    use crate::population::{un_population_from_reader, AgeBucket};
    use crate::rates::death_rates_from_reader;
    use approx::assert_relative_eq;

    /// Death rates rising tenfold every 20 years, identical for both countries
    fn rate_csv() -> String {
        let mut data = String::from("age,usa,uganda\n");
        for bucket in AgeBucket::reference_layout() {
            let rate = 10f64.powf(bucket.lower() as f64 / 20.0);
            data.push_str(&format!("{},{},{}\n", bucket, rate, rate));
        }
        data
    }

    /// UN layout; the USA is flat, Uganda halves every bucket
    fn population_csv() -> String {
        let mut data = String::from("Location,Time,AgeGrp,PopTotal\n");
        for (index, bucket) in AgeBucket::five_year_layout(100).iter().enumerate() {
            data.push_str(&format!("United States of America,2019,{},1000\n", bucket));
            data.push_str(&format!("Uganda,2019,{},{}\n", bucket, 1e6 / 2f64.powi(index as i32)));
        }
        data
    }

    fn inputs(config: &AnalysisConfig) -> (DeathRateTable, UnPopulation) {
        let rates = death_rates_from_reader(rate_csv().as_bytes()).unwrap();
        let population =
            un_population_from_reader(population_csv().as_bytes(), &config.population_locations(), config.year).unwrap();
        (rates, population)
    }

    #[test]
    fn test_same_rates_give_same_standardized_rate() {
        let config = AnalysisConfig::default();
        let (rates, population) = inputs(&config);
        let report = compare_countries(&config, &rates, &population, &Standardizer::who_world()).unwrap();

        assert_eq!(report.year, 2019);
        assert_eq!(report.rates.len(), 2);
        let usa = &report.rates[0];
        let uganda = &report.rates[1];
        assert_eq!(usa.country, "USA");

        // The older population has the higher crude rate...
        assert!(usa.crude_rate > 5.0 * uganda.crude_rate);
        // ...but identical age-specific rates standardize to the same value
        assert_relative_eq!(usa.standardized_rate, uganda.standardized_rate, epsilon = 1e-12);
    }

    #[test]
    fn test_report_carries_three_distributions() {
        let config = AnalysisConfig::default();
        let (rates, population) = inputs(&config);
        let report = compare_countries(&config, &rates, &population, &Standardizer::who_world()).unwrap();

        let names: Vec<&str> = report.distributions.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["USA", "Uganda", "WHO"]);
        let mut csv = Vec::new();
        report.write_distribution_csv(&mut csv).unwrap();
        assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 19);
    }

    #[test]
    fn test_missing_rate_column() {
        let mut config = AnalysisConfig::default();
        config.countries.push(CountrySpec::new("Kenya", "kenya", "Uganda"));
        let (rates, population) = inputs(&AnalysisConfig::default());
        let result = compare_countries(&config, &rates, &population, &Standardizer::who_world());
        assert!(matches!(result, Err(StandardizationError::MissingCountry { country }) if country == "kenya"));
    }
}
