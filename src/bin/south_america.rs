//! Female mortality across South America (or any OWID continent)
//!
//! Reconciles country names between OWID, UN WPP and the WHO Mortality
//! Database, checks that countries with mortality data cover enough of the
//! region's population, and reports the population-weighted all-ages female
//! death rate per year.
//!
//! Usage: cargo run --bin south_america -- --indicators wpp.csv --mortality who.csv

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, warn};
use mortality_standardization::regional::{
    aggregate_by_year, countries_with_data, coverage_by_year, load_continent_members,
    load_demographic_indicators, load_mortality_database, max_abs_difference, region_totals,
    regional_death_rates, years_below_coverage, CountryAliases, RegionYear, RegionalRate,
    DEFAULT_MIN_COVERAGE, UNINHABITED_TERRITORIES,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// OWID continent membership CSV
    #[arg(long, value_name = "FILE", default_value = "data/continents_owid.csv")]
    continents: PathBuf,

    /// WPP demographic indicators ("Estimates" sheet exported as CSV)
    #[arg(long, value_name = "FILE")]
    indicators: PathBuf,

    /// WHO Mortality Database export
    #[arg(long, value_name = "FILE")]
    mortality: PathBuf,

    #[arg(long, default_value = "South America")]
    continent: String,

    #[arg(long, default_value = "Female")]
    sex: String,

    /// Fail when countries with data cover less than this share of the population in any year
    #[arg(long, default_value_t = DEFAULT_MIN_COVERAGE)]
    min_coverage: f64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RegionalSummary {
    continent: String,
    countries: BTreeSet<String>,
    countries_without_data: Vec<String>,
    totals: Vec<RegionYear>,
    coverage: BTreeMap<i32, f64>,
    max_difference_from_published: Option<f64>,
    death_rates: Vec<RegionalRate>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let aliases = CountryAliases::un_to_owid();

    let members = load_continent_members(&args.continents, &args.continent, &UNINHABITED_TERRITORIES)
        .with_context(|| format!("Failed to load members of {}", args.continent))?;
    let indicators = load_demographic_indicators(&args.indicators, &aliases)
        .context("Failed to load demographic indicators")?;
    let mortality = load_mortality_database(&args.mortality, &args.sex, &aliases)
        .context("Failed to load mortality database")?;

    // Rejects duplicate rows before any totals are summed
    let death_rates = regional_death_rates(&indicators, &mortality, &members)?;

    let with_data = countries_with_data(&mortality);
    let countries_without_data: Vec<String> = members.difference(&with_data).cloned().collect();
    if !countries_without_data.is_empty() {
        warn!("No mortality data for: {}", countries_without_data.join(", "));
    }

    let totals = aggregate_by_year(&indicators, &members);
    let summed: BTreeMap<i32, f64> = totals.iter().map(|(year, t)| (*year, t.female_population)).collect();
    let max_difference = max_abs_difference(&summed, &region_totals(&indicators, &args.continent));
    if let Some(diff) = max_difference {
        info!("Largest yearly difference from the published {} total: {:.0} people", args.continent, diff);
    }

    let coverage = coverage_by_year(&indicators, &members, &with_data)?;
    let short_years = years_below_coverage(&coverage, args.min_coverage);
    if !short_years.is_empty() {
        bail!(
            "Countries with mortality data cover less than {:.0}% of the population in {:?}",
            args.min_coverage * 100.0,
            short_years
        );
    }

    if args.json {
        let summary = RegionalSummary {
            continent: args.continent,
            countries: members,
            countries_without_data,
            totals: totals.into_values().collect(),
            coverage,
            max_difference_from_published: max_difference,
            death_rates,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} ({} countries)", args.continent, members.len());
    println!("{:>6} {:>16} {:>14} {:>10} {:>12} {:>10}",
        "Year", "FemalePop", "FemaleDeaths", "Coverage", "Rate/100k", "Countries");
    println!("{}", "-".repeat(73));

    let rates_by_year: BTreeMap<i32, &RegionalRate> = death_rates.iter().map(|r| (r.year, r)).collect();
    for (year, total) in &totals {
        let coverage_pct = coverage.get(year).copied().unwrap_or(0.0) * 100.0;
        match rates_by_year.get(year) {
            Some(rate) => println!("{:>6} {:>16.0} {:>14.0} {:>9.1}% {:>12.2} {:>10}",
                year, total.female_population, total.female_deaths, coverage_pct,
                rate.death_rate_per_100k, rate.countries),
            None => println!("{:>6} {:>16.0} {:>14.0} {:>9.1}% {:>12} {:>10}",
                year, total.female_population, total.female_deaths, coverage_pct, "-", 0),
        }
    }
    Ok(())
}
