//! Regional female mortality: South America and other continents
//!
//! Countries are matched across three sources (OWID continents, UN WPP
//! demographic indicators, WHO Mortality Database) after reconciling their
//! names, then aggregated per year.
//!
//! # Example
//!
//! ```rust,ignore
//! use mortality_standardization::regional::*;
//!
//! let aliases = CountryAliases::un_to_owid();
//! let members = load_continent_members("data/continents_owid.csv", "South America", &UNINHABITED_TERRITORIES)?;
//! let indicators = load_demographic_indicators("data/wpp_indicators.csv", &aliases)?;
//! let mortality = load_mortality_database("data/who_mortality.csv", "Female", &aliases)?;
//!
//! let coverage = coverage_by_year(&indicators, &members, &countries_with_data(&mortality))?;
//! let rates = regional_death_rates(&indicators, &mortality, &members)?;
//! ```

mod names;
mod aggregate;
pub mod loader;

pub use names::{CountryAliases, UNINHABITED_TERRITORIES};
pub use aggregate::{
    aggregate_by_year, countries_with_data, coverage_by_year, max_abs_difference, region_totals,
    regional_death_rates, years_below_coverage, RegionYear, RegionalRate,
};
pub use loader::{
    continent_members_from_reader, demographic_indicators_from_reader, load_continent_members,
    load_demographic_indicators, load_mortality_database, mortality_database_from_reader,
    DemographicRecord, MortalityRecord,
};

/// Minimum share of a region's population that must be covered by mortality data
pub const DEFAULT_MIN_COVERAGE: f64 = 0.8;
