//! Loaders for the regional analysis inputs
//!
//! - OWID continent membership (`Entity, Code, Year, Continent`)
//! - WPP demographic indicators, CSV export of the "Estimates" sheet
//! - WHO Mortality Database map export
//!
//! The WPP and WHO exports carry free-text preambles above the header row.
//! The header is located by one of its column names, so the exact preamble
//! length does not matter.

use super::CountryAliases;
use crate::error::{record_line, Result, StandardizationError};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Cursor, Read};
use std::path::Path;

pub const REGION_COLUMN: &str = "Region, subregion, country or area *";
pub const YEAR_COLUMN: &str = "Year";
pub const FEMALE_POPULATION_COLUMN: &str = "Female Population, as of 1 July (thousands)";
pub const FEMALE_DEATHS_COLUMN: &str = "Female Deaths (thousands)";

pub const COUNTRY_NAME_COLUMN: &str = "Country Name";
pub const SEX_COLUMN: &str = "Sex";
pub const AGE_GROUP_COLUMN: &str = "Age Group";
pub const DEATH_RATE_COLUMN: &str = "Death rate per 100 000 population";

/// Age-group label used by the WHO Mortality Database for all ages combined
pub const ALL_AGES: &str = "[All]";

/// One region (country or aggregate) and year from the WPP indicators
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicRecord {
    /// Canonical name
    pub region: String,
    pub year: i32,
    /// Persons (converted from thousands)
    pub female_population: f64,
    /// Persons (converted from thousands)
    pub female_deaths: f64,
}

/// All-ages death rate for one country and year from the WHO Mortality Database
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityRecord {
    /// Canonical name
    pub country: String,
    pub year: i32,
    pub death_rate_per_100k: f64,
}

#[derive(Debug, serde::Deserialize)]
struct ContinentRow {
    #[serde(rename = "Entity")]
    entity: String,
    #[serde(rename = "Continent")]
    continent: String,
}

/// Countries OWID assigns to `continent`, minus `excluded`
pub fn load_continent_members<P: AsRef<Path>>(path: P, continent: &str, excluded: &[&str]) -> Result<BTreeSet<String>> {
    let path = path.as_ref();
    let members = continent_members_from_reader(std::fs::File::open(path)?, continent, excluded)?;
    info!("{} countries in {} according to {}", members.len(), continent, path.display());
    Ok(members)
}

pub fn continent_members_from_reader<R: Read>(reader: R, continent: &str, excluded: &[&str]) -> Result<BTreeSet<String>> {
    let mut csv_reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut members = BTreeSet::new();

    for result in csv_reader.deserialize() {
        let row: ContinentRow = result?;
        if row.continent == continent && !excluded.contains(&row.entity.as_str()) {
            members.insert(row.entity);
        }
    }

    if members.is_empty() {
        return Err(StandardizationError::missing_country(continent));
    }
    Ok(members)
}

/// Load WPP demographic indicators, renaming regions to their canonical spelling
pub fn load_demographic_indicators<P: AsRef<Path>>(path: P, aliases: &CountryAliases) -> Result<Vec<DemographicRecord>> {
    let path = path.as_ref();
    let records = demographic_indicators_from_reader(std::fs::File::open(path)?, aliases)?;
    info!("Loaded {} demographic indicator rows from {}", records.len(), path.display());
    Ok(records)
}

pub fn demographic_indicators_from_reader<R: Read>(reader: R, aliases: &CountryAliases) -> Result<Vec<DemographicRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(skip_to_header(reader, REGION_COLUMN)?);
    let headers = csv_reader.headers()?.clone();
    let region = column_index(&headers, REGION_COLUMN)?;
    let year = column_index(&headers, YEAR_COLUMN)?;
    let population = column_index(&headers, FEMALE_POPULATION_COLUMN)?;
    let deaths = column_index(&headers, FEMALE_DEATHS_COLUMN)?;

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let parsed = (
            parse_year(record.get(year)),
            parse_number(record.get(population)),
            parse_number(record.get(deaths)),
        );
        let (Some(row_year), Some(female_population), Some(female_deaths)) = parsed else {
            debug!("Skipping non-numeric indicator row at line {}", record_line(&record));
            continue;
        };
        records.push(DemographicRecord {
            region: aliases.canonical(record.get(region).unwrap_or("")).to_string(),
            year: row_year,
            female_population: female_population * 1000.0,
            female_deaths: female_deaths * 1000.0,
        });
    }
    Ok(records)
}

/// Load all-ages death rates for one sex from a WHO Mortality Database export
pub fn load_mortality_database<P: AsRef<Path>>(path: P, sex: &str, aliases: &CountryAliases) -> Result<Vec<MortalityRecord>> {
    let path = path.as_ref();
    let records = mortality_database_from_reader(std::fs::File::open(path)?, sex, aliases)?;
    info!("Loaded {} all-ages {} mortality rows from {}", records.len(), sex.to_lowercase(), path.display());
    Ok(records)
}

pub fn mortality_database_from_reader<R: Read>(reader: R, sex: &str, aliases: &CountryAliases) -> Result<Vec<MortalityRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(skip_to_header(reader, COUNTRY_NAME_COLUMN)?);
    let headers = csv_reader.headers()?.clone();
    let country = column_index(&headers, COUNTRY_NAME_COLUMN)?;
    let year = column_index(&headers, YEAR_COLUMN)?;
    let sex_column = column_index(&headers, SEX_COLUMN)?;
    let age_group = column_index(&headers, AGE_GROUP_COLUMN)?;
    let rate = column_index(&headers, DEATH_RATE_COLUMN)?;

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        if record.get(sex_column) != Some(sex) || record.get(age_group) != Some(ALL_AGES) {
            continue;
        }
        let (Some(row_year), Some(death_rate)) = (parse_year(record.get(year)), parse_number(record.get(rate))) else {
            debug!("Skipping mortality row without a rate at line {}", record_line(&record));
            continue;
        };
        records.push(MortalityRecord {
            country: aliases.canonical(record.get(country).unwrap_or("")).to_string(),
            year: row_year,
            death_rate_per_100k: death_rate,
        });
    }
    Ok(records)
}

/// Drop preamble lines until the one containing `marker`, which becomes the header
fn skip_to_header<R: Read>(reader: R, marker: &str) -> Result<impl Read> {
    let mut buffered = BufReader::new(reader);
    let mut line = String::new();
    loop {
        line.clear();
        if buffered.read_line(&mut line)? == 0 {
            return Err(StandardizationError::Config(format!("header with column {:?} not found", marker)));
        }
        if line.contains(marker) {
            return Ok(Cursor::new(line).chain(buffered));
        }
    }
}

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|header| header == name)
        .ok_or_else(|| StandardizationError::Config(format!("missing column {:?}", name)))
}

/// Numbers as exported from spreadsheets: `1 234.5`, `1234.5`; `...` and blanks are missing
fn parse_number(cell: Option<&str>) -> Option<f64> {
    let cleaned: String = cell?.chars().filter(|c| !c.is_whitespace()).collect();
    cleaned.parse().ok().filter(|value: &f64| value.is_finite())
}

/// Years sometimes come out of spreadsheets as `2019.0`
fn parse_year(cell: Option<&str>) -> Option<i32> {
    let value = parse_number(cell)?;
    (value.fract() == 0.0).then_some(value as i32)
}
