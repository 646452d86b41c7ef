//! Mortality Standardization CLI
//!
//! Compares crude and age-standardized death rates of the configured countries
//! and writes their age distributions next to the standard population.

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use mortality_standardization::{report::DEFAULT_BAR_WIDTH, run_comparison, AnalysisConfig};
use std::fs::File;
use std::path::PathBuf;

/// Crude vs age-standardized death rates
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file; flags below override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Death rates by age bucket, one column per country
    #[arg(long, value_name = "FILE")]
    death_rates: Option<PathBuf>,

    /// UN WPP population by five-year age group
    #[arg(long, value_name = "FILE")]
    population: Option<PathBuf>,

    /// Custom standard population (age,weight); WHO World Standard by default
    #[arg(long, value_name = "FILE")]
    standard: Option<PathBuf>,

    /// Population year
    #[arg(short, long)]
    year: Option<i32>,

    /// Output path for the age-distribution table
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the full report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> Result<(AnalysisConfig, bool)> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => AnalysisConfig::default(),
        };

        if let Some(path) = self.death_rates {
            config.death_rates_path = path;
        }
        if let Some(path) = self.population {
            config.population_path = path;
        }
        if let Some(path) = self.standard {
            config.standard_path = Some(path);
        }
        if let Some(year) = self.year {
            config.year = year;
        }
        if let Some(path) = self.output {
            config.distribution_output = path;
        }
        Ok((config, self.json))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let (config, json) = Args::parse().into_config()?;
    debug!("Configuration: {:?}", config);

    let report = run_comparison(&config).context("Comparison failed")?;

    let output = File::create(&config.distribution_output)
        .with_context(|| format!("Unable to create {}", config.distribution_output.display()))?;
    report.write_distribution_csv(output)?;
    info!("Age distributions written to {}", config.distribution_output.display());

    if json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.render_rates());
        println!();
        print!("{}", report.render_distributions(DEFAULT_BAR_WIDTH));
        println!("\nAge distributions written to: {}", config.distribution_output.display());
    }
    Ok(())
}
