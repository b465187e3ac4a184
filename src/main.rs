use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

mod enrich_config;
use enrich_config::{Config, UnknownDistrict};

mod error;
mod incidents;
mod logging;
mod neighborhood;
mod output;
mod pipeline;
mod population_table;

#[derive(Parser)]
#[command(name = "neighborhood-enrich")]
#[command(about = "Join neighborhood demographics with crime incidents into per-neighborhood JSON")]
#[command(version)]
struct Cli {
    /// TOML config file; built-in defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Population table (CSV)
    #[arg(long)]
    table: Option<PathBuf>,

    /// Crime incidents (JSON array)
    #[arg(long)]
    incidents: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only count incidents whose date starts with this year
    #[arg(long)]
    year: Option<String>,

    /// What to do with incidents in a district missing from the table
    #[arg(long, value_enum)]
    unknown_district: Option<UnknownDistrict>,
}

impl Cli {
    fn into_config(self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => enrich_config::read_config(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(table) = self.table {
            config.population_table = table;
        }
        if let Some(incidents) = self.incidents {
            config.incidents = incidents;
        }
        if let Some(output) = self.output {
            config.output = output;
        }
        if let Some(year) = self.year {
            config.year = year;
        }
        if let Some(policy) = self.unknown_district {
            config.unknown_district = policy;
        }
        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    logging::init_logging();

    let config = Cli::parse().into_config()?;
    info!(
        table = %config.population_table.display(),
        incidents = %config.incidents.display(),
        output = %config.output.display(),
        policy = ?config.unknown_district,
        "starting"
    );

    let summary = pipeline::run(&config).context("enrichment failed")?;
    info!(
        neighborhoods = summary.neighborhoods,
        counted = summary.tally.counted,
        "done"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_defaults() {
        let cli = Cli::parse_from([
            "neighborhood-enrich",
            "--year",
            "2020",
            "--unknown-district",
            "skip",
            "-o",
            "out/data.json",
        ]);
        let config = cli.into_config().unwrap();
        assert_eq!(config.year, "2020");
        assert_eq!(config.unknown_district, UnknownDistrict::Skip);
        assert_eq!(config.output, PathBuf::from("out/data.json"));
        assert_eq!(
            config.population_table,
            PathBuf::from("montreal_population_by_density.csv")
        );
    }

    #[test]
    fn test_cli_rejects_empty_year() {
        let cli = Cli::parse_from(["neighborhood-enrich", "--year", ""]);
        assert!(cli.into_config().is_err());
    }

    #[test]
    fn test_cli_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["neighborhood-enrich", "--unknown-district", "ignore"]).is_err());
    }
}
