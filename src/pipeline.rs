use tracing::info;

use crate::enrich_config::Config;
use crate::error::Result;
use crate::incidents::{read_incidents, tally_crimes, CrimeTally};
use crate::output::write_neighborhoods;
use crate::population_table::read_population_table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub neighborhoods: usize,
    pub tally: CrimeTally,
}

/// Load table, tally incidents, compute rates, write output. Nothing is
/// written unless every earlier stage succeeds.
pub fn run(config: &Config) -> Result<RunSummary> {
    let _span = tracing::info_span!("enrich", year = %config.year).entered();

    let mut neighborhoods = read_population_table(&config.population_table, &config.table)?;
    let incidents = read_incidents(&config.incidents)?;

    let tally = tally_crimes(
        &mut neighborhoods,
        &incidents,
        &config.year,
        config.unknown_district,
    )?;
    neighborhoods.compute_crime_rates()?;

    write_neighborhoods(&config.output, neighborhoods.as_slice())?;

    info!(
        neighborhoods = neighborhoods.len(),
        total_crime = neighborhoods.total_crime(),
        "enrichment complete"
    );
    Ok(RunSummary {
        neighborhoods: neighborhoods.len(),
        tally,
    })
}
