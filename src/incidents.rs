use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_derive::Deserialize;
use tracing::{info, warn};

use crate::enrich_config::UnknownDistrict;
use crate::error::{EnrichError, Result};
use crate::neighborhood::Neighborhoods;

/// One crime incident; fields other than the date and district are ignored.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Incident {
    #[serde(rename = "DATE")]
    pub date: String,
    /// `None` when the key is absent, `Some(None)` when it is `null`.
    #[serde(rename = "ARRONDISSEMENT", default, deserialize_with = "present_district")]
    pub district: Option<Option<String>>,
}

fn present_district<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    <Option<String> as serde::Deserialize>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrimeTally {
    pub seen: u64,
    pub counted: u64,
    pub other_year: u64,
    pub no_district: u64,
    pub unknown_district: u64,
}

pub fn read_incidents(path: &Path) -> Result<Vec<Incident>> {
    let file = File::open(path).map_err(|e| EnrichError::io(path, e))?;
    let incidents = parse_incidents(BufReader::new(file))?;
    info!(path = %path.display(), incidents = incidents.len(), "loaded incidents");
    Ok(incidents)
}

pub fn parse_incidents<R: Read>(input: R) -> Result<Vec<Incident>> {
    Ok(serde_json::from_reader(input)?)
}

/// Adds every incident dated in `year` that names a district to that
/// neighborhood's `total_crime`.
pub fn tally_crimes(
    neighborhoods: &mut Neighborhoods,
    incidents: &[Incident],
    year: &str,
    unknown: UnknownDistrict,
) -> Result<CrimeTally> {
    let mut tally = CrimeTally::default();
    for incident in incidents {
        tally.seen += 1;
        if !incident.date.starts_with(year) {
            tally.other_year += 1;
            continue;
        }
        // a null district passes the presence check and then fails lookup
        let district = match &incident.district {
            Some(d) => d.as_deref(),
            None => {
                tally.no_district += 1;
                continue;
            }
        };
        match district.and_then(|d| neighborhoods.get_mut(d)) {
            Some(n) => {
                n.total_crime += 1;
                tally.counted += 1;
            }
            None => match unknown {
                UnknownDistrict::Fail => {
                    return Err(EnrichError::UnknownDistrict(district.map(str::to_string)));
                }
                UnknownDistrict::Skip => {
                    warn!(district = ?district, date = %incident.date, "skipping incident in unknown district");
                    tally.unknown_district += 1;
                }
            },
        }
    }

    info!(
        seen = tally.seen,
        counted = tally.counted,
        other_year = tally.other_year,
        no_district = tally.no_district,
        unknown_district = tally.unknown_district,
        "tallied incidents for {}",
        year
    );
    Ok(tally)
}
