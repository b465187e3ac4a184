use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::error::{EnrichError, Result};

const RATE_BASE: f64 = 100_000.0;

/// A demographic attribute held by one row of the population table.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Population,
    Density,
    SingleparentNb,
    SingleparentPct,
    AvgAge,
    MedianAge,
    NoDiplomaNb,
    NoDiplomaPct,
    HighschoolDiplomaNb,
    HighschoolDiplomaPct,
    MedianIncome,
    UnemploymentRate,
    #[serde(rename = "C90_C10_ratio")]
    C90C10Ratio,
    #[serde(rename = "Gini_index")]
    GiniIndex,
}

impl Attribute {
    /// Every attribute, in the row order of the published table.
    pub const ALL: [Attribute; 14] = [
        Attribute::Population,
        Attribute::Density,
        Attribute::SingleparentNb,
        Attribute::SingleparentPct,
        Attribute::AvgAge,
        Attribute::MedianAge,
        Attribute::NoDiplomaNb,
        Attribute::NoDiplomaPct,
        Attribute::HighschoolDiplomaNb,
        Attribute::HighschoolDiplomaPct,
        Attribute::MedianIncome,
        Attribute::UnemploymentRate,
        Attribute::C90C10Ratio,
        Attribute::GiniIndex,
    ];

    /// Field name as written in the output JSON.
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Population => "population",
            Attribute::Density => "density",
            Attribute::SingleparentNb => "singleparent_nb",
            Attribute::SingleparentPct => "singleparent_pct",
            Attribute::AvgAge => "avg_age",
            Attribute::MedianAge => "median_age",
            Attribute::NoDiplomaNb => "no_diploma_nb",
            Attribute::NoDiplomaPct => "no_diploma_pct",
            Attribute::HighschoolDiplomaNb => "highschool_diploma_nb",
            Attribute::HighschoolDiplomaPct => "highschool_diploma_pct",
            Attribute::MedianIncome => "median_income",
            Attribute::UnemploymentRate => "unemployment_rate",
            Attribute::C90C10Ratio => "C90_C10_ratio",
            Attribute::GiniIndex => "Gini_index",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Neighborhood {
    pub name: String,
    pub population: f64,
    pub density: f64,
    pub singleparent_nb: f64,
    pub singleparent_pct: f64,
    pub avg_age: f64,
    pub median_age: f64,
    pub no_diploma_nb: f64,
    pub no_diploma_pct: f64,
    pub highschool_diploma_nb: f64,
    pub highschool_diploma_pct: f64,
    pub median_income: f64,
    pub unemployment_rate: f64,
    #[serde(rename = "C90_C10_ratio")]
    pub c90_c10_ratio: f64,
    #[serde(rename = "Gini_index")]
    pub gini_index: f64,
    pub total_crime: u64,
    pub crime_rate: f64,
}

impl Neighborhood {
    /// A record with every attribute and both crime fields zeroed.
    pub fn new(name: impl Into<String>) -> Self {
        Neighborhood {
            name: name.into(),
            population: 0.0,
            density: 0.0,
            singleparent_nb: 0.0,
            singleparent_pct: 0.0,
            avg_age: 0.0,
            median_age: 0.0,
            no_diploma_nb: 0.0,
            no_diploma_pct: 0.0,
            highschool_diploma_nb: 0.0,
            highschool_diploma_pct: 0.0,
            median_income: 0.0,
            unemployment_rate: 0.0,
            c90_c10_ratio: 0.0,
            gini_index: 0.0,
            total_crime: 0,
            crime_rate: 0.0,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: f64) {
        let slot = match attribute {
            Attribute::Population => &mut self.population,
            Attribute::Density => &mut self.density,
            Attribute::SingleparentNb => &mut self.singleparent_nb,
            Attribute::SingleparentPct => &mut self.singleparent_pct,
            Attribute::AvgAge => &mut self.avg_age,
            Attribute::MedianAge => &mut self.median_age,
            Attribute::NoDiplomaNb => &mut self.no_diploma_nb,
            Attribute::NoDiplomaPct => &mut self.no_diploma_pct,
            Attribute::HighschoolDiplomaNb => &mut self.highschool_diploma_nb,
            Attribute::HighschoolDiplomaPct => &mut self.highschool_diploma_pct,
            Attribute::MedianIncome => &mut self.median_income,
            Attribute::UnemploymentRate => &mut self.unemployment_rate,
            Attribute::C90C10Ratio => &mut self.c90_c10_ratio,
            Attribute::GiniIndex => &mut self.gini_index,
        };
        *slot = value;
    }
}

/// Neighborhood records keyed by name, kept in table column order.
#[derive(Debug, Default)]
pub struct Neighborhoods {
    records: Vec<Neighborhood>,
    index: HashMap<String, usize>,
}

impl Neighborhoods {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, neighborhood: Neighborhood) -> Result<()> {
        if self.index.contains_key(&neighborhood.name) {
            return Err(EnrichError::DuplicateNeighborhood(neighborhood.name));
        }
        self.index
            .insert(neighborhood.name.clone(), self.records.len());
        self.records.push(neighborhood);
        Ok(())
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&Neighborhood> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Neighborhood> {
        match self.index.get(name) {
            Some(&i) => self.records.get_mut(i),
            None => None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub fn as_slice(&self) -> &[Neighborhood] {
        &self.records
    }

    pub fn total_crime(&self) -> u64 {
        self.records.iter().map(|n| n.total_crime).sum()
    }

    /// Sets `crime_rate` to incidents per 100,000 residents on every record.
    ///
    /// Must run after aggregation. A zero population is an error rather
    /// than an infinite or undefined rate.
    pub fn compute_crime_rates(&mut self) -> Result<()> {
        for n in self.records.iter_mut() {
            if n.population == 0.0 {
                return Err(EnrichError::ZeroPopulation(n.name.clone()));
            }
            n.crime_rate = n.total_crime as f64 / n.population * RATE_BASE;
            debug!(neighborhood = %n.name, rate = n.crime_rate, "crime rate");
        }
        Ok(())
    }
}
