use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde_derive::Deserialize;

use crate::error::{EnrichError, Result};
use crate::neighborhood::Attribute;

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub population_table: PathBuf,
    pub incidents: PathBuf,
    pub output: PathBuf,
    /// Incidents are counted when their date starts with this prefix.
    pub year: String,
    pub unknown_district: UnknownDistrict,
    pub table: TableSchema,
}

/// What to do with an incident whose district names no known neighborhood.
#[derive(Deserialize, ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnknownDistrict {
    #[default]
    Fail,
    Skip,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct TableSchema {
    pub delimiter: char,
    pub first_neighborhood_column: usize,
    pub label_column: usize,
    /// Attribute rows in table order; entry `k` is read from row `k + 1`.
    pub rows: Vec<SchemaRow>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SchemaRow {
    pub field: Attribute,
    pub label: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            population_table: PathBuf::from("montreal_population_by_density.csv"),
            incidents: PathBuf::from("actes-criminels.json"),
            output: PathBuf::from("neighborhood_data.json"),
            year: String::from("2021"),
            unknown_district: UnknownDistrict::Fail,
            table: TableSchema::default(),
        }
    }
}

impl Default for TableSchema {
    fn default() -> Self {
        TableSchema {
            delimiter: ',',
            first_neighborhood_column: 3,
            label_column: 0,
            rows: Attribute::ALL
                .iter()
                .map(|&field| SchemaRow { field, label: None })
                .collect(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.year.is_empty() {
            return Err(EnrichError::Config("year must not be empty".into()));
        }
        self.table.validate()
    }
}

impl TableSchema {
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(EnrichError::Config(format!(
                "delimiter {:?} is not a single ASCII character",
                self.delimiter
            )))
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.delimiter_byte()?;
        if self.first_neighborhood_column <= self.label_column {
            return Err(EnrichError::Config(format!(
                "first_neighborhood_column ({}) must come after label_column ({})",
                self.first_neighborhood_column, self.label_column
            )));
        }

        let mut seen = HashSet::new();
        for row in &self.rows {
            if !seen.insert(row.field) {
                return Err(EnrichError::Config(format!(
                    "attribute {} appears more than once in table.rows",
                    row.field.name()
                )));
            }
        }
        let missing: Vec<&str> = Attribute::ALL
            .iter()
            .filter(|a| !seen.contains(*a))
            .map(|a| a.name())
            .collect();
        if !missing.is_empty() {
            return Err(EnrichError::Config(format!(
                "table.rows is missing: {}",
                missing.join(", ")
            )));
        }
        Ok(())
    }
}

pub fn read_config(path: &Path) -> Result<Config> {
    let f = File::open(path).map_err(|e| EnrichError::io(path, e))?;
    let mut reader = io::BufReader::new(f);

    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|e| EnrichError::io(path, e))?;

    let config: Config = toml::from_str(&buf)?;
    config.validate()?;

    Ok(config)
}
