use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV parsing failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON (de)serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed table: {0}")]
    Table(String),

    #[error("Invalid value {value:?} for {field} in {neighborhood}")]
    ParseValue {
        field: &'static str,
        neighborhood: String,
        value: String,
    },

    #[error("Duplicate neighborhood in table header: {0}")]
    DuplicateNeighborhood(String),

    #[error("Unknown district {} referenced by incident", district_label(.0))]
    UnknownDistrict(Option<String>),

    #[error("Neighborhood {0:?} has zero population, cannot compute crime rate")]
    ZeroPopulation(String),
}

impl EnrichError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EnrichError::Io {
            path: path.into(),
            source,
        }
    }
}

fn district_label(district: &Option<String>) -> String {
    match district {
        Some(d) => format!("{:?}", d),
        None => String::from("null"),
    }
}

pub type Result<T> = std::result::Result<T, EnrichError>;
