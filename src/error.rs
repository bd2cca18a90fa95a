//! Error type shared by the seeder pipeline.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Table {0} was not found.")]
    TableNotFound(String),

    #[error("failed to read template {}: {source}", path.display())]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("data source error: {0}")]
    Source(String),

    #[error("no seeder section or run() method found in {}", .0.display())]
    AggregatorSectionNotFound(PathBuf),

    #[error("invalid event class name: {0:?}")]
    InvalidHook(String),

    #[error("{0}")]
    InvalidOption(String),
}

impl From<duckdb::Error> for SeedError {
    fn from(err: duckdb::Error) -> Self {
        SeedError::Source(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SeedError>;
