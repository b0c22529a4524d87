use std::path::PathBuf;

use thiserror::Error;

use crate::data::model::Role;

/// Failures while binding columns to roles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("no records were decoded")]
    NoRecords,
    #[error("the header has no columns")]
    NoColumns,
    #[error("{role} column '{column}' is not in the header")]
    UnknownColumn { role: Role, column: String },
}

/// Failures while loading the viewer configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
