use crate::domain::Domain;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to load artifact {}: {reason}", .path.display())]
    ArtifactLoad { path: PathBuf, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Item {item:?} is missing feature {feature:?}")]
    MissingFeature { item: String, feature: String },

    #[error("Invalid top_n {requested} for a catalog of {catalog_size} items")]
    InvalidTopN { requested: usize, catalog_size: usize },

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Domain not available: {0}")]
    DomainUnavailable(Domain),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl Error {
    pub fn artifact(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::ArtifactLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Query misses are recovered locally by recommenders instead of being
    /// handed back to the caller.
    #[inline]
    pub fn is_query_miss(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::MissingFeature { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
