// martgate-core/src/error.rs

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MartGateError {
    // --- DOMAIN ERRORS (identifiers, read-only guard) ---
    #[error(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (warehouse, IO, config) ---
    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- RUN ERRORS ---
    #[error("Check '{check}' aborted the run: {source}")]
    CheckAborted {
        check: String,
        #[source]
        source: Box<MartGateError>,
    },

    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl MartGateError {
    /// Attributes an error raised while a deep check was querying.
    pub fn aborted(check: impl Into<String>, source: MartGateError) -> Self {
        MartGateError::CheckAborted {
            check: check.into(),
            source: Box::new(source),
        }
    }
}

impl From<std::io::Error> for MartGateError {
    fn from(err: std::io::Error) -> Self {
        MartGateError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl From<duckdb::Error> for MartGateError {
    fn from(err: duckdb::Error) -> Self {
        MartGateError::Infrastructure(InfrastructureError::from(err))
    }
}
