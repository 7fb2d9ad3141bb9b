//! Error types for schema snapshot operations.
//!
//! Only two conditions ever reach a caller: the fatal label-listing failure
//! during a build and `ConceptNotFound` on lookup. Everything else is
//! absorbed by the builder and logged.

use std::time::Duration;
use thiserror::Error;

/// Result type for cache and build operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for query service calls.
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors surfaced by the concept cache.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Concept not found: {0}")]
    ConceptNotFound(String),

    #[error("Failed to list labels: {0}")]
    LabelListing(#[source] QueryError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Errors returned by a [`QueryService`](crate::QueryService).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Store error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    #[error("Query timed out after {0:?}")]
    Timeout(Duration),
}

/// Errors returned by a [`SpecificityOracle`](crate::SpecificityOracle).
///
/// These are expected for most unusual label combinations and are never
/// reported as warnings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecificityError {
    #[error("No labels to order")]
    Empty,

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Ambiguous ordering for types: {}", .0.join(", "))]
    Ambiguous(Vec<String>),

    #[error("Type hierarchy contains a cycle through {0}")]
    Cycle(String),
}

impl SchemaError {
    pub fn concept_not_found(label: impl Into<String>) -> Self {
        SchemaError::ConceptNotFound(label.into())
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        SchemaError::Config(reason.into())
    }
}

impl QueryError {
    pub fn transport(message: impl Into<String>) -> Self {
        QueryError::Transport(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        QueryError::Decode(message.into())
    }
}
