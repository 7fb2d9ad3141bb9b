//! Convenient imports for common usage.
//!
//! ```rust
//! use schemalens_core::prelude::*;
//! ```

// Re-export the data model
pub use crate::types::{
    Concept, ConceptSummary, ConceptView, Instance, InstanceRow, InstanceView, Property,
};

// Re-export the collaborator traits
pub use crate::query::{QueryKind, QueryService};
pub use crate::specificity::SpecificityOracle;

// Re-export the build pipeline and cache
pub use crate::build::{BuildConfig, SnapshotBuilder};
pub use crate::cache::ConceptCache;
pub use crate::hierarchy::TypeHierarchy;
pub use crate::memory::InMemoryGraph;
pub use crate::snapshot::Snapshot;

// Re-export error types
pub use crate::error::{QueryError, QueryResult, SchemaError, SchemaResult, SpecificityError};
