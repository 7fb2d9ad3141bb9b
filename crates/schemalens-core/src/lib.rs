//! # SchemaLens Core
//!
//! Builds and serves a browsable schema snapshot of a label-typed graph store.
//!
//! Graph stores such as Neo4j have labels but no notion of a type hierarchy.
//! This crate turns the labels observed in a store into [`Concept`] records
//! and infers a "more specific than" relation between them from the label
//! combinations that actually occur on nodes:
//!
//! - **Query service** ([`QueryService`]): the typed queries the build issues
//!   against the store
//! - **Specificity oracle** ([`SpecificityOracle`]): orders a set of
//!   co-occurring labels from most generic to most specific
//! - **Snapshot builder** ([`SnapshotBuilder`]): fans out per-label
//!   aggregation, then runs hierarchy inference
//! - **Concept cache** ([`ConceptCache`]): publishes the immutable snapshot
//!   to concurrent readers and swaps in rebuilds atomically
//!
//! ## Quick Start
//!
//! ```rust
//! use schemalens_core::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> SchemaResult<()> {
//! let graph = InMemoryGraph::new();
//! graph.add_node(&["Concept", "Organisation"], "Acme");
//!
//! let cache = ConceptCache::build(
//!     graph.into_shared(),
//!     TypeHierarchy::builtin().into_shared(),
//!     BuildConfig::default(),
//! )
//! .await?;
//!
//! let concept = cache.get("Concept")?;
//! assert!(concept.more_specific_types.contains("Organisation"));
//! # Ok(())
//! # }
//! ```

pub mod build;
pub mod cache;
pub mod error;
pub mod hierarchy;
pub mod inference;
pub mod memory;
pub mod prelude;
pub mod query;
pub mod snapshot;
pub mod specificity;
pub mod types;

pub use build::{BuildConfig, SnapshotBuilder};
pub use cache::ConceptCache;
pub use error::{QueryError, QueryResult, SchemaError, SchemaResult, SpecificityError};
pub use hierarchy::TypeHierarchy;
pub use memory::InMemoryGraph;
pub use query::{QueryKind, QueryService};
pub use snapshot::Snapshot;
pub use specificity::SpecificityOracle;
pub use types::{Concept, ConceptSummary, ConceptView, Instance, InstanceRow, Property};
