//! The query service consumed by the snapshot builder.
//!
//! Each method is one typed query against the graph store. Implementations
//! validate the store's response at this boundary so that nothing past it
//! depends on the wire representation.

use crate::error::QueryResult;
use crate::types::{Instance, InstanceRow, Property};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Identifies a query shape, for logging and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryKind {
    ListLabels,
    CountNodes,
    TopInstances,
    SomeInstances,
    PropertyUsage,
    DistinctLabelSets,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryKind::ListLabels => "list_labels",
            QueryKind::CountNodes => "count_nodes",
            QueryKind::TopInstances => "top_instances",
            QueryKind::SomeInstances => "some_instances",
            QueryKind::PropertyUsage => "property_usage",
            QueryKind::DistinctLabelSets => "distinct_label_sets",
        };
        f.write_str(name)
    }
}

/// Abstract interface to the graph store.
///
/// Every call may fail with a [`QueryError`](crate::QueryError); the builder
/// decides which failures are fatal.
#[async_trait]
pub trait QueryService: Send + Sync {
    /// Get the name of this backend.
    fn name(&self) -> &str;

    /// All distinct node labels.
    async fn list_labels(&self) -> QueryResult<Vec<String>>;

    /// Number of nodes carrying `label`.
    async fn count_nodes(&self, label: &str) -> QueryResult<u64>;

    /// Up to `limit` nodes of `label`, ranked per node by how many content
    /// items published after `since_epoch` (seconds) are related to them.
    /// Nodes without recent usage are not returned.
    async fn top_instances(
        &self,
        label: &str,
        since_epoch: i64,
        limit: usize,
    ) -> QueryResult<Vec<InstanceRow>>;

    /// Up to `limit` arbitrary nodes of `label`.
    async fn some_instances(&self, label: &str, limit: usize) -> QueryResult<Vec<Instance>>;

    /// Relationship types on edges leaving nodes of `label`, with counts.
    async fn property_usage(&self, label: &str) -> QueryResult<Vec<Property>>;

    /// Every distinct combination of labels applied together to a node.
    async fn distinct_label_sets(&self) -> QueryResult<Vec<Vec<String>>>;
}

/// Shared handle to a query service.
pub type SharedQueryService = Arc<dyn QueryService>;
