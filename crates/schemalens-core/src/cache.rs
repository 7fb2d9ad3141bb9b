//! The concept cache served to readers.
//!
//! The cache holds an atomically swappable reference to the current
//! [`Snapshot`]. Readers load the reference without locking and never see a
//! snapshot that is still being built; a rebuild constructs a complete new
//! snapshot off to the side and publishes it in one swap.

use crate::build::{BuildConfig, SnapshotBuilder};
use crate::error::{SchemaError, SchemaResult};
use crate::query::SharedQueryService;
use crate::snapshot::Snapshot;
use crate::specificity::SharedOracle;
use crate::types::{Concept, ConceptSummary};
use arc_swap::ArcSwapOption;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Concurrent read access to the latest concept snapshot.
///
/// # Example
///
/// ```rust
/// use schemalens_core::prelude::*;
///
/// #[tokio::main]
/// async fn main() -> SchemaResult<()> {
///     let cache = ConceptCache::empty();
///     assert!(matches!(cache.get("Person"), Err(SchemaError::ConceptNotFound(_))));
///
///     let graph = InMemoryGraph::new();
///     graph.add_node(&["Concept", "Person"], "Jane");
///     let builder = SnapshotBuilder::new(
///         graph.into_shared(),
///         TypeHierarchy::builtin().into_shared(),
///         BuildConfig::default(),
///     );
///     cache.rebuild(&builder).await?;
///
///     assert_eq!(cache.get("Person")?.instance_count, 1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct ConceptCache {
    current: ArcSwapOption<Snapshot>,
    /// Serializes rebuilds so that publishes happen in build order.
    rebuilding: Mutex<()>,
}

impl ConceptCache {
    /// A cache with no snapshot; every lookup misses until one is published.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the first snapshot and return a ready cache.
    ///
    /// Fails only when the label listing fails.
    pub async fn build(
        queries: SharedQueryService,
        oracle: SharedOracle,
        config: BuildConfig,
    ) -> SchemaResult<Self> {
        let cache = Self::empty();
        cache
            .rebuild(&SnapshotBuilder::new(queries, oracle, config))
            .await?;
        Ok(cache)
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let cache = Self::empty();
        cache.publish(Arc::new(snapshot));
        cache
    }

    /// Build a new snapshot and swap it in.
    ///
    /// On failure the snapshot currently in service is kept.
    pub async fn rebuild(&self, builder: &SnapshotBuilder) -> SchemaResult<Arc<Snapshot>> {
        let _guard = self.rebuilding.lock().await;
        match builder.build().await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                let previous = self.publish(snapshot.clone());
                info!(
                    concepts = snapshot.len(),
                    replaced = previous.is_some(),
                    "Published concept snapshot"
                );
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, ready = self.is_ready(), "Snapshot build failed");
                Err(e)
            }
        }
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn publish(&self, snapshot: Arc<Snapshot>) -> Option<Arc<Snapshot>> {
        self.current.swap(Some(snapshot))
    }

    /// The snapshot currently in service.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.current.load_full()
    }

    pub fn is_ready(&self) -> bool {
        self.current.load().is_some()
    }

    /// Look up a concept by label.
    pub fn get(&self, label: &str) -> SchemaResult<Arc<Concept>> {
        match self.current.load().as_ref() {
            Some(snapshot) => snapshot.get(label),
            None => Err(SchemaError::concept_not_found(label)),
        }
    }

    /// Summaries of the current snapshot, empty before the first build.
    pub fn summaries(&self) -> Vec<ConceptSummary> {
        self.current
            .load()
            .as_ref()
            .map(|snapshot| snapshot.summaries())
            .unwrap_or_default()
    }
}
