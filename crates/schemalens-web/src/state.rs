//! Application state for the web server.
//!
//! Handlers read concepts straight from the cache; rebuilds run on the
//! request task and publish through the same cache.

use schemalens_core::query::SharedQueryService;
use schemalens_core::{
    BuildConfig, ConceptCache, ConceptView, SchemaResult, Snapshot, SnapshotBuilder, TypeHierarchy,
};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    cache: Arc<ConceptCache>,
    builder: SnapshotBuilder,
    /// Also the builder's specificity oracle.
    hierarchy: Arc<TypeHierarchy>,
}

impl AppState {
    /// Create state with an empty cache. Call [`AppState::rebuild`] to
    /// publish the first snapshot.
    pub fn new(queries: SharedQueryService, hierarchy: TypeHierarchy, config: BuildConfig) -> Self {
        let hierarchy = hierarchy.into_shared();
        let builder = SnapshotBuilder::new(queries, hierarchy.clone(), config);
        Self {
            cache: Arc::new(ConceptCache::empty()),
            builder,
            hierarchy,
        }
    }

    pub fn cache(&self) -> &ConceptCache {
        &self.cache
    }

    pub fn backend(&self) -> &str {
        self.builder.backend()
    }

    /// Build a new snapshot and publish it.
    pub async fn rebuild(&self) -> SchemaResult<Arc<Snapshot>> {
        self.cache.rebuild(&self.builder).await
    }

    /// Look up a concept prepared for display.
    pub fn view(&self, label: &str) -> SchemaResult<ConceptView> {
        let concept = self.cache.get(label)?;
        Ok(self.hierarchy.view(&concept))
    }
}
