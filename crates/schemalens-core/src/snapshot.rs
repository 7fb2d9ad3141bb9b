//! Immutable concept snapshots.

use crate::error::{SchemaError, SchemaResult};
use crate::types::{Concept, ConceptSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Facts about the build that produced a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStats {
    pub built_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub concept_count: usize,
    /// Per-label fields left at their zero value because a query failed.
    pub degraded_fields: usize,
    /// False when the label-set query failed and inference was skipped.
    pub inference_ran: bool,
    pub hierarchy_links: usize,
}

/// The complete concept map produced by one build.
///
/// Never mutated after construction; a rebuild produces a new snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    concepts: HashMap<String, Arc<Concept>>,
    stats: BuildStats,
}

impl Snapshot {
    pub fn new(concepts: HashMap<String, Concept>, stats: BuildStats) -> Self {
        Self {
            concepts: concepts
                .into_iter()
                .map(|(label, concept)| (label, Arc::new(concept)))
                .collect(),
            stats,
        }
    }

    pub fn get(&self, label: &str) -> SchemaResult<Arc<Concept>> {
        self.concepts
            .get(label)
            .cloned()
            .ok_or_else(|| SchemaError::concept_not_found(label))
    }

    pub fn contains(&self, label: &str) -> bool {
        self.concepts.contains_key(label)
    }

    /// All labels, sorted.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.concepts.keys().map(String::as_str).collect();
        labels.sort_unstable();
        labels
    }

    /// Summaries of all concepts, sorted by label.
    pub fn summaries(&self) -> Vec<ConceptSummary> {
        let mut summaries: Vec<_> = self.concepts.values().map(|c| c.summary()).collect();
        summaries.sort_by(|a, b| a.label.cmp(&b.label));
        summaries
    }

    pub fn concepts(&self) -> impl Iterator<Item = &Arc<Concept>> {
        self.concepts.values()
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}
