//! Snapshot construction.
//!
//! A build lists every label, aggregates each label independently with
//! bounded concurrency, joins, and only then runs hierarchy inference over
//! the complete concept map. Listing the labels is the only query whose
//! failure aborts a build; every other failure leaves a zero-valued field and
//! a warning.

use crate::error::{QueryError, QueryResult, SchemaError, SchemaResult};
use crate::inference::infer_hierarchy;
use crate::query::{QueryKind, SharedQueryService};
use crate::snapshot::{BuildStats, Snapshot};
use crate::specificity::SharedOracle;
use crate::types::{Concept, Instance, MAX_EXAMPLE_INSTANCES};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Tuning for a snapshot build.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Labels aggregated at the same time.
    pub concurrency: usize,
    /// Deadline for each individual per-label query.
    pub query_timeout: Duration,
    /// Deadline for the whole-graph label-set scan that feeds inference.
    pub label_sets_timeout: Duration,
    /// Example instances kept per concept, capped at [`MAX_EXAMPLE_INSTANCES`].
    pub example_limit: usize,
    /// How far back usage counts when ranking top instances.
    pub recent_window: Duration,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            query_timeout: Duration::from_secs(30),
            label_sets_timeout: Duration::from_secs(10 * 60),
            example_limit: MAX_EXAMPLE_INSTANCES,
            recent_window: Duration::from_secs(365 * 24 * 60 * 60),
        }
    }
}

impl BuildConfig {
    pub fn validate(&self) -> SchemaResult<()> {
        if self.concurrency == 0 {
            return Err(SchemaError::invalid_config("concurrency must be at least 1"));
        }
        if self.query_timeout.is_zero() {
            return Err(SchemaError::invalid_config("query timeout must be positive"));
        }
        if self.label_sets_timeout.is_zero() {
            return Err(SchemaError::invalid_config("label set timeout must be positive"));
        }
        Ok(())
    }

    pub fn example_limit(&self) -> usize {
        self.example_limit.min(MAX_EXAMPLE_INSTANCES)
    }

    /// Start of the usage window, in epoch seconds.
    pub fn since_epoch(&self) -> i64 {
        let window = i64::try_from(self.recent_window.as_secs()).unwrap_or(i64::MAX);
        chrono::Utc::now().timestamp().saturating_sub(window)
    }
}

/// Builds [`Snapshot`]s from a query service and a specificity oracle.
#[derive(Clone)]
pub struct SnapshotBuilder {
    queries: SharedQueryService,
    oracle: SharedOracle,
    config: BuildConfig,
}

impl SnapshotBuilder {
    pub fn new(queries: SharedQueryService, oracle: SharedOracle, config: BuildConfig) -> Self {
        Self {
            queries,
            oracle,
            config,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Name of the query service backend.
    pub fn backend(&self) -> &str {
        self.queries.name()
    }

    /// Run a full build.
    ///
    /// Fails only when the configuration is invalid or the label listing
    /// fails or times out.
    pub async fn build(&self) -> SchemaResult<Snapshot> {
        self.config.validate()?;
        let started = Instant::now();
        info!(backend = self.queries.name(), "Building concept snapshot");

        let labels = self
            .timed(self.queries.list_labels())
            .await
            .map_err(SchemaError::LabelListing)?;
        debug!(labels = labels.len(), "Listed labels");

        let since_epoch = self.config.since_epoch();
        let aggregated: Vec<(Concept, usize)> = stream::iter(labels)
            .map(|label| self.aggregate(label, since_epoch))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        let mut degraded_fields = 0;
        let mut concepts = HashMap::with_capacity(aggregated.len());
        for (concept, failures) in aggregated {
            degraded_fields += failures;
            concepts.insert(concept.label.clone(), concept);
        }

        let links = self.infer(&mut concepts).await;

        let stats = BuildStats {
            built_at: chrono::Utc::now(),
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            concept_count: concepts.len(),
            degraded_fields,
            inference_ran: links.is_some(),
            hierarchy_links: links.unwrap_or(0),
        };
        info!(
            concepts = stats.concept_count,
            degraded_fields = stats.degraded_fields,
            hierarchy_links = stats.hierarchy_links,
            elapsed_ms = stats.duration_ms,
            "Concept snapshot built"
        );
        Ok(Snapshot::new(concepts, stats))
    }

    /// Materialize one concept. Returns it with the number of failed queries.
    pub async fn aggregate(&self, label: String, since_epoch: i64) -> (Concept, usize) {
        let limit = self.config.example_limit();
        let mut failures = 0;

        let (count, top, properties) = tokio::join!(
            self.timed(self.queries.count_nodes(&label)),
            self.timed(self.queries.top_instances(&label, since_epoch, limit)),
            self.timed(self.queries.property_usage(&label)),
        );

        let mut concept = Concept::new(label);
        let label = concept.label.as_str();
        let instance_count = absorb(label, QueryKind::CountNodes, count, &mut failures);
        let properties = absorb(label, QueryKind::PropertyUsage, properties, &mut failures);
        let top = absorb(label, QueryKind::TopInstances, top, &mut failures);

        // Arbitrary examples only when nothing was used recently.
        let example_instances = if top.is_empty() {
            let some = self.timed(self.queries.some_instances(label, limit)).await;
            absorb(label, QueryKind::SomeInstances, some, &mut failures)
        } else {
            top.into_iter().map(Instance::from).collect()
        };

        concept.instance_count = instance_count;
        concept.properties = properties;
        concept.example_instances = example_instances;
        concept.example_instances.truncate(limit);

        debug!(label = %concept.label, instances = concept.instance_count, "Aggregated concept");
        (concept, failures)
    }

    /// Run hierarchy inference over `concepts`.
    ///
    /// Returns the number of links added, or `None` when the label sets
    /// could not be listed and inference was skipped.
    pub async fn infer(&self, concepts: &mut HashMap<String, Concept>) -> Option<usize> {
        let deadline = self.config.label_sets_timeout;
        match with_deadline(deadline, self.queries.distinct_label_sets()).await {
            Ok(label_sets) => Some(infer_hierarchy(concepts, &label_sets, self.oracle.as_ref())),
            Err(e) => {
                warn!(error = %e, "Failed to list label sets, skipping hierarchy inference");
                None
            }
        }
    }

    async fn timed<T>(&self, query: impl Future<Output = QueryResult<T>>) -> QueryResult<T> {
        with_deadline(self.config.query_timeout, query).await
    }
}

async fn with_deadline<T>(
    deadline: Duration,
    query: impl Future<Output = QueryResult<T>>,
) -> QueryResult<T> {
    tokio::time::timeout(deadline, query)
        .await
        .unwrap_or(Err(QueryError::Timeout(deadline)))
}

/// Keep a query's value, or log the failure and fall back to the zero value.
fn absorb<T: Default>(
    label: &str,
    kind: QueryKind,
    result: QueryResult<T>,
    failures: &mut usize,
) -> T {
    result.unwrap_or_else(|e| {
        *failures += 1;
        warn!(label, query = %kind, error = %e, "Query failed, leaving field empty");
        T::default()
    })
}
