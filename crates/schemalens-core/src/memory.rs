//! In-memory graph store implementation.
//!
//! This module provides a small labelled property graph that answers the
//! [`QueryService`] queries directly. It's useful for testing, for demos and
//! for exercising the build pipeline without a database.

use crate::error::{QueryError, QueryResult};
use crate::query::{QueryKind, QueryService};
use crate::types::{Instance, InstanceRow, Property};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tracing::warn;

/// Label of the nodes whose relationships count as usage.
pub const CONTENT_LABEL: &str = "Content";

/// Index of a node inside an [`InMemoryGraph`], returned by
/// [`InMemoryGraph::add_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct NodeRecord {
    labels: Vec<String>,
    display_label: String,
}

#[derive(Debug, Clone)]
struct EdgeRecord {
    from: usize,
    to: usize,
    relationship_type: String,
    /// When the edge was created, for usage ranking.
    at_epoch: Option<i64>,
}

#[derive(Debug, Default)]
struct GraphState {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Default)]
struct Faults {
    /// `(kind, None)` fails every call of that kind.
    failing: HashSet<(QueryKind, Option<String>)>,
    delays: HashMap<QueryKind, Duration>,
}

/// In-memory labelled graph.
///
/// Besides answering queries it can inject failures and delays per query
/// kind and records how often each kind was called.
///
/// # Example
///
/// ```rust
/// use schemalens_core::{InMemoryGraph, QueryService};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let graph = InMemoryGraph::new();
///     let acme = graph.add_node(&["Concept", "Organisation"], "Acme");
///     let jane = graph.add_node(&["Concept", "Person"], "Jane");
///     graph.relate(jane, "WORKS_AT", acme);
///
///     assert_eq!(graph.count_nodes("Concept").await?, 2);
///     let properties = graph.property_usage("Person").await?;
///     assert_eq!(properties[0].relationship_type, "WORKS_AT");
///     Ok(())
/// }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryGraph {
    state: RwLock<GraphState>,
    faults: RwLock<Faults>,
    calls: Mutex<HashMap<QueryKind, usize>>,
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Add a node carrying `labels`, in that order.
    pub fn add_node(&self, labels: &[&str], display_label: &str) -> NodeIndex {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        state.nodes.push(NodeRecord {
            labels: labels.iter().map(|l| l.to_string()).collect(),
            display_label: display_label.to_string(),
        });
        NodeIndex(state.nodes.len() - 1)
    }

    /// Add an undated relationship.
    ///
    /// Returns false, and adds nothing, when either index does not belong to
    /// this graph.
    pub fn relate(&self, from: NodeIndex, relationship_type: &str, to: NodeIndex) -> bool {
        self.push_edge(from, relationship_type, to, None)
    }

    /// Add a relationship published at `at_epoch` (seconds). A dated
    /// relationship between a node and a [`CONTENT_LABEL`] node, in either
    /// direction, counts as usage of that node.
    pub fn relate_at(
        &self,
        from: NodeIndex,
        relationship_type: &str,
        to: NodeIndex,
        at_epoch: i64,
    ) -> bool {
        self.push_edge(from, relationship_type, to, Some(at_epoch))
    }

    fn push_edge(
        &self,
        from: NodeIndex,
        relationship_type: &str,
        to: NodeIndex,
        at_epoch: Option<i64>,
    ) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let nodes = state.nodes.len();
        if from.0 >= nodes || to.0 >= nodes {
            warn!(
                from = from.0,
                to = to.0,
                nodes,
                "Ignoring relationship with a node index from another graph"
            );
            return false;
        }
        state.edges.push(EdgeRecord {
            from: from.0,
            to: to.0,
            relationship_type: relationship_type.to_string(),
            at_epoch,
        });
        true
    }

    /// Make every call of `kind` fail.
    pub fn fail(&self, kind: QueryKind) {
        self.faults_mut().failing.insert((kind, None));
    }

    /// Make calls of `kind` for `label` fail.
    pub fn fail_for(&self, kind: QueryKind, label: &str) {
        self.faults_mut()
            .failing
            .insert((kind, Some(label.to_string())));
    }

    /// Delay every call of `kind` before answering.
    pub fn delay(&self, kind: QueryKind, duration: Duration) {
        self.faults_mut().delays.insert(kind, duration);
    }

    /// Remove all injected failures and delays.
    pub fn heal(&self) {
        *self.faults_mut() = Faults::default();
    }

    /// Number of calls made for `kind`.
    pub fn calls(&self, kind: QueryKind) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        calls.get(&kind).copied().unwrap_or(0)
    }

    fn faults_mut(&self) -> std::sync::RwLockWriteGuard<'_, Faults> {
        self.faults.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Record the call, apply any delay and injected failure.
    async fn enter(&self, kind: QueryKind, label: Option<&str>) -> QueryResult<()> {
        *self
            .calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(kind)
            .or_insert(0) += 1;

        let (delay, failing) = {
            let faults = self.faults.read().unwrap_or_else(|e| e.into_inner());
            let failing = faults.failing.contains(&(kind, None))
                || label.map_or(false, |l| {
                    faults.failing.contains(&(kind, Some(l.to_string())))
                });
            (faults.delays.get(&kind).copied(), failing)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(QueryError::transport(format!(
                "injected failure for {}{}",
                kind,
                label.map(|l| format!(" on {}", l)).unwrap_or_default()
            )));
        }
        Ok(())
    }

    fn read_state(&self) -> QueryResult<std::sync::RwLockReadGuard<'_, GraphState>> {
        self.state
            .read()
            .map_err(|e| QueryError::transport(format!("Failed to acquire read lock: {}", e)))
    }

    /// A small concept graph with recent usage, for demos.
    pub fn sample() -> Self {
        let graph = Self::new();
        let now = chrono::Utc::now().timestamp();
        let day = 24 * 60 * 60;

        let public_company = ["Thing", "Concept", "Organisation", "Company", "PublicCompany"];
        let company = ["Thing", "Concept", "Organisation", "Company"];
        let organisation = ["Thing", "Concept", "Organisation"];
        let person = ["Thing", "Concept", "Person"];
        let section = ["Thing", "Concept", "Classification", "Section"];
        let brand = ["Thing", "Concept", "Classification", "Brand"];

        let ft = graph.add_node(&public_company, "Pearson plc");
        let nikkei = graph.add_node(&company, "Nikkei Inc");
        let ecb = graph.add_node(&organisation, "European Central Bank");
        let lagarde = graph.add_node(&person, "Christine Lagarde");
        let musk = graph.add_node(&person, "Elon Musk");
        let markets = graph.add_node(&section, "Markets");
        let lex = graph.add_node(&brand, "Lex");
        let london = graph.add_node(&["Thing", "Concept", "Location"], "London");
        let rates = graph.add_node(&["Thing", "Concept", "Topic"], "Interest rates");
        // Conflicting label combination; the hierarchy cannot order it.
        let odd = graph.add_node(&["Brand", "Person"], "FT Alphaville");

        graph.relate(lagarde, "HAS_ROLE", ecb);
        graph.relate(ecb, "HAS_LOCATION", london);
        graph.relate(ft, "SUB_ORGANISATION_OF", nikkei);
        graph.relate(lex, "HAS_PARENT", markets);

        let stories = [
            ("ECB holds rates", vec![ecb, lagarde, rates, markets], 2),
            ("Lagarde speaks", vec![lagarde, ecb], 5),
            ("Tesla results", vec![musk, markets, lex], 9),
            ("Nikkei buys the FT", vec![nikkei, ft, london], 400),
            ("City office market", vec![london, markets], 200),
            ("Alphaville on rates", vec![odd, rates], 1),
        ];
        for (title, mentions, age_days) in stories {
            let content = graph.add_node(&[CONTENT_LABEL], title);
            for concept in mentions {
                graph.relate_at(content, "MENTIONS", concept, now - age_days * day);
            }
        }

        graph
    }
}

#[async_trait]
impl QueryService for InMemoryGraph {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn list_labels(&self) -> QueryResult<Vec<String>> {
        self.enter(QueryKind::ListLabels, None).await?;
        let state = self.read_state()?;

        let mut seen = HashSet::new();
        let labels = state
            .nodes
            .iter()
            .flat_map(|node| node.labels.iter())
            .filter(|label| seen.insert(label.as_str()))
            .cloned()
            .collect();
        Ok(labels)
    }

    async fn count_nodes(&self, label: &str) -> QueryResult<u64> {
        self.enter(QueryKind::CountNodes, Some(label)).await?;
        let state = self.read_state()?;

        let count = state
            .nodes
            .iter()
            .filter(|node| node.labels.iter().any(|l| l == label))
            .count();
        Ok(count as u64)
    }

    async fn top_instances(
        &self,
        label: &str,
        since_epoch: i64,
        limit: usize,
    ) -> QueryResult<Vec<InstanceRow>> {
        self.enter(QueryKind::TopInstances, Some(label)).await?;
        let state = self.read_state()?;

        let has = |index: usize, wanted: &str| state.nodes[index].labels.iter().any(|l| l == wanted);

        let mut usage: HashMap<usize, u64> = HashMap::new();
        for edge in &state.edges {
            if !edge.at_epoch.map_or(false, |at| at > since_epoch) {
                continue;
            }
            for (node, other) in [(edge.to, edge.from), (edge.from, edge.to)] {
                if has(node, label) && has(other, CONTENT_LABEL) {
                    *usage.entry(node).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(usize, u64)> = usage.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| state.nodes[a.0].display_label.cmp(&state.nodes[b.0].display_label))
        });

        let rows = ranked
            .into_iter()
            .take(limit)
            .map(|(index, times_used)| {
                let node = &state.nodes[index];
                InstanceRow {
                    display_label: node.display_label.clone(),
                    types: node.labels.clone(),
                    times_used,
                }
            })
            .collect();
        Ok(rows)
    }

    async fn some_instances(&self, label: &str, limit: usize) -> QueryResult<Vec<Instance>> {
        self.enter(QueryKind::SomeInstances, Some(label)).await?;
        let state = self.read_state()?;

        let instances = state
            .nodes
            .iter()
            .filter(|node| node.labels.iter().any(|l| l == label))
            .take(limit)
            .map(|node| Instance::new(node.display_label.clone(), node.labels.clone()))
            .collect();
        Ok(instances)
    }

    async fn property_usage(&self, label: &str) -> QueryResult<Vec<Property>> {
        self.enter(QueryKind::PropertyUsage, Some(label)).await?;
        let state = self.read_state()?;

        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for edge in &state.edges {
            if state.nodes[edge.from].labels.iter().any(|l| l == label) {
                *counts.entry(edge.relationship_type.as_str()).or_insert(0) += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(relationship_type, count)| Property::new(relationship_type, count))
            .collect())
    }

    async fn distinct_label_sets(&self) -> QueryResult<Vec<Vec<String>>> {
        self.enter(QueryKind::DistinctLabelSets, None).await?;
        let state = self.read_state()?;

        let mut seen = HashSet::new();
        let sets = state
            .nodes
            .iter()
            .filter(|node| {
                let mut key = node.labels.clone();
                key.sort();
                seen.insert(key)
            })
            .map(|node| node.labels.clone())
            .collect();
        Ok(sets)
    }
}
