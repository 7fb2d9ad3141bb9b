//! Data model for schema snapshots.
//!
//! [`Concept`] is the record the cache serves. The remaining types are the
//! typed response contracts of the query service and the presentation views
//! derived from a concept.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Maximum number of example instances kept per concept.
pub const MAX_EXAMPLE_INSTANCES: usize = 10;

/// One node label of the graph store, treated as a schema type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    /// The label itself; unique within a snapshot.
    pub label: String,
    /// Number of nodes carrying the label (0 when the count query failed).
    pub instance_count: u64,
    /// Relationship types seen on outgoing edges, with usage counts.
    pub properties: Vec<Property>,
    /// Representative nodes, at most [`MAX_EXAMPLE_INSTANCES`].
    pub example_instances: Vec<Instance>,
    /// Labels this concept was observed to be directly more generic than.
    pub more_specific_types: BTreeSet<String>,
}

impl Concept {
    /// An empty record for `label`; every field at its zero value.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instance_count: 0,
            properties: Vec::new(),
            example_instances: Vec::new(),
            more_specific_types: BTreeSet::new(),
        }
    }

    pub fn summary(&self) -> ConceptSummary {
        ConceptSummary {
            label: self.label.clone(),
            instance_count: self.instance_count,
            more_specific_count: self.more_specific_types.len(),
        }
    }
}

/// Usage of one relationship type on edges leaving nodes of a concept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub relationship_type: String,
    pub usage_count: u64,
}

impl Property {
    pub fn new(relationship_type: impl Into<String>, usage_count: u64) -> Self {
        Self {
            relationship_type: relationship_type.into(),
            usage_count,
        }
    }
}

/// A representative node of a concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Human-readable name of the node.
    pub display_label: String,
    /// Every label the node carries.
    pub types: Vec<String>,
    /// Recent usage, present only for usage-ranked instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times_used: Option<u64>,
}

impl Instance {
    pub fn new(display_label: impl Into<String>, types: Vec<String>) -> Self {
        Self {
            display_label: display_label.into(),
            types,
            times_used: None,
        }
    }
}

/// A usage-ranked instance as returned by the "top instances" query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRow {
    pub display_label: String,
    pub types: Vec<String>,
    pub times_used: u64,
}

impl From<InstanceRow> for Instance {
    fn from(row: InstanceRow) -> Self {
        Self {
            display_label: row.display_label,
            types: row.types,
            times_used: Some(row.times_used),
        }
    }
}

/// Compact listing entry for a concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptSummary {
    pub label: String,
    pub instance_count: u64,
    pub more_specific_count: usize,
}

/// A concept prepared for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptView {
    pub label: String,
    /// Ontology URI of the type, when the hierarchy knows one.
    pub uri: Option<String>,
    /// Declared parent type, when the hierarchy knows one.
    pub parent_type: Option<String>,
    pub instance_count: u64,
    pub properties: Vec<Property>,
    pub more_specific_types: Vec<String>,
    pub example_instances: Vec<InstanceView>,
}

/// An example instance prepared for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceView {
    pub display_label: String,
    pub types: Vec<String>,
    pub most_specific_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times_used: Option<u64>,
}
