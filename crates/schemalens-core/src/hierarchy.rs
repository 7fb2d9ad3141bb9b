//! Declared type hierarchy used as the default specificity oracle.
//!
//! A [`TypeHierarchy`] is a table of `label -> parent` links with an optional
//! ontology URI per label. It can only order label sets that lie on a single
//! ancestor chain; anything else is reported as unknown or ambiguous and left
//! to the inference fallback.

use crate::error::SpecificityError;
use crate::specificity::SpecificityOracle;
use crate::types::{Concept, ConceptView, InstanceView};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Declared facts about one type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeInfo {
    /// The direct supertype, `None` for a root.
    #[serde(default)]
    pub parent: Option<String>,
    /// Ontology URI of the type.
    #[serde(default)]
    pub uri: Option<String>,
}

/// A single-inheritance table of types.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    types: HashMap<String, TypeInfo>,
}

const ONTOLOGY_BASE: &str = "http://www.ft.com/ontology";

/// `(label, parent, uri path)` rows of the built-in concept ontology.
const BUILTIN_TYPES: &[(&str, Option<&str>, &str)] = &[
    ("Thing", None, "core/Thing"),
    ("Concept", Some("Thing"), "concept/Concept"),
    ("Classification", Some("Concept"), "classification/Classification"),
    ("Person", Some("Concept"), "person/Person"),
    ("Organisation", Some("Concept"), "organisation/Organisation"),
    ("Company", Some("Organisation"), "company/Company"),
    ("PublicCompany", Some("Company"), "company/PublicCompany"),
    ("PrivateCompany", Some("Company"), "company/PrivateCompany"),
    ("Brand", Some("Classification"), "product/Brand"),
    ("Subject", Some("Classification"), "Subject"),
    ("Section", Some("Classification"), "Section"),
    ("Genre", Some("Classification"), "Genre"),
    ("SpecialReport", Some("Classification"), "SpecialReport"),
    ("AlphavilleSeries", Some("Classification"), "AlphavilleSeries"),
    ("Topic", Some("Concept"), "Topic"),
    ("Location", Some("Concept"), "Location"),
    ("FinancialInstrument", Some("Thing"), "FinancialInstrument"),
    ("Role", Some("Thing"), "organisation/Role"),
    ("BoardRole", Some("Role"), "organisation/BoardRole"),
];

impl TypeHierarchy {
    /// An empty hierarchy; every label is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in concept ontology.
    pub fn builtin() -> Self {
        let types = BUILTIN_TYPES
            .iter()
            .map(|(label, parent, path)| {
                (
                    label.to_string(),
                    TypeInfo {
                        parent: parent.map(String::from),
                        uri: Some(format!("{}/{}", ONTOLOGY_BASE, path)),
                    },
                )
            })
            .collect();
        Self { types }
    }

    /// Add or replace a type.
    pub fn with_type(mut self, label: &str, parent: Option<&str>, uri: Option<&str>) -> Self {
        self.insert(
            label,
            TypeInfo {
                parent: parent.map(String::from),
                uri: uri.map(String::from),
            },
        );
        self
    }

    pub fn insert(&mut self, label: impl Into<String>, info: TypeInfo) {
        self.types.insert(label.into(), info);
    }

    /// Overlay entries from configuration on top of this table.
    pub fn merge(mut self, overrides: HashMap<String, TypeInfo>) -> Self {
        self.types.extend(overrides);
        self
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn contains(&self, label: &str) -> bool {
        self.types.contains_key(label)
    }

    pub fn parent_type(&self, label: &str) -> Option<&str> {
        self.types.get(label)?.parent.as_deref()
    }

    pub fn uri(&self, label: &str) -> Option<&str> {
        self.types.get(label)?.uri.as_deref()
    }

    /// Proper ancestors of `label`, nearest first.
    ///
    /// The walk stops at a root or at a parent the table does not declare.
    pub fn ancestors(&self, label: &str) -> Result<Vec<&str>, SpecificityError> {
        let mut current = self
            .types
            .get_key_value(label)
            .ok_or_else(|| SpecificityError::UnknownType(label.to_string()))?;

        let mut ancestors = Vec::new();
        while let Some(parent) = current.1.parent.as_deref() {
            if parent == label || ancestors.len() > self.types.len() {
                return Err(SpecificityError::Cycle(label.to_string()));
            }
            match self.types.get_key_value(parent) {
                Some(entry) => {
                    ancestors.push(entry.0.as_str());
                    current = entry;
                }
                None => {
                    ancestors.push(parent);
                    break;
                }
            }
        }
        Ok(ancestors)
    }

    /// The most specific of a node's types.
    ///
    /// Uses the hierarchy ordering when it exists and otherwise the last
    /// listed type.
    pub fn most_specific_type(&self, types: &[String]) -> Option<String> {
        match self.order_by_specificity(types) {
            Ok(mut ordered) => ordered.pop(),
            Err(_) => types.last().cloned(),
        }
    }

    /// Prepare a concept for display.
    pub fn view(&self, concept: &Concept) -> ConceptView {
        ConceptView {
            label: concept.label.clone(),
            uri: self.uri(&concept.label).map(String::from),
            parent_type: self.parent_type(&concept.label).map(String::from),
            instance_count: concept.instance_count,
            properties: concept.properties.clone(),
            more_specific_types: concept.more_specific_types.iter().cloned().collect(),
            example_instances: concept
                .example_instances
                .iter()
                .map(|instance| InstanceView {
                    display_label: instance.display_label.clone(),
                    types: instance.types.clone(),
                    most_specific_type: self.most_specific_type(&instance.types),
                    times_used: instance.times_used,
                })
                .collect(),
        }
    }
}

impl SpecificityOracle for TypeHierarchy {
    fn order_by_specificity(&self, labels: &[String]) -> Result<Vec<String>, SpecificityError> {
        if labels.is_empty() {
            return Err(SpecificityError::Empty);
        }

        let mut seen = HashSet::with_capacity(labels.len());
        if !labels.iter().all(|label| seen.insert(label.as_str())) {
            return Err(SpecificityError::Ambiguous(labels.to_vec()));
        }

        let mut ranked = labels
            .iter()
            .map(|label| self.ancestors(label).map(|ancestors| (ancestors, label)))
            .collect::<Result<Vec<_>, SpecificityError>>()?;
        ranked.sort_by_key(|(ancestors, _)| ancestors.len());

        // Every label must descend from the one before it.
        for pair in ranked.windows(2) {
            let generic = pair[0].1.as_str();
            if !pair[1].0.contains(&generic) {
                return Err(SpecificityError::Ambiguous(labels.to_vec()));
            }
        }

        Ok(ranked.into_iter().map(|(_, label)| label.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_orders_single_chain() {
        let hierarchy = TypeHierarchy::builtin();
        let ordered = hierarchy
            .order_by_specificity(&labels(&[
                "PublicCompany",
                "Thing",
                "Organisation",
                "Concept",
                "Company",
            ]))
            .unwrap();
        assert_eq!(
            ordered,
            labels(&["Thing", "Concept", "Organisation", "Company", "PublicCompany"])
        );
    }

    #[test]
    fn test_chain_may_skip_levels() {
        let hierarchy = TypeHierarchy::builtin();
        let ordered = hierarchy
            .order_by_specificity(&labels(&["Brand", "Thing"]))
            .unwrap();
        assert_eq!(ordered, labels(&["Thing", "Brand"]));
    }

    #[test]
    fn test_sibling_branches_are_ambiguous() {
        let hierarchy = TypeHierarchy::builtin();
        let result = hierarchy.order_by_specificity(&labels(&["Concept", "Person", "Brand"]));
        assert!(matches!(result, Err(SpecificityError::Ambiguous(_))));
    }

    #[test]
    fn test_unknown_label() {
        let hierarchy = TypeHierarchy::builtin();
        let result = hierarchy.order_by_specificity(&labels(&["Concept", "Widget"]));
        assert_eq!(result, Err(SpecificityError::UnknownType("Widget".into())));
    }

    #[test]
    fn test_duplicates_and_empty_are_rejected() {
        let hierarchy = TypeHierarchy::builtin();
        assert_eq!(hierarchy.order_by_specificity(&[]), Err(SpecificityError::Empty));
        assert!(hierarchy
            .order_by_specificity(&labels(&["Thing", "Thing"]))
            .is_err());
    }

    #[test]
    fn test_cycle_detected() {
        let hierarchy = TypeHierarchy::new()
            .with_type("A", Some("B"), None)
            .with_type("B", Some("A"), None);
        assert!(matches!(hierarchy.ancestors("A"), Err(SpecificityError::Cycle(_))));
    }

    #[test]
    fn test_undeclared_parent_ends_chain() {
        let hierarchy = TypeHierarchy::new().with_type("Widget", Some("Gadget"), None);
        assert_eq!(hierarchy.ancestors("Widget").unwrap(), vec!["Gadget"]);
    }

    #[test]
    fn test_most_specific_type_falls_back_to_last() {
        let hierarchy = TypeHierarchy::builtin();
        assert_eq!(
            hierarchy.most_specific_type(&labels(&["Company", "Thing", "Organisation"])),
            Some("Company".to_string())
        );
        assert_eq!(
            hierarchy.most_specific_type(&labels(&["Person", "Widget"])),
            Some("Widget".to_string())
        );
        assert_eq!(hierarchy.most_specific_type(&[]), None);
    }

    #[test]
    fn test_merge_overrides_builtin() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "Brand".to_string(),
            TypeInfo {
                parent: Some("Organisation".into()),
                uri: None,
            },
        );
        let hierarchy = TypeHierarchy::builtin().merge(overrides);
        assert_eq!(hierarchy.parent_type("Brand"), Some("Organisation"));
        assert_eq!(hierarchy.uri("Brand"), None);
        assert_eq!(
            hierarchy.uri("Person"),
            Some("http://www.ft.com/ontology/person/Person")
        );
    }

    #[test]
    fn test_view_marks_most_specific_type() {
        let hierarchy = TypeHierarchy::builtin();
        let mut concept = Concept::new("Organisation");
        concept.more_specific_types.insert("Company".into());
        concept.example_instances.push(crate::types::Instance::new(
            "Acme",
            labels(&["Thing", "Concept", "Organisation", "Company"]),
        ));

        let view = hierarchy.view(&concept);
        assert_eq!(view.parent_type.as_deref(), Some("Concept"));
        assert_eq!(view.more_specific_types, labels(&["Company"]));
        assert_eq!(
            view.example_instances[0].most_specific_type.as_deref(),
            Some("Company")
        );
    }
}
