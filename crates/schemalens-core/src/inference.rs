//! Hierarchy inference from co-occurring labels.
//!
//! Every label set observed on a node is ordered generic-to-specific and each
//! adjacent pair becomes a "more specific than" link on the generic concept.
//! The result is the union of those links over all label sets. It is not a
//! transitive closure and may contain cycles when observations contradict
//! each other.

use crate::specificity::SpecificityOracle;
use crate::types::Concept;
use std::collections::HashMap;
use tracing::debug;

/// Order a label set with the oracle, falling back to its original order.
pub fn specificity_chain(label_set: &[String], oracle: &dyn SpecificityOracle) -> Vec<String> {
    match oracle.order_by_specificity(label_set) {
        Ok(ordered) => ordered,
        Err(e) => {
            debug!(labels = ?label_set, error = %e, "Unordered label set, using enumeration order");
            label_set.to_vec()
        }
    }
}

/// Add adjacency links for every label set to `concepts`.
///
/// Only `more_specific_types` of existing records is touched. Returns the
/// number of links that were not already present.
pub fn infer_hierarchy(
    concepts: &mut HashMap<String, Concept>,
    label_sets: &[Vec<String>],
    oracle: &dyn SpecificityOracle,
) -> usize {
    let mut added = 0;
    for label_set in label_sets {
        let chain = specificity_chain(label_set, oracle);
        for pair in chain.windows(2) {
            let (generic, specific) = (&pair[0], &pair[1]);
            if generic == specific {
                continue;
            }
            match concepts.get_mut(generic) {
                Some(concept) => {
                    if concept.more_specific_types.insert(specific.clone()) {
                        added += 1;
                    }
                }
                None => debug!(label = %generic, "Label set names an unlisted label"),
            }
        }
    }
    added
}
