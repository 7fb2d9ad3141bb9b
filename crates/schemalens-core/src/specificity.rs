//! The specificity oracle consumed by hierarchy inference.

use crate::error::SpecificityError;
use std::sync::Arc;

/// Orders co-occurring labels from most generic to most specific.
///
/// Failing is normal for combinations the oracle does not recognise; the
/// inference pass falls back to the original order in that case.
pub trait SpecificityOracle: Send + Sync {
    fn order_by_specificity(&self, labels: &[String]) -> Result<Vec<String>, SpecificityError>;
}

impl<F> SpecificityOracle for F
where
    F: Fn(&[String]) -> Result<Vec<String>, SpecificityError> + Send + Sync,
{
    fn order_by_specificity(&self, labels: &[String]) -> Result<Vec<String>, SpecificityError> {
        self(labels)
    }
}

/// Shared handle to an oracle.
pub type SharedOracle = Arc<dyn SpecificityOracle>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_as_oracle() {
        let reverse = |labels: &[String]| -> Result<Vec<String>, SpecificityError> {
            Ok(labels.iter().rev().cloned().collect())
        };
        let ordered = reverse
            .order_by_specificity(&["B".to_string(), "A".to_string()])
            .unwrap();
        assert_eq!(ordered, vec!["A", "B"]);
    }
}
