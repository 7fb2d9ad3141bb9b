//! Cypher statements issued by the query service.
//!
//! Labels cannot be query parameters in Cypher, so they are interpolated as
//! backtick-quoted identifiers. Every other value travels as a parameter.

use serde::Serialize;
use serde_json::{Map, Value};

/// One statement of a transactional request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub statement: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,
}

impl Statement {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            parameters: Map::new(),
        }
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }
}

/// Quote `identifier` for use as a label, property or relationship name.
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

pub fn list_labels() -> Statement {
    Statement::new("CALL db.labels() YIELD label RETURN label")
}

pub fn count_nodes(label: &str) -> Statement {
    Statement::new(format!(
        "MATCH (n:{}) RETURN count(n)",
        quote_identifier(label)
    ))
}

/// Nodes of `label` ranked by how many `content_label` nodes published after
/// `since_epoch` are related to them, in either direction.
///
/// Counts are aggregated per node before projecting, so distinct nodes that
/// share a `prefLabel` stay separate rows.
pub fn top_instances(
    label: &str,
    content_label: &str,
    published_property: &str,
    since_epoch: i64,
    limit: usize,
) -> Statement {
    Statement::new(format!(
        "MATCH (n:{})--(c:{}) WHERE c.{} > $since \
         WITH n, count(c) AS timesUsed \
         ORDER BY timesUsed DESC LIMIT $limit \
         RETURN n.prefLabel, labels(n), timesUsed",
        quote_identifier(label),
        quote_identifier(content_label),
        quote_identifier(published_property),
    ))
    .with_parameter("since", since_epoch)
    .with_parameter("limit", limit)
}

pub fn some_instances(label: &str, limit: usize) -> Statement {
    Statement::new(format!(
        "MATCH (n:{}) RETURN n.prefLabel, labels(n) LIMIT $limit",
        quote_identifier(label)
    ))
    .with_parameter("limit", limit)
}

pub fn property_usage(label: &str) -> Statement {
    Statement::new(format!(
        "MATCH (n:{})-[r]->() RETURN type(r) AS t, count(*) AS n ORDER BY n DESC",
        quote_identifier(label)
    ))
}

pub fn distinct_label_sets() -> Statement {
    Statement::new("MATCH (n) RETURN DISTINCT labels(n)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier_escapes_backticks() {
        assert_eq!(quote_identifier("Person"), "`Person`");
        assert_eq!(quote_identifier("Odd`Label"), "`Odd``Label`");
    }

    #[test]
    fn test_count_interpolates_quoted_label() {
        assert_eq!(
            count_nodes("Public Company").statement,
            "MATCH (n:`Public Company`) RETURN count(n)"
        );
    }

    #[test]
    fn test_top_instances_parameters() {
        let statement = top_instances("Person", "Content", "publishedDateEpoch", 1_700_000_000, 10);
        assert!(statement.statement.contains("(n:`Person`)--(c:`Content`)"));
        assert!(statement.statement.contains("c.`publishedDateEpoch` > $since"));
        assert!(statement
            .statement
            .contains("WITH n, count(c) AS timesUsed ORDER BY timesUsed DESC LIMIT $limit"));
        assert!(statement
            .statement
            .ends_with("RETURN n.prefLabel, labels(n), timesUsed"));
        assert_eq!(statement.parameters["since"], 1_700_000_000i64);
        assert_eq!(statement.parameters["limit"], 10);
    }

    #[test]
    fn test_parameterless_statement_serializes_without_parameters() {
        let json = serde_json::to_value(list_labels()).unwrap();
        assert!(json.get("parameters").is_none());

        let json = serde_json::to_value(some_instances("Topic", 5)).unwrap();
        assert_eq!(json["parameters"]["limit"], 5);
    }
}
