//! HTTP client for the Neo4j transactional Cypher endpoint.

use crate::cypher::{self, Statement};
use async_trait::async_trait;
use reqwest::Client;
use schemalens_core::{Instance, InstanceRow, Property, QueryError, QueryResult, QueryService};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Connection settings for a Neo4j server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neo4jConfig {
    /// Server root, e.g. `http://localhost:7474`.
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Path of the commit endpoint below `url`.
    #[serde(default = "default_transaction_path")]
    pub transaction_path: String,
    /// HTTP timeout per request, in seconds. Must cover the whole-graph
    /// label-set scan; per-query deadlines are set by the build.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Label of the nodes whose references rank top instances.
    #[serde(default = "default_content_label")]
    pub content_label: String,
    /// Epoch-seconds publication property on content nodes.
    #[serde(default = "default_published_property")]
    pub published_property: String,
}

fn default_url() -> String { "http://localhost:7474".to_string() }
fn default_transaction_path() -> String { "/db/data/transaction/commit".to_string() }
fn default_timeout_secs() -> u64 { 600 }
fn default_content_label() -> String { "Content".to_string() }
fn default_published_property() -> String { "publishedDateEpoch".to_string() }

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            username: None,
            password: None,
            transaction_path: default_transaction_path(),
            timeout_secs: default_timeout_secs(),
            content_label: default_content_label(),
            published_property: default_published_property(),
        }
    }
}

impl Neo4jConfig {
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            self.transaction_path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Serialize)]
struct TransactionRequest<'a> {
    statements: &'a [Statement],
}

#[derive(Debug, Deserialize)]
struct TransactionResponse {
    #[serde(default)]
    results: Vec<StatementResult>,
    #[serde(default)]
    errors: Vec<Neo4jError>,
}

#[derive(Debug, Deserialize)]
struct StatementResult {
    #[serde(default)]
    data: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
struct ResultRow {
    row: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Neo4jError {
    code: String,
    message: String,
}

/// Decode the rows of the first statement result into `T`.
///
/// Each row is read as a JSON array, so `T` is usually a tuple matching the
/// statement's `RETURN` columns.
fn decode_rows<T: DeserializeOwned>(response: TransactionResponse) -> QueryResult<Vec<T>> {
    if let Some(error) = response.errors.into_iter().next() {
        return Err(QueryError::Api {
            code: error.code,
            message: error.message,
        });
    }

    let result = response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| QueryError::decode("response has no statement result"))?;

    result
        .data
        .into_iter()
        .map(|row| {
            serde_json::from_value(Value::Array(row.row))
                .map_err(|e| QueryError::decode(e.to_string()))
        })
        .collect()
}

fn parse_response(body: &str) -> QueryResult<TransactionResponse> {
    serde_json::from_str(body).map_err(|e| QueryError::decode(e.to_string()))
}

/// Query service backed by a Neo4j server.
///
/// # Example
///
/// ```rust,ignore
/// use schemalens_neo4j::{Neo4jConfig, Neo4jQueryService};
/// use schemalens_core::QueryService;
///
/// let service = Neo4jQueryService::new(Neo4jConfig {
///     url: "http://localhost:7474".into(),
///     username: Some("neo4j".into()),
///     password: Some("secret".into()),
///     ..Neo4jConfig::default()
/// })?;
/// let labels = service.list_labels().await?;
/// ```
pub struct Neo4jQueryService {
    client: Client,
    endpoint: String,
    config: Neo4jConfig,
}

impl Neo4jQueryService {
    pub fn new(config: Neo4jConfig) -> QueryResult<Self> {
        if config.timeout_secs == 0 {
            return Err(QueryError::transport("Neo4j timeout_secs must be positive"));
        }
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| QueryError::transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint(),
            config,
        })
    }

    pub fn config(&self) -> &Neo4jConfig {
        &self.config
    }

    /// Run one statement and decode its rows.
    async fn run<T: DeserializeOwned>(&self, statement: Statement) -> QueryResult<Vec<T>> {
        debug!(statement = %statement.statement, "Running Cypher statement");

        let mut request = self.client.post(&self.endpoint).json(&TransactionRequest {
            statements: std::slice::from_ref(&statement),
        });
        if let Some(ref username) = self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                QueryError::Timeout(self.config.timeout())
            } else {
                QueryError::transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| QueryError::transport(e.to_string()))?;
        if !status.is_success() {
            return Err(QueryError::Api {
                code: status.as_str().to_string(),
                message: body,
            });
        }

        decode_rows(parse_response(&body)?)
    }

    /// Run a statement returning a single column.
    async fn column<T: DeserializeOwned>(&self, statement: Statement) -> QueryResult<Vec<T>> {
        let rows: Vec<(T,)> = self.run(statement).await?;
        Ok(rows.into_iter().map(|(value,)| value).collect())
    }
}

#[async_trait]
impl QueryService for Neo4jQueryService {
    fn name(&self) -> &str {
        "neo4j"
    }

    async fn list_labels(&self) -> QueryResult<Vec<String>> {
        self.column(cypher::list_labels()).await
    }

    async fn count_nodes(&self, label: &str) -> QueryResult<u64> {
        self.column(cypher::count_nodes(label))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| QueryError::decode("count returned no rows"))
    }

    async fn top_instances(
        &self,
        label: &str,
        since_epoch: i64,
        limit: usize,
    ) -> QueryResult<Vec<InstanceRow>> {
        let rows: Vec<(Option<String>, Vec<String>, u64)> = self
            .run(cypher::top_instances(
                label,
                &self.config.content_label,
                &self.config.published_property,
                since_epoch,
                limit,
            ))
            .await?;

        Ok(rows
            .into_iter()
            .map(|(display_label, types, times_used)| InstanceRow {
                display_label: display_label.unwrap_or_default(),
                types,
                times_used,
            })
            .collect())
    }

    async fn some_instances(&self, label: &str, limit: usize) -> QueryResult<Vec<Instance>> {
        let rows: Vec<(Option<String>, Vec<String>)> =
            self.run(cypher::some_instances(label, limit)).await?;

        Ok(rows
            .into_iter()
            .map(|(display_label, types)| Instance::new(display_label.unwrap_or_default(), types))
            .collect())
    }

    async fn property_usage(&self, label: &str) -> QueryResult<Vec<Property>> {
        let rows: Vec<(String, u64)> = self.run(cypher::property_usage(label)).await?;
        Ok(rows
            .into_iter()
            .map(|(relationship_type, count)| Property::new(relationship_type, count))
            .collect())
    }

    async fn distinct_label_sets(&self) -> QueryResult<Vec<Vec<String>>> {
        self.column(cypher::distinct_label_sets()).await
    }
}
