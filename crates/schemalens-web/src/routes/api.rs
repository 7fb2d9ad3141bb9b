//! JSON API over the concept cache.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use schemalens_core::snapshot::BuildStats;
use schemalens_core::{ConceptSummary, ConceptView, SchemaError};
use serde::Serialize;
use tracing::warn;

/// A [`SchemaError`] rendered as an HTTP response.
pub struct ApiError(SchemaError);

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            SchemaError::ConceptNotFound(_) => StatusCode::NOT_FOUND,
            SchemaError::LabelListing(_) => StatusCode::BAD_GATEWAY,
            SchemaError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ready: bool,
    pub backend: String,
    pub built_at: Option<DateTime<Utc>>,
    pub concept_count: usize,
}

/// Readiness of the cache.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.cache().snapshot();
    Json(HealthResponse {
        ready: snapshot.is_some(),
        backend: state.backend().to_string(),
        built_at: snapshot.as_ref().map(|s| s.stats().built_at),
        concept_count: snapshot.as_ref().map_or(0, |s| s.len()),
    })
}

/// All concepts, sorted by label.
pub async fn list_concepts(State(state): State<AppState>) -> Json<Vec<ConceptSummary>> {
    Json(state.cache().summaries())
}

/// One concept with hierarchy details.
pub async fn get_concept(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Json<ConceptView>, ApiError> {
    Ok(Json(state.view(&label)?))
}

/// Rebuild the snapshot from the store.
pub async fn rebuild(State(state): State<AppState>) -> Result<Json<BuildStats>, ApiError> {
    match state.rebuild().await {
        Ok(snapshot) => Ok(Json(snapshot.stats().clone())),
        Err(e) => {
            warn!(error = %e, "Rebuild request failed, keeping current snapshot");
            Err(e.into())
        }
    }
}
