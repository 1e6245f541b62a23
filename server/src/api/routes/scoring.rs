//! Scoring passthrough API endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::auth::RequesterContext;
use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::domain::scoring::ScoringService;

/// Shared state for Scoring API endpoints
#[derive(Clone)]
pub struct ScoringApiState {
    pub scoring: Arc<ScoringService>,
}

/// Build Scoring API routes
pub fn routes(scoring: Arc<ScoringService>) -> Router<()> {
    let state = ScoringApiState { scoring };

    Router::new()
        .route("/run", post(run_model))
        .with_state(state)
}

/// Request body for POST /scoring/run
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RunModelRequest {
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
}

/// Trigger a model run for a product.
///
/// The upstream JSON body is returned as-is. Model runs are slow; a
/// client-side timeout maps to 504 because the run may still complete
/// upstream.
#[utoipa::path(
    post,
    path = "/api/v1/scoring/run",
    tag = "scoring",
    request_body = RunModelRequest,
    responses(
        (status = 200, description = "Upstream scoring result"),
        (status = 500, description = "Scoring service failed"),
        (status = 504, description = "Scoring run timed out; it may still complete")
    )
)]
pub async fn run_model(
    State(state): State<ScoringApiState>,
    _ctx: RequesterContext,
    ValidatedJson(body): ValidatedJson<RunModelRequest>,
) -> Result<Json<JsonValue>, ApiError> {
    let result = state
        .scoring
        .run_model(body.product_id.trim())
        .await
        .map_err(ApiError::from_scoring)?;

    Ok(Json(result))
}
