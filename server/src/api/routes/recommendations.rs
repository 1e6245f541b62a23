//! Recommendation API endpoints
//!
//! Listing reads the store; accept/reject decisions are forwarded to the
//! scoring service fire-and-forget and never mutate the stored row.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::auth::RequesterContext;
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::routes::dashboard::types::RecommendationDto;
use crate::api::types::{ApiError, clamp_recommendation_limit};
use crate::core::constants::DEFAULT_RECOMMENDATION_LIMIT;
use crate::data::CatalogRepository;
use crate::domain::scoring::{RecommendationAction, ScoringService};

/// Shared state for Recommendations API endpoints
#[derive(Clone)]
pub struct RecommendationsApiState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub scoring: Arc<ScoringService>,
}

/// Build Recommendations API routes
pub fn routes(catalog: Arc<dyn CatalogRepository>, scoring: Arc<ScoringService>) -> Router<()> {
    let state = RecommendationsApiState { catalog, scoring };

    Router::new()
        .route("/", get(list_recommendations))
        .route("/{id}", post(decide_recommendation))
        .with_state(state)
}

/// Query parameters for GET /recommendations
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListRecommendationsQuery {
    /// Result cap, clamped to [1, 100]
    pub limit: Option<u32>,
}

/// Recommendation listing response
#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationListResponse {
    pub items: Vec<RecommendationDto>,
}

/// Request body for a recommendation decision
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecommendationDecisionRequest {
    /// `accept` or `reject`
    #[validate(length(min = 1, message = "action must not be empty"))]
    pub action: String,
}

/// Acknowledgement of a dispatched decision
#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationDecisionResponse {
    pub id: String,
    pub action: String,
    pub dispatched: bool,
}

/// List recommendations ordered by confidence
#[utoipa::path(
    get,
    path = "/api/v1/recommendations",
    tag = "recommendations",
    params(("limit" = Option<u32>, Query, description = "Result cap, clamped to [1, 100]")),
    responses(
        (status = 200, description = "Recommendations, highest confidence first", body = RecommendationListResponse)
    )
)]
pub async fn list_recommendations(
    State(state): State<RecommendationsApiState>,
    _ctx: RequesterContext,
    ValidatedQuery(query): ValidatedQuery<ListRecommendationsQuery>,
) -> Result<Json<RecommendationListResponse>, ApiError> {
    let limit = clamp_recommendation_limit(query.limit.unwrap_or(DEFAULT_RECOMMENDATION_LIMIT));

    let rows = state
        .catalog
        .list_recommendations(limit)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(RecommendationListResponse {
        items: rows.into_iter().map(RecommendationDto::from).collect(),
    }))
}

/// Accept or reject a recommendation
#[utoipa::path(
    post,
    path = "/api/v1/recommendations/{id}",
    tag = "recommendations",
    params(("id" = String, Path, description = "Recommendation id")),
    request_body = RecommendationDecisionRequest,
    responses(
        (status = 200, description = "Decision dispatched to the scoring service", body = RecommendationDecisionResponse),
        (status = 400, description = "Unknown action"),
        (status = 404, description = "Recommendation not found")
    )
)]
pub async fn decide_recommendation(
    State(state): State<RecommendationsApiState>,
    _ctx: RequesterContext,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<RecommendationDecisionRequest>,
) -> Result<Json<RecommendationDecisionResponse>, ApiError> {
    let action = RecommendationAction::parse(&body.action).ok_or_else(|| {
        ApiError::bad_request(
            "INVALID_ACTION",
            format!("Unknown action: {} (expected accept or reject)", body.action),
        )
    })?;

    state
        .catalog
        .get_recommendation(&id)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| {
            ApiError::not_found("RECOMMENDATION_NOT_FOUND", "Recommendation not found")
        })?;

    // Fire-and-forget; the scoring client logs delivery failures
    let scoring = state.scoring.clone();
    let notify_id = id.clone();
    tokio::spawn(async move {
        scoring.notify_recommendation(&notify_id, action).await;
    });

    Ok(Json(RecommendationDecisionResponse {
        id,
        action: action.as_str().to_string(),
        dispatched: true,
    }))
}
