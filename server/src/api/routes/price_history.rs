//! Price history API endpoint
//!
//! Serves the aggregated price series for one product. Raw observations
//! never leave the store layer; the response is always bucketed averages.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::auth::RequesterContext;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::ApiError;
use crate::data::CatalogRepository;
use crate::domain::series::{AggregatedPricePoint, Granularity, Window, aggregate, parse_timestamp};

/// Shared state for Price History API endpoints
#[derive(Clone)]
pub struct PriceHistoryApiState {
    pub catalog: Arc<dyn CatalogRepository>,
}

/// Build Price History API routes
pub fn routes(catalog: Arc<dyn CatalogRepository>) -> Router<()> {
    let state = PriceHistoryApiState { catalog };

    Router::new()
        .route("/", get(get_price_series))
        .with_state(state)
}

/// Query parameters for GET /price-history
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PriceSeriesQuery {
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
    /// Inclusive window start (ISO-8601); defaults to 30 days before `to`
    pub from: Option<String>,
    /// Inclusive window end (ISO-8601); defaults to now
    pub to: Option<String>,
    /// `daily` or `hourly`; anything else falls back to `daily`
    pub granularity: Option<String>,
}

/// Aggregated price series response
#[derive(Debug, Serialize, ToSchema)]
pub struct PriceSeriesResponse {
    pub points: Vec<AggregatedPricePoint>,
}

/// Aggregated price series for a product
#[utoipa::path(
    get,
    path = "/api/v1/price-history",
    tag = "price-history",
    params(
        ("product_id" = String, Query, description = "Business product id"),
        ("from" = Option<String>, Query, description = "Inclusive window start (ISO-8601)"),
        ("to" = Option<String>, Query, description = "Inclusive window end (ISO-8601)"),
        ("granularity" = Option<String>, Query, description = "daily or hourly")
    ),
    responses(
        (status = 200, description = "Bucketed price averages", body = PriceSeriesResponse),
        (status = 400, description = "Unparseable from/to timestamp")
    )
)]
pub async fn get_price_series(
    State(state): State<PriceHistoryApiState>,
    _ctx: RequesterContext,
    ValidatedQuery(query): ValidatedQuery<PriceSeriesQuery>,
) -> Result<Json<PriceSeriesResponse>, ApiError> {
    let to = match &query.to {
        Some(raw) => parse_timestamp(raw).ok_or_else(|| {
            ApiError::bad_request("INVALID_TIMESTAMP", format!("Unparseable to: {raw}"))
        })?,
        None => chrono::Utc::now(),
    };
    let from = match &query.from {
        Some(raw) => parse_timestamp(raw).ok_or_else(|| {
            ApiError::bad_request("INVALID_TIMESTAMP", format!("Unparseable from: {raw}"))
        })?,
        None => to - chrono::Duration::days(crate::core::constants::DEFAULT_SERIES_WINDOW_DAYS),
    };
    let window = Window::new(from, to);

    let granularity = query
        .granularity
        .as_deref()
        .and_then(|raw| raw.parse::<Granularity>().ok())
        .unwrap_or_default();

    // Bound the store scan to the window; normalized RFC 3339 UTC strings
    // compare lexicographically in timestamp order.
    let from_bound = window.from.to_rfc3339_opts(SecondsFormat::Secs, true);
    let to_bound = window.to.to_rfc3339_opts(SecondsFormat::Secs, true);
    let observations = state
        .catalog
        .list_observations(&query.product_id, Some(&from_bound), Some(&to_bound))
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(PriceSeriesResponse {
        points: aggregate(&observations, &window, granularity),
    }))
}
