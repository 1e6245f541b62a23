//! Dashboard API endpoints
//!
//! The dashboard payload bundles the recent-event feed, KPI counts, the
//! default 30-day daily price series, and the top recommendations in one
//! round trip.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::SecondsFormat;

use crate::api::auth::RequesterContext;
use crate::api::extractors::ValidatedQuery;
use crate::api::types::{ApiError, clamp_event_page_size};
use crate::core::constants::{DEFAULT_EVENT_PAGE_SIZE, DEFAULT_RECOMMENDATION_LIMIT};
use crate::data::CatalogRepository;
use crate::data::types::KpiCounts;
use crate::domain::series::{Granularity, Window, aggregate};

use types::{
    CreatePriceEventRequest, DashboardQuery, DashboardResponse, EventListResponse, KpiDto,
    PriceEventDto, RecommendationDto,
};

/// Shared state for Dashboard API endpoints
#[derive(Clone)]
pub struct DashboardApiState {
    pub catalog: Arc<dyn CatalogRepository>,
}

/// Build Dashboard API routes
pub fn routes(catalog: Arc<dyn CatalogRepository>) -> Router<()> {
    let state = DashboardApiState { catalog };

    Router::new()
        .route("/", get(get_dashboard))
        .route("/events", post(insert_price_event))
        .with_state(state)
}

/// Ingest a price event into the dashboard feed
#[utoipa::path(
    post,
    path = "/api/v1/dashboard/events",
    tag = "dashboard",
    request_body = CreatePriceEventRequest,
    responses(
        (status = 201, description = "Stored event with assigned id", body = PriceEventDto),
        (status = 400, description = "Missing or invalid field")
    )
)]
pub async fn insert_price_event(
    State(state): State<DashboardApiState>,
    _ctx: RequesterContext,
    Json(body): Json<CreatePriceEventRequest>,
) -> Result<(StatusCode, Json<PriceEventDto>), ApiError> {
    let event = body
        .normalize()
        .map_err(|reason| ApiError::bad_request("INVALID_EVENT", reason))?;

    let row = state
        .catalog
        .insert_event(&event)
        .await
        .map_err(ApiError::from_data)?;

    Ok((StatusCode::CREATED, Json(PriceEventDto::from(row))))
}

/// Full dashboard payload
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "dashboard",
    params(
        ("page" = Option<u32>, Query, description = "Event feed page (1-based)"),
        ("page_size" = Option<u32>, Query, description = "Event feed page size, clamped to [1, 100]")
    ),
    responses(
        (status = 200, description = "Events, KPIs, price series, and recommendations", body = DashboardResponse)
    )
)]
pub async fn get_dashboard(
    State(state): State<DashboardApiState>,
    _ctx: RequesterContext,
    ValidatedQuery(query): ValidatedQuery<DashboardQuery>,
) -> Result<Json<DashboardResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = clamp_event_page_size(query.page_size.unwrap_or(DEFAULT_EVENT_PAGE_SIZE));

    let (events, total) = state
        .catalog
        .list_events(page, page_size)
        .await
        .map_err(ApiError::from_data)?;

    let kpis = KpiCounts {
        products: state
            .catalog
            .count_products()
            .await
            .map_err(ApiError::from_data)?,
        competitors: state
            .catalog
            .count_distinct_competitors()
            .await
            .map_err(ApiError::from_data)?,
        recommendations: state
            .catalog
            .count_recommendations()
            .await
            .map_err(ApiError::from_data)?,
    };

    let window = Window::default_trailing();
    let from = window.from.to_rfc3339_opts(SecondsFormat::Secs, true);
    let observations = state
        .catalog
        .list_recent_observations(&from)
        .await
        .map_err(ApiError::from_data)?;
    let series = aggregate(&observations, &window, Granularity::Daily);

    let recommendations = state
        .catalog
        .list_recommendations(DEFAULT_RECOMMENDATION_LIMIT)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(DashboardResponse {
        events: EventListResponse {
            items: events.into_iter().map(PriceEventDto::from).collect(),
            total,
        },
        kpis: KpiDto::from(kpis),
        series,
        recommendations: recommendations
            .into_iter()
            .map(RecommendationDto::from)
            .collect(),
    }))
}
