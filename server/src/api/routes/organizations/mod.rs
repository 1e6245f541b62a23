//! Organization API endpoints (superadmin only)

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::RequesterContext;
use crate::api::extractors::ValidatedJson;
use crate::api::types::ApiError;
use crate::data::DirectoryRepository;

use types::{OrganizationDto, OrganizationListResponse, UpsertOrganizationRequest};

/// Shared state for Organizations API endpoints
#[derive(Clone)]
pub struct OrganizationsApiState {
    pub directory: Arc<dyn DirectoryRepository>,
}

/// Build Organizations API routes
pub fn routes(directory: Arc<dyn DirectoryRepository>) -> Router<()> {
    let state = OrganizationsApiState { directory };

    Router::new()
        .route("/", get(list_organizations).put(upsert_organization))
        .with_state(state)
}

/// List organizations
#[utoipa::path(
    get,
    path = "/api/v1/admin/organizations",
    tag = "admin",
    responses(
        (status = 200, description = "All organizations", body = OrganizationListResponse),
        (status = 403, description = "Requester is not a superadmin")
    )
)]
pub async fn list_organizations(
    State(state): State<OrganizationsApiState>,
    ctx: RequesterContext,
) -> Result<Json<OrganizationListResponse>, ApiError> {
    ctx.require_superadmin()?;

    let rows = state
        .directory
        .list_organizations()
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(OrganizationListResponse {
        items: rows.into_iter().map(OrganizationDto::from).collect(),
    }))
}

/// Bind an admin to a domain, creating the organization if needed.
///
/// Rebinding an existing domain preserves its `created_at`.
#[utoipa::path(
    put,
    path = "/api/v1/admin/organizations",
    tag = "admin",
    request_body = UpsertOrganizationRequest,
    responses(
        (status = 200, description = "Stored organization", body = OrganizationDto),
        (status = 403, description = "Requester is not a superadmin")
    )
)]
pub async fn upsert_organization(
    State(state): State<OrganizationsApiState>,
    ctx: RequesterContext,
    ValidatedJson(body): ValidatedJson<UpsertOrganizationRequest>,
) -> Result<Json<OrganizationDto>, ApiError> {
    ctx.require_superadmin()?;

    let row = state
        .directory
        .upsert_organization(body.domain.trim(), body.admin_uid.trim())
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(OrganizationDto::from(row)))
}
