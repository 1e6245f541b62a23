//! Organization API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::OrganizationRow;

/// Organization DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationDto {
    pub domain: String,
    pub admin_uid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<OrganizationRow> for OrganizationDto {
    fn from(row: OrganizationRow) -> Self {
        Self {
            domain: row.domain,
            admin_uid: row.admin_uid,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
            updated_at: DateTime::from_timestamp(row.updated_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Organization listing response
#[derive(Debug, Serialize, ToSchema)]
pub struct OrganizationListResponse {
    pub items: Vec<OrganizationDto>,
}

/// Request body for PUT /admin/organizations (bind an admin to a domain)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertOrganizationRequest {
    #[validate(length(min = 1, message = "domain must not be empty"))]
    pub domain: String,
    #[validate(length(min = 1, message = "admin_uid must not be empty"))]
    pub admin_uid: String,
}
