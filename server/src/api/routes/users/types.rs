//! Admin user API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::{Role, UserRow};

/// User DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: String,
    pub domain: Option<String>,
    pub employee_number: Option<String>,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for UserDto {
    fn from(row: UserRow) -> Self {
        Self {
            uid: row.uid,
            email: row.email,
            name: row.name,
            role: row.role.to_string(),
            domain: row.domain,
            employee_number: row.employee_number,
            disabled: row.disabled,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// User listing response
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub items: Vec<UserDto>,
}

/// Query parameters for GET /admin/users
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListUsersQuery {
    /// Free-text match against email, name, employee number, and domain
    #[validate(length(max = 200, message = "q must be at most 200 characters"))]
    pub q: Option<String>,
    /// Superadmin-only explicit domain filter
    pub domain: Option<String>,
    pub limit: Option<u32>,
}

/// Request body for POST /admin/users (create or upsert)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpsertUserRequest {
    #[validate(length(min = 1, message = "uid must not be empty"))]
    pub uid: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    pub name: Option<String>,
    /// Defaults to `user` when omitted
    pub role: Option<String>,
    pub domain: Option<String>,
    pub employee_number: Option<String>,
    #[serde(default)]
    pub disabled: bool,
}

/// Request body for PUT /admin/users (partial update by uid)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "uid must not be empty"))]
    pub uid: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub domain: Option<String>,
    pub employee_number: Option<String>,
    pub disabled: Option<bool>,
}

/// Query parameters for DELETE /admin/users
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteUserQuery {
    #[validate(length(min = 1, message = "uid must not be empty"))]
    pub uid: String,
}

/// Parse a role field, rejecting unknown strings
pub fn parse_role(raw: &str) -> Result<Role, String> {
    raw.parse().map_err(|()| format!("Unknown role: {raw}"))
}
