//! Requester identity extraction
//!
//! Identity arrives pre-authenticated from the front proxy as
//! `x-user-*` headers. The extractor resolves them once per request;
//! handlers receive the context by value and nothing reads ambient
//! request state past this boundary.

use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::extract::FromRequestParts;

use crate::api::types::ApiError;
use crate::data::types::Role;

pub const HEADER_UID: &str = "x-user-uid";
pub const HEADER_ROLE: &str = "x-user-role";
pub const HEADER_DOMAIN: &str = "x-user-domain";
pub const HEADER_EMAIL: &str = "x-user-email";

/// Authenticated requester identity for the current request
#[derive(Debug, Clone)]
pub struct RequesterContext {
    pub uid: String,
    pub role: Role,
    pub domain: Option<String>,
    pub email: Option<String>,
}

impl RequesterContext {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let uid = required_header(headers, HEADER_UID)?;
        let role_raw = required_header(headers, HEADER_ROLE)?;
        let role: Role = role_raw.parse().map_err(|()| {
            ApiError::unauthorized("UNKNOWN_ROLE", format!("Unknown role: {role_raw}"))
        })?;

        Ok(Self {
            uid,
            role,
            domain: optional_header(headers, HEADER_DOMAIN),
            email: optional_header(headers, HEADER_EMAIL),
        })
    }

    /// Admin or superadmin required for the user-management routes
    pub fn require_admin_tier(&self) -> Result<(), ApiError> {
        if self.role.is_admin_tier() {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "ADMIN_REQUIRED",
                "Admin privileges required",
            ))
        }
    }

    pub fn require_superadmin(&self) -> Result<(), ApiError> {
        if self.role == Role::Superadmin {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "SUPERADMIN_REQUIRED",
                "Superadmin privileges required",
            ))
        }
    }

    /// Whether the requester may touch records in `target` domain.
    ///
    /// Superadmins are unscoped; admins are restricted to their own domain.
    pub fn can_manage_domain(&self, target: Option<&str>) -> bool {
        match self.role {
            Role::Superadmin => true,
            Role::Admin => self.domain.as_deref() == target,
            _ => false,
        }
    }
}

impl<S> FromRequestParts<S> for RequesterContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}

fn required_header(headers: &HeaderMap, name: &str) -> Result<String, ApiError> {
    optional_header(headers, name).ok_or_else(|| {
        ApiError::unauthorized("MISSING_IDENTITY", format!("Missing {name} header"))
    })
}

fn optional_header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
