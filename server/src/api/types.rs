//! Common API types and error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::core::constants::{
    DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_EVENT_PAGE_SIZE, MAX_PER_PAGE, MAX_RECOMMENDATION_LIMIT,
    MAX_USER_LIMIT,
};
use crate::data::DataError;
use crate::domain::scoring::ScoringError;

/// API error with HTTP status mapping.
///
/// Every variant carries a stable machine-readable `code` and a human
/// message; the response body is always `{error, code, message}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    Unauthorized { code: String, message: String },
    Forbidden { code: String, message: String },
    NotFound { code: String, message: String },
    Conflict { code: String, message: String },
    Internal { code: String, message: String },
    GatewayTimeout { code: String, message: String },
}

impl ApiError {
    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn unauthorized(code: &str, message: impl Into<String>) -> Self {
        Self::Unauthorized {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn forbidden(code: &str, message: impl Into<String>) -> Self {
        Self::Forbidden {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(code: &str, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn conflict(code: &str, message: impl Into<String>) -> Self {
        Self::Conflict {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn internal(code: &str, message: impl Into<String>) -> Self {
        Self::Internal {
            code: code.to_string(),
            message: message.into(),
        }
    }

    pub fn gateway_timeout(code: &str, message: impl Into<String>) -> Self {
        Self::GatewayTimeout {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Convert a store error to a sanitized API error.
    ///
    /// The full error is logged here; the client only sees a generic
    /// message. Conflicts map to 409 with the constraint message.
    pub fn from_data(e: DataError) -> Self {
        match e {
            DataError::Conflict(msg) => Self::conflict("CONFLICT", msg),
            e => {
                tracing::error!(error = %e, "Store operation failed");
                Self::internal("DATABASE_ERROR", "Database operation failed")
            }
        }
    }

    /// Convert a scoring client error. Timeouts become 504 because the
    /// remote run may still complete; everything else is a sanitized 500.
    pub fn from_scoring(e: ScoringError) -> Self {
        match e {
            ScoringError::Timeout { timeout_secs } => Self::gateway_timeout(
                "SCORING_TIMEOUT",
                format!(
                    "Scoring run timed out after {timeout_secs}s; the run may still complete"
                ),
            ),
            e => {
                tracing::error!(error = %e, "Scoring request failed");
                Self::internal("SCORING_ERROR", "Scoring service request failed")
            }
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, &str, &str) {
        match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::Unauthorized { code, message } => {
                (StatusCode::UNAUTHORIZED, "unauthorized", code, message)
            }
            Self::Forbidden { code, message } => {
                (StatusCode::FORBIDDEN, "forbidden", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Conflict { code, message } => (StatusCode::CONFLICT, "conflict", code, message),
            Self::Internal { code, message } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", code, message)
            }
            Self::GatewayTimeout { code, message } => (
                StatusCode::GATEWAY_TIMEOUT,
                "gateway_timeout",
                code,
                message,
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, code, message) = self.parts();
        (
            status,
            Json(serde_json::json!({
                "error": error,
                "code": code,
                "message": message,
            })),
        )
            .into_response()
    }
}

// ============================================================================
// Pagination clamps
// ============================================================================

/// Clamp product listing pagination: page >= 1, per_page in [1, 1000]
pub fn clamp_page(page: Option<u32>, per_page: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(DEFAULT_PAGE).max(1);
    let per_page = per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
    (page, per_page)
}

/// Clamp an event page size to [1, 100]
pub fn clamp_event_page_size(page_size: u32) -> u32 {
    page_size.clamp(1, MAX_EVENT_PAGE_SIZE)
}

/// Clamp a user listing limit to [1, 500]
pub fn clamp_user_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_USER_LIMIT)
}

/// Clamp a recommendation listing limit to [1, 100]
pub fn clamp_recommendation_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_RECOMMENDATION_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_defaults() {
        assert_eq!(clamp_page(None, None), (1, 25));
        assert_eq!(clamp_page(Some(0), Some(0)), (1, 1));
        assert_eq!(clamp_page(Some(3), Some(5000)), (3, 1000));
    }

    #[test]
    fn test_clamp_limits() {
        assert_eq!(clamp_user_limit(0), 1);
        assert_eq!(clamp_user_limit(9999), 500);
        assert_eq!(clamp_event_page_size(500), 100);
        assert_eq!(clamp_recommendation_limit(50), 50);
    }

    #[test]
    fn test_from_data_conflict_maps_to_409() {
        let err = ApiError::from_data(DataError::Conflict("duplicate".into()));
        assert!(matches!(err, ApiError::Conflict { .. }));
    }

    #[test]
    fn test_from_scoring_timeout_maps_to_504() {
        let err = ApiError::from_scoring(ScoringError::Timeout { timeout_secs: 300 });
        match err {
            ApiError::GatewayTimeout { message, .. } => {
                assert!(message.contains("may still complete"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
