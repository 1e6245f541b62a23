//! Admin user API endpoints
//!
//! All routes require an admin-tier requester. Admins are scoped to their
//! own domain: listings are filtered to it, created records are forced
//! onto it, and touching a user in another domain is forbidden. Setting
//! the `domain` field on an update is superadmin-only, regardless of the
//! value supplied.

pub mod types;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::auth::RequesterContext;
use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::types::{ApiError, clamp_user_limit};
use crate::core::constants::DEFAULT_USER_LIMIT;
use crate::data::DirectoryRepository;
use crate::data::types::{ListUsersParams, NewUser, Role, UserPatch, UserRow};

use types::{
    DeleteUserQuery, ListUsersQuery, UpdateUserRequest, UpsertUserRequest, UserDto,
    UserListResponse, parse_role,
};

/// Shared state for Users API endpoints
#[derive(Clone)]
pub struct UsersApiState {
    pub directory: Arc<dyn DirectoryRepository>,
}

/// Build Users API routes
pub fn routes(directory: Arc<dyn DirectoryRepository>) -> Router<()> {
    let state = UsersApiState { directory };

    Router::new()
        .route(
            "/",
            get(list_users)
                .post(create_user)
                .put(update_user)
                .delete(delete_user),
        )
        .with_state(state)
}

/// Resolve the domain scope for an admin-tier requester.
///
/// Superadmins may pass any explicit filter (or none); admins always get
/// their own domain regardless of what they asked for.
fn scoped_domain(
    ctx: &RequesterContext,
    requested: Option<String>,
) -> Result<Option<String>, ApiError> {
    if ctx.role == Role::Superadmin {
        return Ok(requested);
    }
    match &ctx.domain {
        Some(domain) => Ok(Some(domain.clone())),
        None => Err(ApiError::forbidden(
            "ADMIN_DOMAIN_REQUIRED",
            "Admin account has no domain assigned",
        )),
    }
}

/// List directory users
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    tag = "admin",
    params(
        ("q" = Option<String>, Query, description = "Free-text search"),
        ("domain" = Option<String>, Query, description = "Domain filter (superadmin only)"),
        ("limit" = Option<u32>, Query, description = "Result cap, clamped to [1, 500]")
    ),
    responses(
        (status = 200, description = "Matching users", body = UserListResponse),
        (status = 401, description = "Missing or invalid identity headers"),
        (status = 403, description = "Requester is not admin-tier")
    )
)]
pub async fn list_users(
    State(state): State<UsersApiState>,
    ctx: RequesterContext,
    ValidatedQuery(query): ValidatedQuery<ListUsersQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    ctx.require_admin_tier()?;

    let params = ListUsersParams {
        q: query.q.clone(),
        domain: scoped_domain(&ctx, query.domain.clone())?,
        limit: clamp_user_limit(query.limit.unwrap_or(DEFAULT_USER_LIMIT)),
    };

    let rows = state
        .directory
        .list_users(&params)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(UserListResponse {
        items: rows.into_iter().map(UserDto::from).collect(),
    }))
}

/// Create or upsert a directory user
#[utoipa::path(
    post,
    path = "/api/v1/admin/users",
    tag = "admin",
    request_body = UpsertUserRequest,
    responses(
        (status = 201, description = "User stored", body = UserDto),
        (status = 400, description = "Invalid role or field"),
        (status = 403, description = "Requester is not admin-tier")
    )
)]
pub async fn create_user(
    State(state): State<UsersApiState>,
    ctx: RequesterContext,
    ValidatedJson(body): ValidatedJson<UpsertUserRequest>,
) -> Result<(StatusCode, Json<UserDto>), ApiError> {
    ctx.require_admin_tier()?;

    let role = match &body.role {
        Some(raw) => parse_role(raw).map_err(|msg| ApiError::bad_request("INVALID_ROLE", msg))?,
        None => Role::User,
    };

    // Admins cannot plant users outside their own domain
    let domain = scoped_domain(&ctx, body.domain.clone())?;

    let user = NewUser {
        uid: body.uid.clone(),
        email: Some(body.email.clone()),
        name: body.name.clone(),
        role,
        domain,
        employee_number: body.employee_number.clone(),
        disabled: body.disabled,
    };

    let row = state
        .directory
        .upsert_user(&user)
        .await
        .map_err(ApiError::from_data)?;

    Ok((StatusCode::CREATED, Json(UserDto::from(row))))
}

/// Partially update a directory user
#[utoipa::path(
    put,
    path = "/api/v1/admin/users",
    tag = "admin",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user (no-op for an empty field set)", body = UserDto),
        (status = 403, description = "Out-of-domain target, or domain field set by non-superadmin"),
        (status = 404, description = "Target user not found")
    )
)]
pub async fn update_user(
    State(state): State<UsersApiState>,
    ctx: RequesterContext,
    ValidatedJson(body): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<UserDto>, ApiError> {
    ctx.require_admin_tier()?;

    fetch_target(&state, &ctx, &body.uid).await?;

    let role = match &body.role {
        Some(raw) => Some(parse_role(raw).map_err(|msg| ApiError::bad_request("INVALID_ROLE", msg))?),
        None => None,
    };

    // Supplying the domain field at all is a superadmin operation, even
    // when the value matches the target's current domain
    if body.domain.is_some() && ctx.role != Role::Superadmin {
        return Err(ApiError::forbidden(
            "DOMAIN_CHANGE_FORBIDDEN",
            "Only superadmins may set a user's domain",
        ));
    }

    let patch = UserPatch {
        email: body.email.clone(),
        name: body.name.clone(),
        role,
        domain: body.domain.clone(),
        employee_number: body.employee_number.clone(),
        disabled: body.disabled,
    };

    // Empty field set is a no-op success; the repository returns the
    // current row unchanged.
    let row = state
        .directory
        .update_user(&body.uid, &patch)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::not_found("USER_NOT_FOUND", "User not found"))?;

    Ok(Json(UserDto::from(row)))
}

/// Delete a directory user
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users",
    tag = "admin",
    params(("uid" = String, Query, description = "Target user id")),
    responses(
        (status = 200, description = "Deleted user", body = UserDto),
        (status = 403, description = "Out-of-domain target"),
        (status = 404, description = "Target user not found")
    )
)]
pub async fn delete_user(
    State(state): State<UsersApiState>,
    ctx: RequesterContext,
    ValidatedQuery(query): ValidatedQuery<DeleteUserQuery>,
) -> Result<Json<UserDto>, ApiError> {
    ctx.require_admin_tier()?;

    let target = fetch_target(&state, &ctx, &query.uid).await?;

    state
        .directory
        .delete_user(&query.uid)
        .await
        .map_err(ApiError::from_data)?;

    Ok(Json(UserDto::from(target)))
}

/// Fetch the target user and enforce domain scoping
async fn fetch_target(
    state: &UsersApiState,
    ctx: &RequesterContext,
    uid: &str,
) -> Result<UserRow, ApiError> {
    let target = state
        .directory
        .get_user(uid)
        .await
        .map_err(ApiError::from_data)?
        .ok_or_else(|| ApiError::not_found("USER_NOT_FOUND", "User not found"))?;

    if !ctx.can_manage_domain(target.domain.as_deref()) {
        return Err(ApiError::forbidden(
            "DOMAIN_SCOPE",
            "Target user belongs to another domain",
        ));
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SqliteRepository;
    use sqlx::SqlitePool;

    async fn setup_state() -> UsersApiState {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        UsersApiState {
            directory: Arc::new(SqliteRepository::new(pool)),
        }
    }

    fn requester(role: Role, domain: Option<&str>) -> RequesterContext {
        RequesterContext {
            uid: "requester".to_string(),
            role,
            domain: domain.map(String::from),
            email: None,
        }
    }

    async fn seed(state: &UsersApiState, uid: &str, domain: &str) {
        state
            .directory
            .upsert_user(&NewUser {
                uid: uid.to_string(),
                email: Some(format!("{uid}@{domain}")),
                name: Some("Test User".to_string()),
                role: Role::User,
                domain: Some(domain.to_string()),
                employee_number: None,
                disabled: false,
            })
            .await
            .unwrap();
    }

    fn empty_update(uid: &str) -> UpdateUserRequest {
        UpdateUserRequest {
            uid: uid.to_string(),
            email: None,
            name: None,
            role: None,
            domain: None,
            employee_number: None,
            disabled: None,
        }
    }

    #[tokio::test]
    async fn test_list_users_admin_forced_to_own_domain() {
        let state = setup_state().await;
        seed(&state, "u1", "acme.com").await;
        seed(&state, "u2", "other.com").await;

        // An admin asking for another domain still only sees their own
        let query = ListUsersQuery {
            q: None,
            domain: Some("other.com".to_string()),
            limit: None,
        };
        let response = list_users(
            State(state),
            requester(Role::Admin, Some("acme.com")),
            ValidatedQuery(query),
        )
        .await
        .unwrap();

        assert_eq!(response.0.items.len(), 1);
        assert_eq!(response.0.items[0].uid, "u1");
    }

    #[tokio::test]
    async fn test_update_user_out_of_domain_forbidden() {
        let state = setup_state().await;
        seed(&state, "u2", "other.com").await;

        let mut body = empty_update("u2");
        body.name = Some("Hijacked".to_string());
        let result = update_user(
            State(state.clone()),
            requester(Role::Admin, Some("acme.com")),
            ValidatedJson(body),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden { .. })));

        let unchanged = state.directory.get_user("u2").await.unwrap().unwrap();
        assert_eq!(unchanged.name.as_deref(), Some("Test User"));
    }

    #[tokio::test]
    async fn test_update_user_domain_field_forbidden_for_admin() {
        let state = setup_state().await;
        seed(&state, "u1", "acme.com").await;

        // Same-value domain still counts as setting the field
        let mut body = empty_update("u1");
        body.domain = Some("acme.com".to_string());
        body.name = Some("Hijacked".to_string());
        let result = update_user(
            State(state.clone()),
            requester(Role::Admin, Some("acme.com")),
            ValidatedJson(body),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden { .. })));

        let unchanged = state.directory.get_user("u1").await.unwrap().unwrap();
        assert_eq!(unchanged.name.as_deref(), Some("Test User"));
        assert_eq!(unchanged.domain.as_deref(), Some("acme.com"));
    }

    #[tokio::test]
    async fn test_update_user_superadmin_reassigns_domain() {
        let state = setup_state().await;
        seed(&state, "u1", "acme.com").await;

        let mut body = empty_update("u1");
        body.domain = Some("other.com".to_string());
        let response = update_user(
            State(state),
            requester(Role::Superadmin, None),
            ValidatedJson(body),
        )
        .await
        .unwrap();
        assert_eq!(response.0.domain.as_deref(), Some("other.com"));
    }

    #[tokio::test]
    async fn test_delete_user_out_of_domain_forbidden() {
        let state = setup_state().await;
        seed(&state, "u2", "other.com").await;

        let query = DeleteUserQuery {
            uid: "u2".to_string(),
        };
        let result = delete_user(
            State(state.clone()),
            requester(Role::Admin, Some("acme.com")),
            ValidatedQuery(query),
        )
        .await;
        assert!(matches!(result, Err(ApiError::Forbidden { .. })));
        assert!(state.directory.get_user("u2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_user_admin_domain_forced() {
        let state = setup_state().await;

        let body = UpsertUserRequest {
            uid: "u9".to_string(),
            email: "u9@other.com".to_string(),
            name: None,
            role: None,
            domain: Some("other.com".to_string()),
            employee_number: None,
            disabled: false,
        };
        let (_, response) = create_user(
            State(state),
            requester(Role::Admin, Some("acme.com")),
            ValidatedJson(body),
        )
        .await
        .unwrap();
        assert_eq!(response.0.domain.as_deref(), Some("acme.com"));
    }
}
