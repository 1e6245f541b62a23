//! Directory user repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{ListUsersParams, NewUser, Role, UserPatch, UserRow};

type UserTuple = (
    String,
    Option<String>,
    Option<String>,
    String,
    Option<String>,
    Option<String>,
    i64,
    i64,
);

fn row_from_tuple(t: UserTuple) -> UserRow {
    let (uid, email, name, role, domain, employee_number, disabled, created_at) = t;
    UserRow {
        uid,
        email,
        name,
        // Schema CHECK constraint guarantees a known role string
        role: role.parse().unwrap_or(Role::User),
        domain,
        employee_number,
        disabled: disabled != 0,
        created_at,
    }
}

const SELECT_COLUMNS: &str =
    "uid, email, name, role, domain, employee_number, disabled, created_at";

/// Create or replace a user record keyed by uid
pub async fn upsert_user(pool: &SqlitePool, user: &NewUser) -> Result<UserRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO users (uid, email, name, role, domain, employee_number, disabled, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(uid) DO UPDATE SET
            email = excluded.email,
            name = excluded.name,
            role = excluded.role,
            domain = excluded.domain,
            employee_number = excluded.employee_number,
            disabled = excluded.disabled
        "#,
    )
    .bind(&user.uid)
    .bind(&user.email)
    .bind(&user.name)
    .bind(user.role.as_str())
    .bind(&user.domain)
    .bind(&user.employee_number)
    .bind(user.disabled as i64)
    .bind(now)
    .execute(pool)
    .await?;

    get_user(pool, &user.uid)
        .await?
        .ok_or_else(|| SqliteError::Conflict(format!("User {} vanished after upsert", user.uid)))
}

/// Get a user by uid
pub async fn get_user(pool: &SqlitePool, uid: &str) -> Result<Option<UserRow>, SqliteError> {
    let row = sqlx::query_as::<_, UserTuple>(&format!(
        "SELECT {SELECT_COLUMNS} FROM users WHERE uid = ?"
    ))
    .bind(uid)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(row_from_tuple))
}

/// List users with optional domain scoping and free-text search
pub async fn list_users(
    pool: &SqlitePool,
    params: &ListUsersParams,
) -> Result<Vec<UserRow>, SqliteError> {
    let mut sql = format!("SELECT {SELECT_COLUMNS} FROM users WHERE 1=1");
    if params.domain.is_some() {
        sql.push_str(" AND domain = ?");
    }
    if params.q.is_some() {
        sql.push_str(
            " AND (LOWER(COALESCE(email, '')) LIKE ?
               OR LOWER(COALESCE(name, '')) LIKE ?
               OR LOWER(COALESCE(employee_number, '')) LIKE ?
               OR LOWER(COALESCE(domain, '')) LIKE ?)",
        );
    }
    sql.push_str(" ORDER BY created_at DESC LIMIT ?");

    let q_pattern = params
        .q
        .as_ref()
        .map(|q| format!("%{}%", q.to_lowercase()));

    let mut query = sqlx::query_as::<_, UserTuple>(&sql);
    if let Some(ref domain) = params.domain {
        query = query.bind(domain);
    }
    if let Some(ref pattern) = q_pattern {
        query = query
            .bind(pattern)
            .bind(pattern)
            .bind(pattern)
            .bind(pattern);
    }

    let rows = query.bind(params.limit as i64).fetch_all(pool).await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}

/// Apply a partial update to a user; empty patch is a no-op returning
/// the current row
pub async fn update_user(
    pool: &SqlitePool,
    uid: &str,
    patch: &UserPatch,
) -> Result<Option<UserRow>, SqliteError> {
    let Some(existing) = get_user(pool, uid).await? else {
        return Ok(None);
    };

    if patch.is_empty() {
        return Ok(Some(existing));
    }

    let email = patch.email.clone().or(existing.email);
    let name = patch.name.clone().or(existing.name);
    let role = patch.role.unwrap_or(existing.role);
    let domain = patch.domain.clone().or(existing.domain);
    let employee_number = patch.employee_number.clone().or(existing.employee_number);
    let disabled = patch.disabled.unwrap_or(existing.disabled);

    sqlx::query(
        "UPDATE users SET email = ?, name = ?, role = ?, domain = ?, employee_number = ?, disabled = ? WHERE uid = ?",
    )
    .bind(&email)
    .bind(&name)
    .bind(role.as_str())
    .bind(&domain)
    .bind(&employee_number)
    .bind(disabled as i64)
    .bind(uid)
    .execute(pool)
    .await?;

    get_user(pool, uid).await
}

/// Delete a user by uid
pub async fn delete_user(pool: &SqlitePool, uid: &str) -> Result<bool, SqliteError> {
    let result = sqlx::query("DELETE FROM users WHERE uid = ?")
        .bind(uid)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_pool() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    fn sample(uid: &str, role: Role, domain: Option<&str>) -> NewUser {
        NewUser {
            uid: uid.to_string(),
            email: Some(format!("{uid}@example.com")),
            name: Some("Test User".to_string()),
            role,
            domain: domain.map(String::from),
            employee_number: Some("E-100".to_string()),
            disabled: false,
        }
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let pool = setup_test_pool().await;
        let user = upsert_user(&pool, &sample("u1", Role::User, Some("acme.com")))
            .await
            .unwrap();
        assert_eq!(user.uid, "u1");
        assert_eq!(user.role, Role::User);
        assert!(!user.disabled);

        let fetched = get_user(&pool, "u1").await.unwrap().unwrap();
        assert_eq!(fetched.email, Some("u1@example.com".to_string()));
    }

    #[tokio::test]
    async fn test_upsert_replaces_fields() {
        let pool = setup_test_pool().await;
        upsert_user(&pool, &sample("u1", Role::User, Some("acme.com")))
            .await
            .unwrap();
        let updated = upsert_user(&pool, &sample("u1", Role::Admin, Some("other.com")))
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.domain, Some("other.com".to_string()));
    }

    #[tokio::test]
    async fn test_list_domain_scoped() {
        let pool = setup_test_pool().await;
        upsert_user(&pool, &sample("u1", Role::User, Some("acme.com")))
            .await
            .unwrap();
        upsert_user(&pool, &sample("u2", Role::User, Some("other.com")))
            .await
            .unwrap();
        upsert_user(&pool, &sample("u3", Role::User, Some("acme.com")))
            .await
            .unwrap();

        let params = ListUsersParams {
            domain: Some("acme.com".to_string()),
            limit: 100,
            ..Default::default()
        };
        let users = list_users(&pool, &params).await.unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.domain.as_deref() == Some("acme.com")));
    }

    #[tokio::test]
    async fn test_list_free_text_search() {
        let pool = setup_test_pool().await;
        let mut target = sample("u1", Role::User, Some("acme.com"));
        target.employee_number = Some("E-42".to_string());
        upsert_user(&pool, &target).await.unwrap();
        upsert_user(&pool, &sample("u2", Role::User, Some("acme.com")))
            .await
            .unwrap();

        let params = ListUsersParams {
            q: Some("e-42".to_string()),
            limit: 100,
            ..Default::default()
        };
        let users = list_users(&pool, &params).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].uid, "u1");
    }

    #[tokio::test]
    async fn test_list_limit() {
        let pool = setup_test_pool().await;
        for i in 0..5 {
            upsert_user(&pool, &sample(&format!("u{i}"), Role::User, None))
                .await
                .unwrap();
        }

        let params = ListUsersParams {
            limit: 3,
            ..Default::default()
        };
        let users = list_users(&pool, &params).await.unwrap();
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn test_update_empty_patch_is_noop() {
        let pool = setup_test_pool().await;
        let created = upsert_user(&pool, &sample("u1", Role::User, Some("acme.com")))
            .await
            .unwrap();

        let updated = update_user(&pool, "u1", &UserPatch::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.role, created.role);
        assert_eq!(updated.email, created.email);
    }

    #[tokio::test]
    async fn test_update_partial() {
        let pool = setup_test_pool().await;
        upsert_user(&pool, &sample("u1", Role::User, Some("acme.com")))
            .await
            .unwrap();

        let patch = UserPatch {
            disabled: Some(true),
            role: Some(Role::Moderator),
            ..Default::default()
        };
        let updated = update_user(&pool, "u1", &patch).await.unwrap().unwrap();
        assert!(updated.disabled);
        assert_eq!(updated.role, Role::Moderator);
        assert_eq!(updated.domain, Some("acme.com".to_string()));
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let pool = setup_test_pool().await;
        let result = update_user(&pool, "ghost", &UserPatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = setup_test_pool().await;
        upsert_user(&pool, &sample("u1", Role::User, None))
            .await
            .unwrap();

        assert!(delete_user(&pool, "u1").await.unwrap());
        assert!(!delete_user(&pool, "u1").await.unwrap());
    }
}
