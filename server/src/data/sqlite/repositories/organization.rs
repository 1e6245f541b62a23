//! Organization repository (one row per domain)

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::OrganizationRow;

type OrgTuple = (String, String, i64, i64);

fn row_from_tuple(t: OrgTuple) -> OrganizationRow {
    let (domain, admin_uid, created_at, updated_at) = t;
    OrganizationRow {
        domain,
        admin_uid,
        created_at,
        updated_at,
    }
}

/// List all organizations ordered by domain
pub async fn list_organizations(pool: &SqlitePool) -> Result<Vec<OrganizationRow>, SqliteError> {
    let rows = sqlx::query_as::<_, OrgTuple>(
        "SELECT domain, admin_uid, created_at, updated_at FROM organizations ORDER BY domain ASC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}

/// Get an organization by domain
pub async fn get_organization(
    pool: &SqlitePool,
    domain: &str,
) -> Result<Option<OrganizationRow>, SqliteError> {
    let row = sqlx::query_as::<_, OrgTuple>(
        "SELECT domain, admin_uid, created_at, updated_at FROM organizations WHERE domain = ?",
    )
    .bind(domain)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_from_tuple))
}

/// Bind an admin to a domain, preserving created_at on existing rows
pub async fn upsert_organization(
    pool: &SqlitePool,
    domain: &str,
    admin_uid: &str,
) -> Result<OrganizationRow, SqliteError> {
    let now = chrono::Utc::now().timestamp();

    sqlx::query(
        r#"
        INSERT INTO organizations (domain, admin_uid, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(domain) DO UPDATE SET
            admin_uid = excluded.admin_uid,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(domain)
    .bind(admin_uid)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get_organization(pool, domain).await?.ok_or_else(|| {
        SqliteError::Conflict(format!("Organization {domain} vanished after upsert"))
    })
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

    #[tokio::test]
    async fn test_upsert_and_get() {
        let pool = setup_test_pool().await;
        let org = upsert_organization(&pool, "acme.com", "admin-1")
            .await
            .unwrap();
        assert_eq!(org.domain, "acme.com");
        assert_eq!(org.admin_uid, "admin-1");

        let fetched = get_organization(&pool, "acme.com").await.unwrap().unwrap();
        assert_eq!(fetched.admin_uid, "admin-1");
    }

    #[tokio::test]
    async fn test_upsert_preserves_created_at() {
        let pool = setup_test_pool().await;
        let first = upsert_organization(&pool, "acme.com", "admin-1")
            .await
            .unwrap();

        // Rebind to a different admin
        let second = upsert_organization(&pool, "acme.com", "admin-2")
            .await
            .unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.admin_uid, "admin-2");
    }

    #[tokio::test]
    async fn test_list_ordered_by_domain() {
        let pool = setup_test_pool().await;
        upsert_organization(&pool, "zeta.com", "a").await.unwrap();
        upsert_organization(&pool, "acme.com", "b").await.unwrap();

        let orgs = list_organizations(&pool).await.unwrap();
        assert_eq!(orgs.len(), 2);
        assert_eq!(orgs[0].domain, "acme.com");
    }

    #[tokio::test]
    async fn test_get_missing() {
        let pool = setup_test_pool().await;
        assert!(get_organization(&pool, "none.com").await.unwrap().is_none());
    }
}
