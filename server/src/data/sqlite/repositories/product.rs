//! Product repository for SQLite operations
//!
//! Products are upserted by business key so that repeated scraper feeds stay
//! idempotent; the internal UUID and created_at survive re-ingestion. Every
//! accepted price write also appends a row to the price_history observation
//! log inside the same transaction.

use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::data::sqlite::SqliteError;
use crate::data::types::{ListProductsParams, NewProduct, ProductKey, ProductPatch, ProductRow, ProductSort};

type ProductTuple = (String, String, String, Option<String>, f64, String, i64);

fn row_from_tuple(t: ProductTuple) -> ProductRow {
    let (id, product_id, name, domain, your_price, timestamp, created_at) = t;
    ProductRow {
        id,
        product_id,
        name,
        domain,
        your_price,
        timestamp,
        created_at,
    }
}

const SELECT_COLUMNS: &str =
    "id, product_id, name, domain, your_price, timestamp, created_at";

/// Insert or update a single product by business key
pub async fn create_product(
    pool: &SqlitePool,
    item: &NewProduct,
) -> Result<ProductRow, SqliteError> {
    let mut tx = pool.begin().await?;
    let row = upsert_in_tx(&mut tx, item).await?;
    tx.commit().await?;
    Ok(row)
}

/// Insert or update a batch of products in a single transaction.
///
/// All-or-nothing: any failure rolls back the entire batch.
pub async fn create_products_bulk(
    pool: &SqlitePool,
    items: &[NewProduct],
) -> Result<Vec<ProductRow>, SqliteError> {
    let mut tx = pool.begin().await?;
    let mut rows = Vec::with_capacity(items.len());
    for item in items {
        rows.push(upsert_in_tx(&mut tx, item).await?);
    }
    tx.commit().await?;
    Ok(rows)
}

async fn upsert_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    item: &NewProduct,
) -> Result<ProductRow, SqliteError> {
    let id = Uuid::new_v4().to_string();
    let now = chrono::Utc::now().timestamp();

    // Existing rows keep their internal id and created_at
    sqlx::query(
        r#"
        INSERT INTO products (id, product_id, name, domain, your_price, timestamp, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(product_id) DO UPDATE SET
            name = excluded.name,
            domain = excluded.domain,
            your_price = excluded.your_price,
            timestamp = excluded.timestamp
        "#,
    )
    .bind(&id)
    .bind(&item.product_id)
    .bind(&item.name)
    .bind(&item.domain)
    .bind(item.your_price)
    .bind(&item.timestamp)
    .bind(now)
    .execute(&mut **tx)
    .await?;

    append_observation_in_tx(tx, item).await?;

    let row = sqlx::query_as::<_, ProductTuple>(&format!(
        "SELECT {SELECT_COLUMNS} FROM products WHERE product_id = ?"
    ))
    .bind(&item.product_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row_from_tuple(row))
}

async fn append_observation_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    item: &NewProduct,
) -> Result<(), SqliteError> {
    sqlx::query(
        "INSERT INTO price_history (product_id, name, your_price, timestamp) VALUES (?, ?, ?, ?)",
    )
    .bind(&item.product_id)
    .bind(&item.name)
    .bind(item.your_price)
    .bind(&item.timestamp)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Get a product by internal id or business key
pub async fn get_product(
    pool: &SqlitePool,
    key: &ProductKey,
) -> Result<Option<ProductRow>, SqliteError> {
    let query = match key {
        ProductKey::Internal(_) => {
            format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = ?")
        }
        ProductKey::Business(_) => {
            format!("SELECT {SELECT_COLUMNS} FROM products WHERE product_id = ?")
        }
    };

    let row = sqlx::query_as::<_, ProductTuple>(&query)
        .bind(key.to_string())
        .fetch_optional(pool)
        .await?;

    Ok(row.map(row_from_tuple))
}

/// List products with filters, sort, and pagination.
///
/// Returns the page of rows plus the total count over the full filter.
pub async fn list_products(
    pool: &SqlitePool,
    params: &ListProductsParams,
) -> Result<(Vec<ProductRow>, u64), SqliteError> {
    let mut where_clauses: Vec<&str> = Vec::new();
    if params.domain.is_some() {
        where_clauses.push("domain = ?");
    }
    if params.q.is_some() {
        where_clauses.push("LOWER(name) LIKE ?");
    }
    let where_sql = if where_clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", where_clauses.join(" AND "))
    };

    let order_sql = match params.sort {
        ProductSort::Name => "ORDER BY name COLLATE NOCASE ASC",
        ProductSort::Price => "ORDER BY your_price ASC",
    };

    let q_pattern = params
        .q
        .as_ref()
        .map(|q| format!("%{}%", q.to_lowercase()));

    let count_sql = format!("SELECT COUNT(*) FROM products {where_sql}");
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(ref domain) = params.domain {
        count_query = count_query.bind(domain);
    }
    if let Some(ref pattern) = q_pattern {
        count_query = count_query.bind(pattern);
    }
    let total = count_query.fetch_one(pool).await?;

    let offset = (params.page.saturating_sub(1) as i64) * params.per_page as i64;
    let list_sql = format!(
        "SELECT {SELECT_COLUMNS} FROM products {where_sql} {order_sql} LIMIT ? OFFSET ?"
    );
    let mut list_query = sqlx::query_as::<_, ProductTuple>(&list_sql);
    if let Some(ref domain) = params.domain {
        list_query = list_query.bind(domain);
    }
    if let Some(ref pattern) = q_pattern {
        list_query = list_query.bind(pattern);
    }
    let rows = list_query
        .bind(params.per_page as i64)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok((rows.into_iter().map(row_from_tuple).collect(), total as u64))
}

/// Apply a partial update to a product
pub async fn update_product(
    pool: &SqlitePool,
    key: &ProductKey,
    patch: &ProductPatch,
) -> Result<Option<ProductRow>, SqliteError> {
    let Some(existing) = get_product(pool, key).await? else {
        return Ok(None);
    };

    let name = patch.name.clone().unwrap_or(existing.name);
    let domain = patch.domain.clone().or(existing.domain);
    let your_price = patch.your_price.unwrap_or(existing.your_price);
    let timestamp = patch.timestamp.clone().unwrap_or(existing.timestamp);

    let mut tx = pool.begin().await?;

    sqlx::query(
        "UPDATE products SET name = ?, domain = ?, your_price = ?, timestamp = ? WHERE id = ?",
    )
    .bind(&name)
    .bind(&domain)
    .bind(your_price)
    .bind(&timestamp)
    .bind(&existing.id)
    .execute(&mut *tx)
    .await?;

    // A price or timestamp change is a new observation
    if patch.your_price.is_some() || patch.timestamp.is_some() {
        sqlx::query(
            "INSERT INTO price_history (product_id, name, your_price, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(&existing.product_id)
        .bind(&name)
        .bind(your_price)
        .bind(&timestamp)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    get_product(pool, &ProductKey::Business(existing.product_id)).await
}

/// Delete a product; returns false when the key does not exist
pub async fn delete_product(pool: &SqlitePool, key: &ProductKey) -> Result<bool, SqliteError> {
    let query = match key {
        ProductKey::Internal(_) => "DELETE FROM products WHERE id = ?",
        ProductKey::Business(_) => "DELETE FROM products WHERE product_id = ?",
    };

    let result = sqlx::query(query)
        .bind(key.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Total product count (dashboard KPI)
pub async fn count_products(pool: &SqlitePool) -> Result<u64, SqliteError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    Ok(count as u64)
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

    fn sample(product_id: &str, name: &str, price: f64) -> NewProduct {
        NewProduct {
            product_id: product_id.to_string(),
            name: name.to_string(),
            domain: Some("acme.com".to_string()),
            your_price: price,
            timestamp: "2025-06-01T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_by_business_key() {
        let pool = setup_test_pool().await;
        let created = create_product(&pool, &sample("SKU-1", "Widget", 19.99))
            .await
            .unwrap();

        assert!(Uuid::parse_str(&created.id).is_ok());
        assert_eq!(created.product_id, "SKU-1");

        let fetched = get_product(&pool, &ProductKey::Business("SKU-1".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.your_price, 19.99);
    }

    #[tokio::test]
    async fn test_get_by_internal_id() {
        let pool = setup_test_pool().await;
        let created = create_product(&pool, &sample("SKU-1", "Widget", 19.99))
            .await
            .unwrap();

        let key = ProductKey::parse(&created.id);
        assert!(matches!(key, ProductKey::Internal(_)));
        let fetched = get_product(&pool, &key).await.unwrap().unwrap();
        assert_eq!(fetched.product_id, "SKU-1");
    }

    #[tokio::test]
    async fn test_upsert_preserves_id_and_created_at() {
        let pool = setup_test_pool().await;
        let first = create_product(&pool, &sample("SKU-1", "Widget", 19.99))
            .await
            .unwrap();
        let second = create_product(&pool, &sample("SKU-1", "Widget v2", 24.99))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.name, "Widget v2");
        assert_eq!(second.your_price, 24.99);
    }

    #[tokio::test]
    async fn test_create_appends_observation() {
        let pool = setup_test_pool().await;
        create_product(&pool, &sample("SKU-1", "Widget", 19.99))
            .await
            .unwrap();
        create_product(&pool, &sample("SKU-1", "Widget", 21.50))
            .await
            .unwrap();

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM price_history WHERE product_id = 'SKU-1'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_bulk_insert_all_or_nothing() {
        let pool = setup_test_pool().await;
        let batch = vec![
            sample("SKU-1", "Widget", 19.99),
            // Violates the CHECK(length(name) >= 1) constraint
            sample("SKU-2", "", 9.99),
        ];

        let result = create_products_bulk(&pool, &batch).await;
        assert!(result.is_err());

        // The valid row must not have been written either
        let count = count_products(&pool).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_list_pagination_and_total() {
        let pool = setup_test_pool().await;
        for i in 0..7 {
            create_product(&pool, &sample(&format!("SKU-{i}"), &format!("Item {i}"), 10.0 + i as f64))
                .await
                .unwrap();
        }

        let params = ListProductsParams {
            page: 2,
            per_page: 3,
            ..Default::default()
        };
        let (rows, total) = list_products(&pool, &params).await.unwrap();
        assert_eq!(total, 7);
        assert_eq!(rows.len(), 3);
        // Name sort ascending, page 2 starts at the 4th item
        assert_eq!(rows[0].name, "Item 3");
    }

    #[tokio::test]
    async fn test_list_name_filter_case_insensitive() {
        let pool = setup_test_pool().await;
        create_product(&pool, &sample("SKU-1", "Gaming Mouse", 49.0))
            .await
            .unwrap();
        create_product(&pool, &sample("SKU-2", "Keyboard", 89.0))
            .await
            .unwrap();

        let params = ListProductsParams {
            q: Some("MOUSE".to_string()),
            page: 1,
            per_page: 25,
            ..Default::default()
        };
        let (rows, total) = list_products(&pool, &params).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].product_id, "SKU-1");
    }

    #[tokio::test]
    async fn test_list_sorted_by_price() {
        let pool = setup_test_pool().await;
        create_product(&pool, &sample("SKU-1", "Alpha", 30.0))
            .await
            .unwrap();
        create_product(&pool, &sample("SKU-2", "Beta", 10.0))
            .await
            .unwrap();

        let params = ListProductsParams {
            sort: ProductSort::Price,
            page: 1,
            per_page: 25,
            ..Default::default()
        };
        let (rows, _) = list_products(&pool, &params).await.unwrap();
        assert_eq!(rows[0].product_id, "SKU-2");
    }

    #[tokio::test]
    async fn test_update_partial() {
        let pool = setup_test_pool().await;
        let created = create_product(&pool, &sample("SKU-1", "Widget", 19.99))
            .await
            .unwrap();

        let patch = ProductPatch {
            your_price: Some(25.0),
            ..Default::default()
        };
        let updated = update_product(&pool, &ProductKey::parse(&created.id), &patch)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.your_price, 25.0);
        assert_eq!(updated.name, "Widget");
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let pool = setup_test_pool().await;
        let patch = ProductPatch {
            your_price: Some(25.0),
            ..Default::default()
        };
        let result = update_product(&pool, &ProductKey::Business("nope".to_string()), &patch)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = setup_test_pool().await;
        create_product(&pool, &sample("SKU-1", "Widget", 19.99))
            .await
            .unwrap();

        let deleted = delete_product(&pool, &ProductKey::Business("SKU-1".to_string()))
            .await
            .unwrap();
        assert!(deleted);

        let deleted_again = delete_product(&pool, &ProductKey::Business("SKU-1".to_string()))
            .await
            .unwrap();
        assert!(!deleted_again);
    }
}
