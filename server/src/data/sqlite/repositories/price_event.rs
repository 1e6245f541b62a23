//! Price event repository (dashboard feed)

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{NewPriceEvent, PriceEventRow};

type EventTuple = (String, String, String, f64, String, f64, Option<f64>, String);

fn row_from_tuple(t: EventTuple) -> PriceEventRow {
    let (id, product_id, name, your_price, competitor, competitor_price, change_pct, timestamp) = t;
    PriceEventRow {
        id,
        product_id,
        name,
        your_price,
        competitor,
        competitor_price,
        change_pct,
        timestamp,
    }
}

/// Insert a price event with a store-assigned CUID2 id
pub async fn insert_event(
    pool: &SqlitePool,
    event: &NewPriceEvent,
) -> Result<PriceEventRow, SqliteError> {
    let id = cuid2::create_id();

    sqlx::query(
        r#"
        INSERT INTO recent_events
            (id, product_id, name, your_price, competitor, competitor_price, change_pct, timestamp)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&event.product_id)
    .bind(&event.name)
    .bind(event.your_price)
    .bind(&event.competitor)
    .bind(event.competitor_price)
    .bind(event.change_pct)
    .bind(&event.timestamp)
    .execute(pool)
    .await?;

    Ok(PriceEventRow {
        id,
        product_id: event.product_id.clone(),
        name: event.name.clone(),
        your_price: event.your_price,
        competitor: event.competitor.clone(),
        competitor_price: event.competitor_price,
        change_pct: event.change_pct,
        timestamp: event.timestamp.clone(),
    })
}

/// List events newest first with the total count
pub async fn list_events(
    pool: &SqlitePool,
    page: u32,
    page_size: u32,
) -> Result<(Vec<PriceEventRow>, u64), SqliteError> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recent_events")
        .fetch_one(pool)
        .await?;

    let offset = (page.saturating_sub(1) as i64) * page_size as i64;
    let rows = sqlx::query_as::<_, EventTuple>(
        r#"
        SELECT id, product_id, name, your_price, competitor, competitor_price, change_pct, timestamp
        FROM recent_events
        ORDER BY timestamp DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(page_size as i64)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok((rows.into_iter().map(row_from_tuple).collect(), total as u64))
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

    fn event(product_id: &str, ts: &str) -> NewPriceEvent {
        NewPriceEvent {
            product_id: product_id.to_string(),
            name: "Widget".to_string(),
            your_price: 19.99,
            competitor: "rival.com".to_string(),
            competitor_price: 18.50,
            change_pct: Some(-2.5),
            timestamp: ts.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id() {
        let pool = setup_test_pool().await;
        let stored = insert_event(&pool, &event("SKU-1", "2025-06-01T10:00:00Z"))
            .await
            .unwrap();
        assert!(!stored.id.is_empty());
        assert_eq!(stored.product_id, "SKU-1");
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let pool = setup_test_pool().await;
        insert_event(&pool, &event("SKU-1", "2025-06-01T10:00:00Z"))
            .await
            .unwrap();
        insert_event(&pool, &event("SKU-2", "2025-06-03T10:00:00Z"))
            .await
            .unwrap();
        insert_event(&pool, &event("SKU-3", "2025-06-02T10:00:00Z"))
            .await
            .unwrap();

        let (rows, total) = list_events(&pool, 1, 10).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows[0].product_id, "SKU-2");
        assert_eq!(rows[2].product_id, "SKU-1");
    }

    #[tokio::test]
    async fn test_list_pagination_offsets() {
        let pool = setup_test_pool().await;
        for i in 0..5 {
            insert_event(&pool, &event(&format!("SKU-{i}"), &format!("2025-06-0{}T10:00:00Z", i + 1)))
                .await
                .unwrap();
        }

        let (page2, total) = list_events(&pool, 2, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page2.len(), 2);
        // Newest first: page 1 is SKU-4, SKU-3; page 2 starts at SKU-2
        assert_eq!(page2[0].product_id, "SKU-2");
    }

    #[tokio::test]
    async fn test_list_empty() {
        let pool = setup_test_pool().await;
        let (rows, total) = list_events(&pool, 1, 10).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 0);
    }
}
