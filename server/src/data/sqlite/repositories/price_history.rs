//! Price observation repository (append-only log)
//!
//! Timestamps are normalized to RFC 3339 UTC at the API boundary, so
//! lexicographic comparison in SQL matches chronological order.
//!
//! The product ingest path appends rows inside its own transaction;
//! `insert_observation` is the seam for out-of-band backfills.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::PriceObservationRow;

type ObservationTuple = (
    String,
    String,
    Option<f64>,
    Option<String>,
    Option<f64>,
    Option<f64>,
    String,
);

fn row_from_tuple(t: ObservationTuple) -> PriceObservationRow {
    let (product_id, name, your_price, competitor, competitor_price, change_pct, timestamp) = t;
    PriceObservationRow {
        product_id,
        name,
        your_price,
        competitor,
        competitor_price,
        change_pct,
        timestamp,
    }
}

/// Append a raw observation
pub async fn insert_observation(
    pool: &SqlitePool,
    row: &PriceObservationRow,
) -> Result<(), SqliteError> {
    sqlx::query(
        r#"
        INSERT INTO price_history
            (product_id, name, your_price, competitor, competitor_price, change_pct, timestamp)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&row.product_id)
    .bind(&row.name)
    .bind(row.your_price)
    .bind(&row.competitor)
    .bind(row.competitor_price)
    .bind(row.change_pct)
    .bind(&row.timestamp)
    .execute(pool)
    .await?;
    Ok(())
}

/// List observations for a product, oldest first, bounds inclusive
pub async fn list_observations(
    pool: &SqlitePool,
    product_id: &str,
    from: Option<&str>,
    to: Option<&str>,
) -> Result<Vec<PriceObservationRow>, SqliteError> {
    let mut sql = String::from(
        "SELECT product_id, name, your_price, competitor, competitor_price, change_pct, timestamp
         FROM price_history WHERE product_id = ?",
    );
    if from.is_some() {
        sql.push_str(" AND timestamp >= ?");
    }
    if to.is_some() {
        sql.push_str(" AND timestamp <= ?");
    }
    sql.push_str(" ORDER BY timestamp ASC");

    let mut query = sqlx::query_as::<_, ObservationTuple>(&sql).bind(product_id);
    if let Some(from) = from {
        query = query.bind(from);
    }
    if let Some(to) = to {
        query = query.bind(to);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}

/// List observations across all products since `from`, oldest first
/// (dashboard series)
pub async fn list_recent_observations(
    pool: &SqlitePool,
    from: &str,
) -> Result<Vec<PriceObservationRow>, SqliteError> {
    let rows = sqlx::query_as::<_, ObservationTuple>(
        "SELECT product_id, name, your_price, competitor, competitor_price, change_pct, timestamp
         FROM price_history WHERE timestamp >= ? ORDER BY timestamp ASC",
    )
    .bind(from)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}

/// Count of distinct competitors across all observations (dashboard KPI)
pub async fn count_distinct_competitors(pool: &SqlitePool) -> Result<u64, SqliteError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(DISTINCT competitor) FROM price_history WHERE competitor IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;
    Ok(count as u64)
}
