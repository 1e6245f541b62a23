//! Recommendation repository
//!
//! Rows are produced out-of-band by the scoring pipeline;
//! `insert_recommendation` is its write seam. The API routes only read.

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::types::{Priority, RecommendationRow};

type RecommendationTuple = (String, String, String, String, f64);

fn row_from_tuple(t: RecommendationTuple) -> RecommendationRow {
    let (id, product, impact, priority, confidence) = t;
    RecommendationRow {
        id,
        product,
        impact,
        // Schema CHECK constraint guarantees a known priority string
        priority: priority.parse().unwrap_or(Priority::Low),
        confidence,
    }
}

/// Insert a recommendation with a store-assigned CUID2 id
pub async fn insert_recommendation(
    pool: &SqlitePool,
    product: &str,
    impact: &str,
    priority: Priority,
    confidence: f64,
) -> Result<RecommendationRow, SqliteError> {
    let id = cuid2::create_id();

    sqlx::query(
        "INSERT INTO recommendations (id, product, impact, priority, confidence) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(product)
    .bind(impact)
    .bind(priority.as_str())
    .bind(confidence)
    .execute(pool)
    .await?;

    Ok(RecommendationRow {
        id,
        product: product.to_string(),
        impact: impact.to_string(),
        priority,
        confidence,
    })
}

/// Get a recommendation by id
pub async fn get_recommendation(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<RecommendationRow>, SqliteError> {
    let row = sqlx::query_as::<_, RecommendationTuple>(
        "SELECT id, product, impact, priority, confidence FROM recommendations WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(row_from_tuple))
}

/// List recommendations ordered by confidence, highest first
pub async fn list_recommendations(
    pool: &SqlitePool,
    limit: u32,
) -> Result<Vec<RecommendationRow>, SqliteError> {
    let rows = sqlx::query_as::<_, RecommendationTuple>(
        "SELECT id, product, impact, priority, confidence FROM recommendations
         ORDER BY confidence DESC LIMIT ?",
    )
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(row_from_tuple).collect())
}

/// Total recommendation count (dashboard KPI)
pub async fn count_recommendations(pool: &SqlitePool) -> Result<u64, SqliteError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM recommendations")
        .fetch_one(pool)
        .await?;
    Ok(count as u64)
}
