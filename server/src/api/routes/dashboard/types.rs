//! Dashboard API types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::routes::products::types::{PriceInput, normalize_timestamp};
use crate::data::types::{KpiCounts, NewPriceEvent, PriceEventRow, RecommendationRow};
use crate::domain::series::AggregatedPricePoint;

/// Stored price event DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct PriceEventDto {
    /// Store-assigned id
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub your_price: f64,
    pub competitor: String,
    pub competitor_price: f64,
    pub change_pct: Option<f64>,
    pub timestamp: String,
}

impl From<PriceEventRow> for PriceEventDto {
    fn from(row: PriceEventRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            your_price: row.your_price,
            competitor: row.competitor,
            competitor_price: row.competitor_price,
            change_pct: row.change_pct,
            timestamp: row.timestamp,
        }
    }
}

/// Recommendation DTO
#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationDto {
    pub id: String,
    pub product: String,
    pub impact: String,
    pub priority: String,
    /// Model confidence in [0, 1]
    pub confidence: f64,
}

impl From<RecommendationRow> for RecommendationDto {
    fn from(row: RecommendationRow) -> Self {
        Self {
            id: row.id,
            product: row.product,
            impact: row.impact,
            priority: row.priority.to_string(),
            confidence: row.confidence,
        }
    }
}

/// Aggregate counts shown on the dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct KpiDto {
    pub products: u64,
    pub competitors: u64,
    pub recommendations: u64,
}

impl From<KpiCounts> for KpiDto {
    fn from(counts: KpiCounts) -> Self {
        Self {
            products: counts.products,
            competitors: counts.competitors,
            recommendations: counts.recommendations,
        }
    }
}

/// Paginated recent-event feed
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    pub items: Vec<PriceEventDto>,
    pub total: u64,
}

/// Full dashboard payload
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub events: EventListResponse,
    pub kpis: KpiDto,
    /// Daily averages over the trailing 30 days, all products
    pub series: Vec<AggregatedPricePoint>,
    /// Top recommendations by confidence
    pub recommendations: Vec<RecommendationDto>,
}

/// Query parameters for GET /dashboard
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DashboardQuery {
    pub page: Option<u32>,
    /// Event feed page size, clamped to [1, 100]
    pub page_size: Option<u32>,
}

/// Request body for POST /dashboard/events
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePriceEventRequest {
    pub product_id: String,
    pub name: String,
    pub your_price: PriceInput,
    pub competitor: String,
    pub competitor_price: PriceInput,
    pub change_pct: Option<f64>,
    pub timestamp: String,
}

impl CreatePriceEventRequest {
    /// Validate and coerce into a store input
    pub fn normalize(&self) -> Result<NewPriceEvent, String> {
        let product_id = non_empty(&self.product_id, "product_id")?;
        let name = non_empty(&self.name, "name")?;
        let competitor = non_empty(&self.competitor, "competitor")?;
        let your_price = self
            .your_price
            .as_price()
            .ok_or("your_price must be a finite number")?;
        let competitor_price = self
            .competitor_price
            .as_price()
            .ok_or("competitor_price must be a finite number")?;
        let timestamp =
            normalize_timestamp(&self.timestamp).ok_or("timestamp must be an ISO-8601 string")?;

        Ok(NewPriceEvent {
            product_id,
            name,
            your_price,
            competitor,
            competitor_price,
            change_pct: self.change_pct.filter(|v| v.is_finite()),
            timestamp,
        })
    }
}

fn non_empty(raw: &str, field: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(format!("{field} must not be empty"))
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreatePriceEventRequest {
        CreatePriceEventRequest {
            product_id: "SKU-1".into(),
            name: "Widget".into(),
            your_price: PriceInput::Number(19.99),
            competitor: "rival.com".into(),
            competitor_price: PriceInput::Text("18.50".into()),
            change_pct: Some(-2.5),
            timestamp: "2025-06-01T08:00:00Z".into(),
        }
    }

    #[test]
    fn test_normalize_event() {
        let event = request().normalize().unwrap();
        assert_eq!(event.competitor_price, 18.50);
        assert_eq!(event.change_pct, Some(-2.5));
    }

    #[test]
    fn test_normalize_requires_competitor() {
        let mut req = request();
        req.competitor = "  ".into();
        assert!(req.normalize().is_err());
    }

    #[test]
    fn test_normalize_rejects_bad_timestamp() {
        let mut req = request();
        req.timestamp = "yesterday".into();
        assert!(req.normalize().is_err());
    }
}
