//! Product API types
//!
//! Scraper feeds are messy: prices arrive as numbers or strings, strings
//! carry stray whitespace, timestamps come in several ISO shapes. Request
//! types accept the loose form and `normalize` turns each record into a
//! validated store input or a field-level error message.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::data::types::{NewProduct, ProductPatch, ProductRow, ProductSort};
use crate::domain::series::parse_timestamp;

/// Product DTO for API responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDto {
    /// Internal id (UUID v4)
    pub id: String,
    /// Business key
    pub product_id: String,
    pub name: String,
    pub domain: Option<String>,
    pub your_price: f64,
    pub timestamp: String,
    pub created_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductDto {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            name: row.name,
            domain: row.domain,
            your_price: row.your_price,
            timestamp: row.timestamp,
            created_at: DateTime::from_timestamp(row.created_at, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Paginated product listing
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub items: Vec<ProductDto>,
    /// Full filtered count, not the page size
    pub total: u64,
}

/// Query parameters for GET /products
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ListProductsQuery {
    pub domain: Option<String>,
    /// Case-insensitive name substring
    #[validate(length(max = 200, message = "q must be at most 200 characters"))]
    pub q: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// `name` or `price`; anything else falls back to `name`
    pub sort: Option<String>,
}

impl ListProductsQuery {
    pub fn sort_key(&self) -> ProductSort {
        match self.sort.as_deref() {
            Some("price") => ProductSort::Price,
            _ => ProductSort::Name,
        }
    }
}

/// A price value as it arrives from upstream: JSON number or numeric string
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum PriceInput {
    Number(f64),
    Text(String),
}

impl PriceInput {
    /// Coerce to a finite f64, or `None` when not a usable price
    pub fn as_price(&self) -> Option<f64> {
        match self {
            PriceInput::Number(n) => Some(*n).filter(|v| v.is_finite()),
            PriceInput::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

/// Normalize a timestamp to RFC 3339 UTC (`Z` suffix) for storage
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    parse_timestamp(raw.trim()).map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
}

fn trimmed_non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Request body for a single product record
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub product_id: String,
    pub name: String,
    pub domain: Option<String>,
    pub your_price: PriceInput,
    pub timestamp: String,
}

impl CreateProductRequest {
    /// Validate and coerce into a store input
    pub fn normalize(&self) -> Result<NewProduct, String> {
        let product_id =
            trimmed_non_empty(&self.product_id).ok_or("product_id must not be empty")?;
        let name = trimmed_non_empty(&self.name).ok_or("name must not be empty")?;
        let your_price = self
            .your_price
            .as_price()
            .ok_or("your_price must be a finite number")?;
        let timestamp =
            normalize_timestamp(&self.timestamp).ok_or("timestamp must be an ISO-8601 string")?;

        Ok(NewProduct {
            product_id,
            name,
            domain: self.domain.as_deref().and_then(trimmed_non_empty),
            your_price,
            timestamp,
        })
    }
}

/// POST /products accepts one record or an array of records
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CreateProductsBody {
    One(CreateProductRequest),
    Many(Vec<CreateProductRequest>),
}

/// Request body for a partial product update
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub your_price: Option<PriceInput>,
    pub timestamp: Option<String>,
}

impl UpdateProductRequest {
    /// Validate and coerce into a patch; present-but-invalid fields error
    pub fn normalize(&self) -> Result<ProductPatch, String> {
        let name = match &self.name {
            Some(raw) => Some(trimmed_non_empty(raw).ok_or("name must not be empty")?),
            None => None,
        };
        let your_price = match &self.your_price {
            Some(raw) => Some(raw.as_price().ok_or("your_price must be a finite number")?),
            None => None,
        };
        let timestamp = match &self.timestamp {
            Some(raw) => {
                Some(normalize_timestamp(raw).ok_or("timestamp must be an ISO-8601 string")?)
            }
            None => None,
        };

        Ok(ProductPatch {
            name,
            domain: self.domain.as_deref().and_then(trimmed_non_empty),
            your_price,
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(product_id: &str, name: &str, price: PriceInput, ts: &str) -> CreateProductRequest {
        CreateProductRequest {
            product_id: product_id.to_string(),
            name: name.to_string(),
            domain: None,
            your_price: price,
            timestamp: ts.to_string(),
        }
    }

    #[test]
    fn test_price_coercion() {
        assert_eq!(PriceInput::Number(12.5).as_price(), Some(12.5));
        assert_eq!(PriceInput::Text(" 12.5 ".into()).as_price(), Some(12.5));
        assert_eq!(PriceInput::Text("free".into()).as_price(), None);
        assert_eq!(PriceInput::Number(f64::NAN).as_price(), None);
        assert_eq!(PriceInput::Number(f64::INFINITY).as_price(), None);
    }

    #[test]
    fn test_normalize_trims_and_coerces() {
        let req = request(
            "  SKU-1  ",
            " Widget ",
            PriceInput::Text("19.99".into()),
            "2025-06-01T08:00:00+02:00",
        );
        let item = req.normalize().unwrap();
        assert_eq!(item.product_id, "SKU-1");
        assert_eq!(item.name, "Widget");
        assert_eq!(item.your_price, 19.99);
        assert_eq!(item.timestamp, "2025-06-01T06:00:00Z");
    }

    #[test]
    fn test_normalize_rejects_bad_fields() {
        let req = request("", "Widget", PriceInput::Number(1.0), "2025-06-01T00:00:00Z");
        assert!(req.normalize().is_err());

        let req = request("SKU-1", "Widget", PriceInput::Number(1.0), "last tuesday");
        assert!(req.normalize().is_err());
    }

    #[test]
    fn test_update_empty_patch() {
        let req = UpdateProductRequest {
            name: None,
            domain: None,
            your_price: None,
            timestamp: None,
        };
        assert!(req.normalize().unwrap().is_empty());
    }

    #[test]
    fn test_sort_key_fallback() {
        let query = ListProductsQuery {
            domain: None,
            q: None,
            page: None,
            per_page: None,
            sort: Some("shoe-size".into()),
        };
        assert_eq!(query.sort_key(), ProductSort::Name);

        let query = ListProductsQuery {
            sort: Some("price".into()),
            ..query
        };
        assert_eq!(query.sort_key(), ProductSort::Price);
    }

    #[test]
    fn test_body_accepts_single_and_array() {
        let single: CreateProductsBody =
            serde_json::from_str(r#"{"product_id":"SKU-1","name":"W","your_price":1,"timestamp":"2025-06-01T00:00:00Z"}"#)
                .unwrap();
        assert!(matches!(single, CreateProductsBody::One(_)));

        let many: CreateProductsBody =
            serde_json::from_str(r#"[{"product_id":"SKU-1","name":"W","your_price":"2","timestamp":"2025-06-01T00:00:00Z"}]"#)
                .unwrap();
        assert!(matches!(many, CreateProductsBody::Many(_)));
    }
}
