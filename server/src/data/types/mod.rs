//! Shared data types for the store layer
//!
//! Row structs mirror the SQLite tables; enums carry the closed vocabularies
//! (roles, recommendation priority, product sort keys) used across the
//! repositories and the API layer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Roles
// ============================================================================

/// Requester role, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
    Superadmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    /// Admin-tier roles may manage users within their own domain
    pub fn is_admin_tier(&self) -> bool {
        *self >= Role::Admin
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Product key dispatch
// ============================================================================

/// Product lookup key, resolved once at the API boundary.
///
/// Internal ids are UUID v4; anything that does not parse as a UUID is
/// treated as a business key (`product_id` column).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductKey {
    Internal(Uuid),
    Business(String),
}

impl ProductKey {
    pub fn parse(raw: &str) -> Self {
        match Uuid::parse_str(raw) {
            Ok(id) => ProductKey::Internal(id),
            Err(_) => ProductKey::Business(raw.to_string()),
        }
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductKey::Internal(id) => write!(f, "{id}"),
            ProductKey::Business(key) => write!(f, "{key}"),
        }
    }
}

// ============================================================================
// Product types
// ============================================================================

/// Product row from database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRow {
    /// Internal id (UUID v4)
    pub id: String,
    /// Business key
    pub product_id: String,
    pub name: String,
    pub domain: Option<String>,
    pub your_price: f64,
    /// ISO-8601 observation timestamp
    pub timestamp: String,
    pub created_at: i64,
}

/// Validated input for a product insert
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub product_id: String,
    pub name: String,
    pub domain: Option<String>,
    pub your_price: f64,
    pub timestamp: String,
}

/// Partial update for a product; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub your_price: Option<f64>,
    pub timestamp: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.domain.is_none()
            && self.your_price.is_none()
            && self.timestamp.is_none()
    }
}

/// Sort key for product listings (unknown values fall back to `Name`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductSort {
    #[default]
    Name,
    Price,
}

/// Parameters for a paginated product listing
#[derive(Debug, Clone, Default)]
pub struct ListProductsParams {
    pub domain: Option<String>,
    /// Case-insensitive name substring
    pub q: Option<String>,
    pub page: u32,
    pub per_page: u32,
    pub sort: ProductSort,
}

// ============================================================================
// Price history types
// ============================================================================

/// Append-only price observation row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceObservationRow {
    pub product_id: String,
    pub name: String,
    /// Missing or non-numeric source prices are stored as NULL and
    /// excluded from aggregation
    pub your_price: Option<f64>,
    pub competitor: Option<String>,
    pub competitor_price: Option<f64>,
    pub change_pct: Option<f64>,
    pub timestamp: String,
}

// ============================================================================
// Price event types
// ============================================================================

/// Stored price event (dashboard feed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEventRow {
    /// Store-assigned id (CUID2)
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub your_price: f64,
    pub competitor: String,
    pub competitor_price: f64,
    pub change_pct: Option<f64>,
    pub timestamp: String,
}

/// Validated input for a price event insert
#[derive(Debug, Clone)]
pub struct NewPriceEvent {
    pub product_id: String,
    pub name: String,
    pub your_price: f64,
    pub competitor: String,
    pub competitor_price: f64,
    pub change_pct: Option<f64>,
    pub timestamp: String,
}

// ============================================================================
// User types
// ============================================================================

/// Directory user row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub domain: Option<String>,
    pub employee_number: Option<String>,
    pub disabled: bool,
    pub created_at: i64,
}

/// Validated input for a user upsert
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub domain: Option<String>,
    pub employee_number: Option<String>,
    pub disabled: bool,
}

/// Partial update for a user; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<Role>,
    pub domain: Option<String>,
    pub employee_number: Option<String>,
    pub disabled: Option<bool>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.name.is_none()
            && self.role.is_none()
            && self.domain.is_none()
            && self.employee_number.is_none()
            && self.disabled.is_none()
    }
}

/// Parameters for a user listing
#[derive(Debug, Clone, Default)]
pub struct ListUsersParams {
    /// Free-text match against email, name, employee number, and domain
    pub q: Option<String>,
    /// When set, results are restricted to this domain (admin scoping)
    pub domain: Option<String>,
    pub limit: u32,
}

// ============================================================================
// Organization types
// ============================================================================

/// Organization row, one per domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationRow {
    pub domain: String,
    pub admin_uid: String,
    pub created_at: i64,
    pub updated_at: i64,
}

// ============================================================================
// Recommendation types
// ============================================================================

/// Recommendation priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Priority::Low),
            "Medium" => Ok(Priority::Medium),
            "High" => Ok(Priority::High),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pricing recommendation row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationRow {
    pub id: String,
    pub product: String,
    pub impact: String,
    pub priority: Priority,
    /// Model confidence in [0, 1]
    pub confidence: f64,
}

// ============================================================================
// Dashboard KPI counts
// ============================================================================

/// Aggregate counts shown on the dashboard
#[derive(Debug, Clone, Default, Serialize)]
pub struct KpiCounts {
    pub products: u64,
    pub competitors: u64,
    pub recommendations: u64,
}
