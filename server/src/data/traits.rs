//! Repository traits for store backends
//!
//! Two external stores back the service: the directory store holds identity
//! and organization records, the catalog store holds product, price, and
//! recommendation data. The SQLite backend implements both; the traits keep
//! the API layer independent of the concrete store.

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::{
    ListProductsParams, ListUsersParams, NewPriceEvent, NewProduct, NewUser, OrganizationRow,
    PriceEventRow, PriceObservationRow, ProductKey, ProductPatch, ProductRow, RecommendationRow,
    UserPatch, UserRow,
};

// ============================================================================
// Directory Repository Trait (users, organizations)
// ============================================================================

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn list_users(&self, params: &ListUsersParams) -> Result<Vec<UserRow>, DataError>;

    async fn get_user(&self, uid: &str) -> Result<Option<UserRow>, DataError>;

    async fn upsert_user(&self, user: &NewUser) -> Result<UserRow, DataError>;

    async fn update_user(
        &self,
        uid: &str,
        patch: &UserPatch,
    ) -> Result<Option<UserRow>, DataError>;

    async fn delete_user(&self, uid: &str) -> Result<bool, DataError>;

    async fn list_organizations(&self) -> Result<Vec<OrganizationRow>, DataError>;

    async fn get_organization(&self, domain: &str) -> Result<Option<OrganizationRow>, DataError>;

    async fn upsert_organization(
        &self,
        domain: &str,
        admin_uid: &str,
    ) -> Result<OrganizationRow, DataError>;
}

// ============================================================================
// Catalog Repository Trait (products, price data, recommendations)
// ============================================================================

#[async_trait]
pub trait CatalogRepository: Send + Sync {
    // ==================== Product Operations ====================

    async fn list_products(
        &self,
        params: &ListProductsParams,
    ) -> Result<(Vec<ProductRow>, u64), DataError>;

    async fn get_product(&self, key: &ProductKey) -> Result<Option<ProductRow>, DataError>;

    async fn create_product(&self, item: &NewProduct) -> Result<ProductRow, DataError>;

    /// All-or-nothing batch insert in a single transaction
    async fn create_products_bulk(
        &self,
        items: &[NewProduct],
    ) -> Result<Vec<ProductRow>, DataError>;

    async fn update_product(
        &self,
        key: &ProductKey,
        patch: &ProductPatch,
    ) -> Result<Option<ProductRow>, DataError>;

    async fn delete_product(&self, key: &ProductKey) -> Result<bool, DataError>;

    async fn count_products(&self) -> Result<u64, DataError>;

    // ==================== Price Observations ====================

    /// Observations for one product, oldest first, bounds inclusive
    async fn list_observations(
        &self,
        product_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<PriceObservationRow>, DataError>;

    /// Observations across all products since `from`, oldest first
    async fn list_recent_observations(
        &self,
        from: &str,
    ) -> Result<Vec<PriceObservationRow>, DataError>;

    async fn count_distinct_competitors(&self) -> Result<u64, DataError>;

    // ==================== Price Events ====================

    async fn insert_event(&self, event: &NewPriceEvent) -> Result<PriceEventRow, DataError>;

    async fn list_events(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<PriceEventRow>, u64), DataError>;

    // ==================== Recommendations ====================

    async fn list_recommendations(&self, limit: u32) -> Result<Vec<RecommendationRow>, DataError>;

    async fn get_recommendation(&self, id: &str)
    -> Result<Option<RecommendationRow>, DataError>;

    async fn count_recommendations(&self) -> Result<u64, DataError>;
}
