//! SQLite implementation of the repository traits
//!
//! Thin delegation onto the free functions in `repositories`; the trait
//! objects are what the API layer holds.

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::repositories::{
    organization, price_event, price_history, product, recommendation, user,
};
use crate::data::error::DataError;
use crate::data::traits::{CatalogRepository, DirectoryRepository};
use crate::data::types::{
    ListProductsParams, ListUsersParams, NewPriceEvent, NewProduct, NewUser, OrganizationRow,
    PriceEventRow, PriceObservationRow, ProductKey, ProductPatch, ProductRow, RecommendationRow,
    UserPatch, UserRow,
};

/// SQLite-backed repository implementing both store traits
#[derive(Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DirectoryRepository for SqliteRepository {
    async fn list_users(&self, params: &ListUsersParams) -> Result<Vec<UserRow>, DataError> {
        Ok(user::list_users(&self.pool, params).await?)
    }

    async fn get_user(&self, uid: &str) -> Result<Option<UserRow>, DataError> {
        Ok(user::get_user(&self.pool, uid).await?)
    }

    async fn upsert_user(&self, new_user: &NewUser) -> Result<UserRow, DataError> {
        Ok(user::upsert_user(&self.pool, new_user).await?)
    }

    async fn update_user(
        &self,
        uid: &str,
        patch: &UserPatch,
    ) -> Result<Option<UserRow>, DataError> {
        Ok(user::update_user(&self.pool, uid, patch).await?)
    }

    async fn delete_user(&self, uid: &str) -> Result<bool, DataError> {
        Ok(user::delete_user(&self.pool, uid).await?)
    }

    async fn list_organizations(&self) -> Result<Vec<OrganizationRow>, DataError> {
        Ok(organization::list_organizations(&self.pool).await?)
    }

    async fn get_organization(&self, domain: &str) -> Result<Option<OrganizationRow>, DataError> {
        Ok(organization::get_organization(&self.pool, domain).await?)
    }

    async fn upsert_organization(
        &self,
        domain: &str,
        admin_uid: &str,
    ) -> Result<OrganizationRow, DataError> {
        Ok(organization::upsert_organization(&self.pool, domain, admin_uid).await?)
    }
}

#[async_trait]
impl CatalogRepository for SqliteRepository {
    async fn list_products(
        &self,
        params: &ListProductsParams,
    ) -> Result<(Vec<ProductRow>, u64), DataError> {
        Ok(product::list_products(&self.pool, params).await?)
    }

    async fn get_product(&self, key: &ProductKey) -> Result<Option<ProductRow>, DataError> {
        Ok(product::get_product(&self.pool, key).await?)
    }

    async fn create_product(&self, item: &NewProduct) -> Result<ProductRow, DataError> {
        Ok(product::create_product(&self.pool, item).await?)
    }

    async fn create_products_bulk(
        &self,
        items: &[NewProduct],
    ) -> Result<Vec<ProductRow>, DataError> {
        Ok(product::create_products_bulk(&self.pool, items).await?)
    }

    async fn update_product(
        &self,
        key: &ProductKey,
        patch: &ProductPatch,
    ) -> Result<Option<ProductRow>, DataError> {
        Ok(product::update_product(&self.pool, key, patch).await?)
    }

    async fn delete_product(&self, key: &ProductKey) -> Result<bool, DataError> {
        Ok(product::delete_product(&self.pool, key).await?)
    }

    async fn count_products(&self) -> Result<u64, DataError> {
        Ok(product::count_products(&self.pool).await?)
    }

    async fn list_observations(
        &self,
        product_id: &str,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Vec<PriceObservationRow>, DataError> {
        Ok(price_history::list_observations(&self.pool, product_id, from, to).await?)
    }

    async fn list_recent_observations(
        &self,
        from: &str,
    ) -> Result<Vec<PriceObservationRow>, DataError> {
        Ok(price_history::list_recent_observations(&self.pool, from).await?)
    }

    async fn count_distinct_competitors(&self) -> Result<u64, DataError> {
        Ok(price_history::count_distinct_competitors(&self.pool).await?)
    }

    async fn insert_event(&self, event: &NewPriceEvent) -> Result<PriceEventRow, DataError> {
        Ok(price_event::insert_event(&self.pool, event).await?)
    }

    async fn list_events(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<PriceEventRow>, u64), DataError> {
        Ok(price_event::list_events(&self.pool, page, page_size).await?)
    }

    async fn list_recommendations(&self, limit: u32) -> Result<Vec<RecommendationRow>, DataError> {
        Ok(recommendation::list_recommendations(&self.pool, limit).await?)
    }

    async fn get_recommendation(
        &self,
        id: &str,
    ) -> Result<Option<RecommendationRow>, DataError> {
        Ok(recommendation::get_recommendation(&self.pool, id).await?)
    }

    async fn count_recommendations(&self) -> Result<u64, DataError> {
        Ok(recommendation::count_recommendations(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_repo() -> SqliteRepository {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query(crate::data::sqlite::schema::SCHEMA)
            .execute(&pool)
            .await
            .unwrap();
        SqliteRepository::new(pool)
    }

    #[tokio::test]
    async fn test_trait_object_dispatch() {
        let repo = setup_repo().await;
        let catalog: &dyn CatalogRepository = &repo;
        let directory: &dyn DirectoryRepository = &repo;

        assert_eq!(catalog.count_products().await.unwrap(), 0);
        assert!(directory.get_user("none").await.unwrap().is_none());
    }
}
