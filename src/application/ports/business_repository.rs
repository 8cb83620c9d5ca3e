use async_trait::async_trait;

use crate::domain::businesses::business::{Business, BusinessPatch, NewBusiness};
use crate::domain::products::product::ProductImage;
use crate::domain::users::user::User;

#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Creates the business and links `owner_user_id` as its first member.
    /// Returns `None` when the INN or OGRN is already registered.
    async fn create_for_user(
        &self,
        owner_user_id: i64,
        business: &NewBusiness,
    ) -> anyhow::Result<Option<Business>>;
    async fn get(&self, id: i64) -> anyhow::Result<Option<Business>>;
    async fn list_all(&self) -> anyhow::Result<Vec<Business>>;
    async fn update(&self, id: i64, patch: &BusinessPatch) -> anyhow::Result<BusinessUpdate>;
    /// Removes the business together with its products.
    async fn delete(&self, id: i64) -> anyhow::Result<BusinessDeletion>;
    async fn find_by_inn(&self, inn: i64) -> anyhow::Result<Option<Business>>;
    async fn find_by_ogrn(&self, ogrn: i64) -> anyhow::Result<Option<Business>>;
    async fn list_for_user(&self, user_id: i64) -> anyhow::Result<Vec<Business>>;
    async fn list_members(&self, business_id: i64) -> anyhow::Result<Vec<User>>;
    /// Returns `false` when the user already is a member.
    async fn add_member(&self, business_id: i64, user_id: i64) -> anyhow::Result<bool>;
    async fn remove_member(&self, business_id: i64, user_id: i64) -> anyhow::Result<bool>;
    async fn is_member(&self, user_id: i64, business_id: i64) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone)]
pub enum BusinessUpdate {
    Updated(Business),
    NotFound,
    /// The new INN or OGRN belongs to another business.
    Duplicate,
}

#[derive(Debug, Clone)]
pub enum BusinessDeletion {
    /// Carries the images of the removed products so their objects can be cleaned up.
    Deleted(Vec<ProductImage>),
    NotFound,
    /// Order history still references one of its products.
    Ordered,
}
