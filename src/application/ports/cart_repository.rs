use async_trait::async_trait;

use crate::domain::cart::cart_item::{CartItem, CartLine};

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn list(&self, user_id: i64) -> anyhow::Result<Vec<CartLine>>;
    /// Returns `false` when the product already is in the cart.
    async fn insert(&self, item: &CartItem) -> anyhow::Result<bool>;
    async fn remove(&self, user_id: i64, product_ids: &[i64]) -> anyhow::Result<u64>;
    /// Returns `false` when the product is not in the cart.
    async fn set_quantity(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> anyhow::Result<bool>;
}
