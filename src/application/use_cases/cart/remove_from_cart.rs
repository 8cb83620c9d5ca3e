use crate::application::error::ServiceResult;
use crate::application::ports::cart_repository::CartRepository;

pub struct RemoveFromCart<'a, C: CartRepository + ?Sized> {
    pub carts: &'a C,
}

impl<'a, C: CartRepository + ?Sized> RemoveFromCart<'a, C> {
    /// Returns how many lines were removed; unknown ids are ignored.
    pub async fn execute(&self, user_id: i64, product_ids: &[i64]) -> ServiceResult<u64> {
        if product_ids.is_empty() {
            return Ok(0);
        }
        Ok(self.carts.remove(user_id, product_ids).await?)
    }
}
