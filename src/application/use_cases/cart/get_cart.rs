use crate::application::error::ServiceResult;
use crate::application::ports::cart_repository::CartRepository;
use crate::domain::cart::cart_item::CartLine;

pub struct GetCart<'a, C: CartRepository + ?Sized> {
    pub carts: &'a C,
}

impl<'a, C: CartRepository + ?Sized> GetCart<'a, C> {
    pub async fn execute(&self, user_id: i64) -> ServiceResult<Vec<CartLine>> {
        Ok(self.carts.list(user_id).await?)
    }
}
