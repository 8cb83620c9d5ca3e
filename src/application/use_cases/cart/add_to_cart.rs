use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::cart_repository::CartRepository;
use crate::application::ports::product_repository::ProductRepository;
use crate::domain::cart::cart_item::CartItem;

pub struct AddToCart<'a, C, P>
where
    C: CartRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub carts: &'a C,
    pub products: &'a P,
}

impl<'a, C, P> AddToCart<'a, C, P>
where
    C: CartRepository + ?Sized,
    P: ProductRepository + ?Sized,
{
    pub async fn execute(&self, user_id: i64, product_id: i64, quantity: i32) -> ServiceResult<CartItem> {
        if quantity < 1 {
            return Err(ServiceError::bad_request("quantity must be at least 1"));
        }
        if self.products.get(product_id).await?.is_none() {
            return Err(ServiceError::not_found("product not found"));
        }
        let item = CartItem {
            user_id,
            product_id,
            quantity,
        };
        if !self.carts.insert(&item).await? {
            return Err(ServiceError::conflict("product already in cart"));
        }
        Ok(item)
    }
}
