use std::collections::{BTreeMap, HashSet};

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::cart_repository::CartRepository;
use crate::domain::cart::cart_item::CartLine;

pub struct SetCartQuantities<'a, C: CartRepository + ?Sized> {
    pub carts: &'a C,
}

impl<'a, C: CartRepository + ?Sized> SetCartQuantities<'a, C> {
    /// Every line is checked before any quantity is written.
    pub async fn execute(
        &self,
        user_id: i64,
        quantities: &BTreeMap<i64, i32>,
    ) -> ServiceResult<Vec<CartLine>> {
        if let Some((product_id, _)) = quantities.iter().find(|(_, q)| **q < 1) {
            return Err(ServiceError::bad_request(format!(
                "quantity for product {product_id} must be at least 1"
            )));
        }
        let in_cart: HashSet<i64> = self
            .carts
            .list(user_id)
            .await?
            .iter()
            .map(|line| line.item.product_id)
            .collect();
        if let Some(product_id) = quantities.keys().find(|id| !in_cart.contains(id)) {
            return Err(ServiceError::not_found(format!(
                "product {product_id} is not in the cart"
            )));
        }
        for (product_id, quantity) in quantities {
            self.carts
                .set_quantity(user_id, *product_id, *quantity)
                .await?;
        }
        Ok(self.carts.list(user_id).await?)
    }
}
