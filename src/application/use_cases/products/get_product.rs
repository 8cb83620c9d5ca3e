use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::product_repository::ProductRepository;
use crate::domain::products::product::Product;

pub struct GetProduct<'a, P: ProductRepository + ?Sized> {
    pub products: &'a P,
}

impl<'a, P: ProductRepository + ?Sized> GetProduct<'a, P> {
    pub async fn execute(&self, id: i64) -> ServiceResult<Product> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product not found"))
    }
}
