use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::product_repository::ProductRepository;
use crate::domain::products::product::ProductImage;

pub struct ListProductImages<'a, P: ProductRepository + ?Sized> {
    pub products: &'a P,
}

impl<'a, P: ProductRepository + ?Sized> ListProductImages<'a, P> {
    pub async fn execute(&self, product_id: i64) -> ServiceResult<Vec<ProductImage>> {
        if self.products.get(product_id).await?.is_none() {
            return Err(ServiceError::not_found("product not found"));
        }
        Ok(self.products.list_images(product_id).await?)
    }
}
