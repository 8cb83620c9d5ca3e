use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::product_repository::ProductRepository;
use crate::domain::products::product::ProductReview;

pub struct ListReviews<'a, P: ProductRepository + ?Sized> {
    pub products: &'a P,
}

impl<'a, P: ProductRepository + ?Sized> ListReviews<'a, P> {
    pub async fn execute(&self, product_id: i64) -> ServiceResult<Vec<ProductReview>> {
        if self.products.get(product_id).await?.is_none() {
            return Err(ServiceError::not_found("product not found"));
        }
        Ok(self.products.list_reviews(product_id).await?)
    }
}
