use crate::application::access::Actor;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::product_repository::ProductRepository;
use crate::domain::products::product::{NewReview, ProductReview};

pub struct AddReview<'a, P: ProductRepository + ?Sized> {
    pub products: &'a P,
}

impl<'a, P: ProductRepository + ?Sized> AddReview<'a, P> {
    pub async fn execute(
        &self,
        actor: &Actor,
        product_id: i64,
        rating: i16,
        text: &str,
    ) -> ServiceResult<ProductReview> {
        if !(1..=5).contains(&rating) {
            return Err(ServiceError::bad_request("rating must be between 1 and 5"));
        }
        if self.products.get(product_id).await?.is_none() {
            return Err(ServiceError::not_found("product not found"));
        }
        let review = NewReview {
            product_id,
            user_id: actor.user_id,
            rating,
            text: text.trim().to_string(),
        };
        Ok(self.products.add_review(&review).await?)
    }
}
