use crate::application::access::Actor;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::file_store::{FileArea, FileStore, Upload};
use crate::application::ports::product_repository::ProductRepository;
use crate::application::use_cases::products::store_image;
use crate::domain::products::product::ReviewImage;

pub struct AddReviewImage<'a, P, F>
where
    P: ProductRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub products: &'a P,
    pub files: &'a F,
}

impl<'a, P, F> AddReviewImage<'a, P, F>
where
    P: ProductRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        review_id: i64,
        upload: Upload,
    ) -> ServiceResult<ReviewImage> {
        let review = self
            .products
            .get_review(review_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("review not found"))?;
        if review.user_id != actor.user_id && !actor.is_admin() {
            return Err(ServiceError::forbidden("only the author may attach images"));
        }
        let stored = store_image(self.files, FileArea::Reviews, upload).await?;
        Ok(self.products.add_review_image(review_id, &stored.url).await?)
    }
}
