use crate::application::access::{Actor, ensure_business_manager};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;
use crate::application::ports::file_store::FileStore;
use crate::application::ports::product_repository::ProductRepository;

pub struct DeleteProductImage<'a, P, B, F>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub products: &'a P,
    pub businesses: &'a B,
    pub files: &'a F,
}

impl<'a, P, B, F> DeleteProductImage<'a, P, B, F>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, image_id: i64) -> ServiceResult<()> {
        let image = self
            .products
            .get_image(image_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("image not found"))?;
        let product = self
            .products
            .get(image.product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product not found"))?;
        ensure_business_manager(self.businesses, actor, product.business_id).await?;
        let removed = self
            .products
            .delete_image(image_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("image not found"))?;
        if let Err(err) = self.files.delete(&removed.file_key).await {
            tracing::warn!(image_id, key = %removed.file_key, error = ?err, "failed to remove image object");
        }
        Ok(())
    }
}
