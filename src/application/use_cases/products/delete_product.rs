use crate::application::access::{Actor, ensure_business_manager};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;
use crate::application::ports::file_store::FileStore;
use crate::application::ports::product_repository::{ProductDeletion, ProductRepository};

pub struct DeleteProduct<'a, P, B, F>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub products: &'a P,
    pub businesses: &'a B,
    pub files: &'a F,
}

impl<'a, P, B, F> DeleteProduct<'a, P, B, F>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, id: i64) -> ServiceResult<()> {
        let product = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product not found"))?;
        ensure_business_manager(self.businesses, actor, product.business_id).await?;
        let images = match self.products.delete(id).await? {
            ProductDeletion::Deleted(images) => images,
            ProductDeletion::NotFound => return Err(ServiceError::not_found("product not found")),
            ProductDeletion::Ordered => {
                return Err(ServiceError::conflict(
                    "product appears in orders; set its quantity to 0 instead",
                ));
            }
        };
        for image in images {
            if let Err(err) = self.files.delete(&image.file_key).await {
                tracing::warn!(product_id = id, key = %image.file_key, error = ?err, "failed to remove product image object");
            }
        }
        Ok(())
    }
}
