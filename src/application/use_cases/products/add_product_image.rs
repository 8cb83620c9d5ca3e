use crate::application::access::{Actor, ensure_business_manager};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;
use crate::application::ports::file_store::{FileArea, FileStore, Upload};
use crate::application::ports::product_repository::ProductRepository;
use crate::application::use_cases::products::store_image;
use crate::domain::products::product::{NewProductImage, ProductImage};

pub struct AddProductImage<'a, P, B, F>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub products: &'a P,
    pub businesses: &'a B,
    pub files: &'a F,
}

impl<'a, P, B, F> AddProductImage<'a, P, B, F>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        product_id: i64,
        upload: Upload,
        is_primary: bool,
    ) -> ServiceResult<ProductImage> {
        let product = self
            .products
            .get(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product not found"))?;
        ensure_business_manager(self.businesses, actor, product.business_id).await?;
        let stored = store_image(self.files, FileArea::Products, upload).await?;
        let image = NewProductImage {
            product_id,
            file_key: stored.key.clone(),
            url: stored.url,
            is_primary,
        };
        match self.products.add_image(&image).await {
            Ok(image) => Ok(image),
            Err(e) => {
                if let Err(cleanup) = self.files.delete(&stored.key).await {
                    tracing::warn!(key = %stored.key, error = ?cleanup, "orphaned_upload");
                }
                Err(e.into())
            }
        }
    }
}
