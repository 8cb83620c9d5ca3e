use crate::application::access::{Actor, ensure_business_manager};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::use_cases::products::prepare_draft;
use crate::domain::products::product::{Product, ProductDraft};

pub struct CreateProduct<'a, P, B>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
{
    pub products: &'a P,
    pub businesses: &'a B,
}

impl<'a, P, B> CreateProduct<'a, P, B>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, mut draft: ProductDraft) -> ServiceResult<Product> {
        prepare_draft(&mut draft)?;
        if self.businesses.get(draft.business_id).await?.is_none() {
            return Err(ServiceError::not_found("business not found"));
        }
        ensure_business_manager(self.businesses, actor, draft.business_id).await?;
        let product = self.products.create(&draft).await?;
        tracing::info!(product_id = product.id, business_id = product.business_id, "product_created");
        Ok(product)
    }
}
