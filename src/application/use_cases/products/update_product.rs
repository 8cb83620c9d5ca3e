use crate::application::access::{Actor, ensure_business_manager};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;
use crate::application::ports::product_repository::ProductRepository;
use crate::application::use_cases::products::prepare_draft;
use crate::domain::products::product::{Product, ProductDraft};

pub struct UpdateProduct<'a, P, B>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
{
    pub products: &'a P,
    pub businesses: &'a B,
}

impl<'a, P, B> UpdateProduct<'a, P, B>
where
    P: ProductRepository + ?Sized,
    B: BusinessRepository + ?Sized,
{
    pub async fn execute(
        &self,
        actor: &Actor,
        id: i64,
        mut draft: ProductDraft,
    ) -> ServiceResult<Product> {
        prepare_draft(&mut draft)?;
        let current = self
            .products
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product not found"))?;
        ensure_business_manager(self.businesses, actor, current.business_id).await?;
        if draft.business_id != current.business_id {
            // Moving a product requires rights on the receiving business too.
            if self.businesses.get(draft.business_id).await?.is_none() {
                return Err(ServiceError::not_found("business not found"));
            }
            ensure_business_manager(self.businesses, actor, draft.business_id).await?;
        }
        self.products
            .update(id, &draft)
            .await?
            .ok_or_else(|| ServiceError::not_found("product not found"))
    }
}
