use crate::application::access::{Actor, ensure_business_manager};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::{BusinessRepository, BusinessUpdate};
use crate::domain::businesses::business::{Business, BusinessPatch, is_valid_inn_number};

pub struct UpdateBusiness<'a, R: BusinessRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: BusinessRepository + ?Sized> UpdateBusiness<'a, R> {
    pub async fn execute(
        &self,
        actor: &Actor,
        id: i64,
        patch: &BusinessPatch,
    ) -> ServiceResult<Business> {
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("business not found"));
        }
        ensure_business_manager(self.repo, actor, id).await?;
        if patch.inn.is_some_and(|inn| !is_valid_inn_number(inn)) {
            return Err(ServiceError::bad_request("inn must be a positive number of at most 12 digits"));
        }
        match self.repo.update(id, patch).await? {
            BusinessUpdate::Updated(business) => Ok(business),
            BusinessUpdate::NotFound => Err(ServiceError::not_found("business not found")),
            BusinessUpdate::Duplicate => Err(ServiceError::conflict(
                "business with this inn or ogrn already exists",
            )),
        }
    }
}
