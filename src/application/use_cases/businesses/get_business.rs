use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;
use crate::domain::businesses::business::Business;

pub struct GetBusiness<'a, R: BusinessRepository + ?Sized> {
    pub repo: &'a R,
}

fn missing() -> ServiceError {
    ServiceError::not_found("business not found")
}

impl<'a, R: BusinessRepository + ?Sized> GetBusiness<'a, R> {
    pub async fn execute(&self, id: i64) -> ServiceResult<Business> {
        self.repo.get(id).await?.ok_or_else(missing)
    }

    pub async fn by_inn(&self, inn: i64) -> ServiceResult<Business> {
        self.repo.find_by_inn(inn).await?.ok_or_else(missing)
    }

    pub async fn by_ogrn(&self, ogrn: i64) -> ServiceResult<Business> {
        self.repo.find_by_ogrn(ogrn).await?.ok_or_else(missing)
    }
}
