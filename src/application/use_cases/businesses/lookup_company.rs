use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::company_registry::CompanyRegistry;
use crate::domain::businesses::business::is_valid_inn;

pub struct LookupCompany<'a, C: CompanyRegistry + ?Sized> {
    pub registry: Option<&'a C>,
}

impl<'a, C: CompanyRegistry + ?Sized> LookupCompany<'a, C> {
    pub async fn execute(&self, inn: &str) -> ServiceResult<serde_json::Value> {
        let inn = inn.trim();
        if !is_valid_inn(inn) {
            return Err(ServiceError::bad_request("inn must have 10 or 12 digits"));
        }
        let registry = self
            .registry
            .ok_or_else(|| ServiceError::Unavailable("company registry is not configured".into()))?;
        registry
            .find_by_inn(inn)
            .await
            .map_err(|e| ServiceError::upstream("company registry request failed", e))
    }
}
