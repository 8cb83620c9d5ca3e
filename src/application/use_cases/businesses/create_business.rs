use crate::application::access::Actor;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;
use crate::domain::businesses::business::{Business, NewBusiness, is_valid_inn_number};

pub struct CreateBusiness<'a, R: BusinessRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: BusinessRepository + ?Sized> CreateBusiness<'a, R> {
    pub async fn execute(&self, actor: &Actor, input: &NewBusiness) -> ServiceResult<Business> {
        if !is_valid_inn_number(input.inn) {
            return Err(ServiceError::bad_request("inn must be a positive number of at most 12 digits"));
        }
        if input.short_name.trim().is_empty() || input.full_name.trim().is_empty() {
            return Err(ServiceError::bad_request("short_name and full_name are required"));
        }
        let business = self
            .repo
            .create_for_user(actor.user_id, input)
            .await?
            .ok_or_else(|| ServiceError::conflict("business with this inn or ogrn already exists"))?;
        tracing::info!(business_id = business.id, user_id = actor.user_id, "business_created");
        Ok(business)
    }
}
