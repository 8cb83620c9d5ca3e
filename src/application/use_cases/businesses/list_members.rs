use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;
use crate::domain::users::user::User;

pub struct ListMembers<'a, R: BusinessRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: BusinessRepository + ?Sized> ListMembers<'a, R> {
    pub async fn execute(&self, business_id: i64) -> ServiceResult<Vec<User>> {
        if self.repo.get(business_id).await?.is_none() {
            return Err(ServiceError::not_found("business not found"));
        }
        Ok(self.repo.list_members(business_id).await?)
    }
}
