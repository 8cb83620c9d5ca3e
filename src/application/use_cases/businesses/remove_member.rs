use crate::application::access::{Actor, ensure_business_manager};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;

pub struct RemoveMember<'a, R: BusinessRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: BusinessRepository + ?Sized> RemoveMember<'a, R> {
    pub async fn execute(&self, actor: &Actor, business_id: i64, user_id: i64) -> ServiceResult<()> {
        ensure_business_manager(self.repo, actor, business_id).await?;
        if !self.repo.remove_member(business_id, user_id).await? {
            return Err(ServiceError::not_found("user is not a member of this business"));
        }
        Ok(())
    }
}
