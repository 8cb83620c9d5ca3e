use crate::application::access::{Actor, ensure_business_manager};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::BusinessRepository;
use crate::application::ports::user_repository::UserRepository;

pub struct AddMember<'a, B, U>
where
    B: BusinessRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub businesses: &'a B,
    pub users: &'a U,
}

impl<'a, B, U> AddMember<'a, B, U>
where
    B: BusinessRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, business_id: i64, user_id: i64) -> ServiceResult<()> {
        if self.businesses.get(business_id).await?.is_none() {
            return Err(ServiceError::not_found("business not found"));
        }
        ensure_business_manager(self.businesses, actor, business_id).await?;
        if self.users.find_by_id(user_id).await?.is_none() {
            return Err(ServiceError::not_found("user not found"));
        }
        if !self.businesses.add_member(business_id, user_id).await? {
            return Err(ServiceError::conflict("user already belongs to this business"));
        }
        Ok(())
    }
}
