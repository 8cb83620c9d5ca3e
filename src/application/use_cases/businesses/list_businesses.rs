use crate::application::access::Actor;
use crate::application::error::ServiceResult;
use crate::application::ports::business_repository::BusinessRepository;
use crate::domain::businesses::business::Business;

pub struct ListBusinesses<'a, R: BusinessRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: BusinessRepository + ?Sized> ListBusinesses<'a, R> {
    pub async fn all(&self, actor: &Actor) -> ServiceResult<Vec<Business>> {
        actor.ensure_admin()?;
        Ok(self.repo.list_all().await?)
    }

    pub async fn for_user(&self, user_id: i64) -> ServiceResult<Vec<Business>> {
        Ok(self.repo.list_for_user(user_id).await?)
    }
}
