use crate::application::access::Actor;
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;

pub struct DeleteUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> DeleteUser<'a, R> {
    pub async fn execute(&self, actor: &Actor, user_id: i64) -> ServiceResult<()> {
        actor.ensure_self_or_admin(user_id)?;
        if !self.repo.delete_user(user_id).await? {
            return Err(ServiceError::not_found("user not found"));
        }
        tracing::info!(user_id, by = actor.user_id, "user_deleted");
        Ok(())
    }
}
