use chrono::Utc;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::verification::hash_code;

pub struct VerifyEmail<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> VerifyEmail<'a, R> {
    pub async fn execute(&self, user_id: i64, code: &str) -> ServiceResult<()> {
        let stored = self
            .repo
            .find_verification_code(user_id, &hash_code(code))
            .await?
            .ok_or_else(|| ServiceError::bad_request("invalid verification code"))?;
        if stored.is_expired_at(Utc::now()) {
            return Err(ServiceError::bad_request("verification code expired"));
        }
        if !self.repo.mark_email_verified(user_id).await? {
            return Err(ServiceError::not_found("user not found"));
        }
        self.repo.delete_verification_codes(user_id).await?;
        Ok(())
    }
}
