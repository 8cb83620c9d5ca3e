use chrono::Duration;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::mailer::Mailer;
use crate::application::ports::user_repository::UserRepository;
use crate::application::use_cases::users::issue_verification_code;

pub struct ResendVerification<'a, R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub repo: &'a R,
    pub mailer: &'a M,
    pub code_ttl: Duration,
}

impl<'a, R, M> ResendVerification<'a, R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(&self, user_id: i64) -> ServiceResult<()> {
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user not found"))?;
        if user.is_email_verified {
            return Err(ServiceError::conflict("email already verified"));
        }
        issue_verification_code(self.repo, self.mailer, &user, self.code_ttl)
            .await
            .map_err(|e| ServiceError::upstream("failed to send verification email", e))
    }
}
