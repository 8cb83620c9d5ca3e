use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::jwt::{JwtService, TokenKind};
use crate::application::services::passwords::{MIN_PASSWORD_LEN, hash_password, password_fingerprint};

pub struct ResetPassword<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub jwt: &'a JwtService,
}

impl<'a, R: UserRepository + ?Sized> ResetPassword<'a, R> {
    /// A token is spent once the password changes.
    pub async fn execute(&self, token: &str, new_password: &str) -> ServiceResult<()> {
        let invalid = || ServiceError::bad_request("invalid or expired reset token");
        let claims = self
            .jwt
            .verify(token, TokenKind::PasswordReset)
            .map_err(|_| invalid())?;
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::bad_request(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let user = self
            .repo
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user not found"))?;
        if claims.pwd.as_deref() != Some(password_fingerprint(&user.password_hash).as_str()) {
            return Err(invalid());
        }
        let hash = hash_password(new_password)?;
        if !self.repo.set_password_hash(user.id, &hash).await? {
            return Err(ServiceError::not_found("user not found"));
        }
        tracing::info!(user_id = user.id, "password_reset");
        Ok(())
    }
}
