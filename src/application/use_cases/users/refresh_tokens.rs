use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::jwt::{JwtService, TokenKind, TokenPair};

pub struct RefreshTokens<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub jwt: &'a JwtService,
}

impl<'a, R: UserRepository + ?Sized> RefreshTokens<'a, R> {
    /// Role is reloaded from the store so promotions and demotions take effect on refresh.
    pub async fn execute(&self, refresh_token: &str) -> ServiceResult<TokenPair> {
        let claims = self
            .jwt
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|_| ServiceError::bad_request("invalid refresh token"))?;
        let user = self
            .repo
            .find_by_id(claims.user_id)
            .await?
            .ok_or_else(|| ServiceError::bad_request("invalid refresh token"))?;
        Ok(self.jwt.issue_pair(&user)?)
    }
}
