use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::jwt::{JwtService, TokenPair};
use crate::application::services::passwords::verify_password;
use crate::application::use_cases::users::normalize_email;

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub jwt: &'a JwtService,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    pub async fn execute(&self, email: &str, password: &str) -> ServiceResult<TokenPair> {
        let user = match self.repo.find_by_email(&normalize_email(email)).await? {
            Some(u) => u,
            None => return Err(ServiceError::bad_request("wrong email or password")),
        };
        if !verify_password(password, &user.password_hash) {
            return Err(ServiceError::bad_request("wrong email or password"));
        }
        Ok(self.jwt.issue_pair(&user)?)
    }
}
