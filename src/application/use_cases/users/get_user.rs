use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;
use crate::application::use_cases::users::normalize_email;
use crate::domain::users::user::User;

pub struct GetUser<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> GetUser<'a, R> {
    pub async fn execute(&self, id: i64) -> ServiceResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user not found"))
    }

    pub async fn by_email(&self, email: &str) -> ServiceResult<User> {
        self.repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(|| ServiceError::not_found("user not found"))
    }
}
