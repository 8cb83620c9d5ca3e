use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{User, UserProfilePatch};

pub struct UpdateProfile<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: UserRepository + ?Sized> UpdateProfile<'a, R> {
    pub async fn execute(&self, user_id: i64, patch: &UserProfilePatch) -> ServiceResult<User> {
        let blank = |v: &Option<String>| v.as_deref().is_some_and(|s| s.trim().is_empty());
        if blank(&patch.name) || blank(&patch.surname) {
            return Err(ServiceError::bad_request("name and surname cannot be blank"));
        }
        self.repo
            .update_profile(user_id, patch)
            .await?
            .ok_or_else(|| ServiceError::not_found("user not found"))
    }
}
