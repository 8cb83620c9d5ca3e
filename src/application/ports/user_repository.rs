use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::users::user::{NewUser, User, UserProfilePatch, VerificationCode};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns `None` when the email is already taken.
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn list_all(&self) -> anyhow::Result<Vec<User>>;
    async fn update_profile(
        &self,
        id: i64,
        patch: &UserProfilePatch,
    ) -> anyhow::Result<Option<User>>;
    async fn set_password_hash(&self, id: i64, password_hash: &str) -> anyhow::Result<bool>;
    async fn mark_email_verified(&self, id: i64) -> anyhow::Result<bool>;
    async fn delete_user(&self, id: i64) -> anyhow::Result<bool>;

    async fn store_verification_code(
        &self,
        user_id: i64,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<VerificationCode>;
    /// Newest code of the user with the given hash.
    async fn find_verification_code(
        &self,
        user_id: i64,
        code_hash: &str,
    ) -> anyhow::Result<Option<VerificationCode>>;
    async fn delete_verification_codes(&self, user_id: i64) -> anyhow::Result<u64>;
}
