pub mod delete_user;
pub mod get_user;
pub mod list_users;
pub mod login;
pub mod refresh_tokens;
pub mod register;
pub mod request_password_reset;
pub mod resend_verification;
pub mod reset_password;
pub mod update_profile;
pub mod verify_email;

use chrono::{Duration, Utc};

use crate::application::ports::mailer::Mailer;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::email_templates::verification_email;
use crate::application::services::verification::{generate_code, hash_code};
use crate::domain::users::user::User;

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Stores a fresh code for the user and emails it.
pub(crate) async fn issue_verification_code<R, M>(
    repo: &R,
    mailer: &M,
    user: &User,
    ttl: Duration,
) -> anyhow::Result<()>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    let code = generate_code();
    repo.store_verification_code(user.id, &hash_code(&code), Utc::now() + ttl)
        .await?;
    let mail = verification_email(&user.name, &code, ttl.num_minutes());
    mailer.send(&user.email, &mail.subject, &mail.html).await
}
