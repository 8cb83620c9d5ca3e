use chrono::{Duration, NaiveDate};

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::mailer::Mailer;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::passwords::{MIN_PASSWORD_LEN, hash_password};
use crate::application::use_cases::users::{issue_verification_code, normalize_email};
use crate::domain::users::user::{NewUser, User};

pub struct Register<'a, R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub repo: &'a R,
    pub mailer: &'a M,
    pub code_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub name: String,
    pub patronymic: String,
    pub surname: String,
    pub email: String,
    pub password: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl<'a, R, M> Register<'a, R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub async fn execute(&self, input: &RegisterInput) -> ServiceResult<User> {
        let email = normalize_email(&input.email);
        if input.name.trim().is_empty() || input.surname.trim().is_empty() {
            return Err(ServiceError::bad_request("name and surname are required"));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::bad_request(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        if self.repo.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::conflict("email already registered"));
        }

        let new_user = NewUser {
            name: input.name.trim().to_string(),
            patronymic: input.patronymic.trim().to_string(),
            surname: input.surname.trim().to_string(),
            email,
            password_hash: hash_password(&input.password)?,
            date_of_birth: input.date_of_birth,
        };
        // The unique index still decides when two registrations race.
        let user = self
            .repo
            .create_user(&new_user)
            .await?
            .ok_or_else(|| ServiceError::conflict("email already registered"))?;

        if let Err(e) = issue_verification_code(self.repo, self.mailer, &user, self.code_ttl).await
        {
            tracing::warn!(user_id = user.id, error = ?e, "verification_email_failed");
        }
        Ok(user)
    }
}
