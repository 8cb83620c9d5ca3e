use crate::application::error::ServiceResult;
use crate::application::ports::mailer::Mailer;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::email_templates::{password_reset_email, password_reset_link};
use crate::application::services::jwt::JwtService;
use crate::application::use_cases::users::normalize_email;

pub struct RequestPasswordReset<'a, R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    pub repo: &'a R,
    pub mailer: &'a M,
    pub jwt: &'a JwtService,
    pub frontend_url: &'a str,
}

impl<'a, R, M> RequestPasswordReset<'a, R, M>
where
    R: UserRepository + ?Sized,
    M: Mailer + ?Sized,
{
    /// Succeeds whether or not the account exists.
    pub async fn execute(&self, email: &str) -> ServiceResult<()> {
        let Some(user) = self.repo.find_by_email(&normalize_email(email)).await? else {
            tracing::debug!("password_reset_unknown_email");
            return Ok(());
        };
        let token = self.jwt.issue_password_reset(&user)?;
        let link = password_reset_link(self.frontend_url, &token);
        let mail = password_reset_email(&user.name, &link);
        if let Err(e) = self.mailer.send(&user.email, &mail.subject, &mail.html).await {
            tracing::error!(user_id = user.id, error = ?e, "password_reset_email_failed");
        }
        Ok(())
    }
}
