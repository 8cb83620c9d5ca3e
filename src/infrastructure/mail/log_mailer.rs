use async_trait::async_trait;

use crate::application::ports::mailer::Mailer;

/// Used when SMTP is not configured: messages are written to the log instead.
#[derive(Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> anyhow::Result<()> {
        tracing::info!(
            to = %to,
            subject = %subject,
            body_len = html_body.len(),
            "smtp not configured; email not sent"
        );
        tracing::debug!(to = %to, body = %html_body, "unsent email body");
        Ok(())
    }
}
