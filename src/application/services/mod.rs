pub mod email_templates;
pub mod jwt;
pub mod passwords;
pub mod verification;
