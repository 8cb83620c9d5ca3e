use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::application::services::passwords::password_fingerprint;
use crate::domain::users::user::{User, UserRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    PasswordReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub role: String,
    pub kind: TokenKind,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    /// Password fingerprint, set on password reset tokens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwd: Option<String>,
}

impl Claims {
    pub fn role(&self) -> UserRole {
        UserRole::parse(&self.role).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is invalid or expired")]
    Invalid,
    #[error("token was issued for another purpose")]
    WrongKind,
}

#[derive(Debug, Clone, Copy)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub password_reset: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(120),
            refresh: Duration::hours(24 * 7 * 30),
            password_reset: Duration::minutes(20),
        }
    }
}

/// HS256 token issuance and validation for access, refresh and password reset tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    lifetimes: TokenLifetimes,
}

impl JwtService {
    pub fn new(secret: &str, issuer: &str, lifetimes: TokenLifetimes) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.to_string(),
            lifetimes,
        }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    pub fn issue(&self, kind: TokenKind, user_id: i64, role: UserRole) -> anyhow::Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.lifetimes.access,
            TokenKind::Refresh => self.lifetimes.refresh,
            TokenKind::PasswordReset => self.lifetimes.password_reset,
        };
        self.issue_with_ttl(kind, user_id, role, ttl, None)
    }

    /// Reset token bound to the user's current password hash.
    pub fn issue_password_reset(&self, user: &User) -> anyhow::Result<String> {
        self.issue_with_ttl(
            TokenKind::PasswordReset,
            user.id,
            user.role,
            self.lifetimes.password_reset,
            Some(password_fingerprint(&user.password_hash)),
        )
    }

    fn issue_with_ttl(
        &self,
        kind: TokenKind,
        user_id: i64,
        role: UserRole,
        ttl: Duration,
        pwd: Option<String>,
    ) -> anyhow::Result<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            role: role.as_str().to_string(),
            kind,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            pwd,
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    pub fn issue_pair(&self, user: &User) -> anyhow::Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.issue(TokenKind::Access, user.id, user.role)?,
            refresh_token: self.issue(TokenKind::Refresh, user.id, user.role)?,
            token_type: "bearer",
        })
    }

    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?;
        if data.claims.kind != expected {
            return Err(TokenError::WrongKind);
        }
        Ok(data.claims)
    }
}
