use chrono::{DateTime, NaiveDate, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserRole {
    #[default]
    User,
    SelfEmployed,
    Business,
    Admin,
    Support,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::SelfEmployed => "self-employed",
            UserRole::Business => "business",
            UserRole::Admin => "admin",
            UserRole::Support => "support",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(UserRole::User),
            "self-employed" => Some(UserRole::SelfEmployed),
            "business" => Some(UserRole::Business),
            "admin" => Some(UserRole::Admin),
            "support" => Some(UserRole::Support),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub patronymic: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub date_of_birth: Option<NaiveDate>,
    pub is_email_verified: bool,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub patronymic: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Fields a user may change on their own profile. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct UserProfilePatch {
    pub name: Option<String>,
    pub patronymic: Option<String>,
    pub surname: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct VerificationCode {
    pub id: i64,
    pub user_id: i64,
    pub code_hash: String,
    pub sent_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl VerificationCode {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_their_wire_names() {
        for role in [
            UserRole::User,
            UserRole::SelfEmployed,
            UserRole::Business,
            UserRole::Admin,
            UserRole::Support,
        ] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("root"), None);
    }

    #[test]
    fn verification_code_expires_at_its_deadline() {
        let now = Utc::now();
        let code = VerificationCode {
            id: 1,
            user_id: 1,
            code_hash: String::new(),
            sent_at: now - chrono::Duration::minutes(15),
            expires_at: now,
        };
        assert!(code.is_expired_at(now));
        assert!(!code.is_expired_at(now - chrono::Duration::seconds(1)));
    }
}
