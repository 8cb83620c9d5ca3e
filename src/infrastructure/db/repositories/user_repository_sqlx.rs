use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{NewUser, User, UserProfilePatch, UserRole, VerificationCode};
use crate::infrastructure::db::{PgPool, is_unique_violation};

pub(crate) const USER_COLUMNS: &str = "id, name, patronymic, surname, email, password_hash, \
     date_of_birth, is_email_verified, role, created_at, updated_at";

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn map_user(row: &PgRow) -> anyhow::Result<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        patronymic: row.try_get("patronymic")?,
        surname: row.try_get("surname")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        date_of_birth: row.try_get("date_of_birth")?,
        is_email_verified: row.try_get("is_email_verified")?,
        role: UserRole::parse(&role)
            .ok_or_else(|| anyhow::anyhow!("unknown user role {role:?}"))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_code(row: &PgRow) -> anyhow::Result<VerificationCode> {
    Ok(VerificationCode {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        code_hash: row.try_get("code_hash")?,
        sent_at: row.try_get("sent_at")?,
        expires_at: row.try_get("expires_at")?,
    })
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(&self, user: &NewUser) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "INSERT INTO users (name, patronymic, surname, email, password_hash, date_of_birth)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        );
        let res = sqlx::query(&sql)
            .bind(&user.name)
            .bind(&user.patronymic)
            .bind(&user.surname)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.date_of_birth)
            .fetch_one(&self.pool)
            .await;
        match res {
            Ok(row) => Ok(Some(map_user(&row)?)),
            Err(e) if is_unique_violation(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    async fn list_all(&self) -> anyhow::Result<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(map_user).collect()
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: &UserProfilePatch,
    ) -> anyhow::Result<Option<User>> {
        let sql = format!(
            "UPDATE users SET
                name = COALESCE($2, name),
                patronymic = COALESCE($3, patronymic),
                surname = COALESCE($4, surname),
                date_of_birth = COALESCE($5, date_of_birth),
                updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.name.as_deref())
            .bind(patch.patronymic.as_deref())
            .bind(patch.surname.as_deref())
            .bind(patch.date_of_birth)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_user).transpose()
    }

    async fn set_password_hash(&self, id: i64, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn mark_email_verified(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE users SET is_email_verified = TRUE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_user(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn store_verification_code(
        &self,
        user_id: i64,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> anyhow::Result<VerificationCode> {
        let row = sqlx::query(
            r#"INSERT INTO verification_codes (user_id, code_hash, expires_at)
               VALUES ($1, $2, $3)
               RETURNING id, user_id, code_hash, sent_at, expires_at"#,
        )
        .bind(user_id)
        .bind(code_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;
        map_code(&row)
    }

    async fn find_verification_code(
        &self,
        user_id: i64,
        code_hash: &str,
    ) -> anyhow::Result<Option<VerificationCode>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, code_hash, sent_at, expires_at
               FROM verification_codes
               WHERE user_id = $1 AND code_hash = $2
               ORDER BY expires_at DESC
               LIMIT 1"#,
        )
        .bind(user_id)
        .bind(code_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_code).transpose()
    }

    async fn delete_verification_codes(&self, user_id: i64) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM verification_codes WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
