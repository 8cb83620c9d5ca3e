use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::ports::business_repository::{
    BusinessDeletion, BusinessRepository, BusinessUpdate,
};
use crate::domain::businesses::business::{Business, BusinessPatch, NewBusiness};
use crate::domain::users::user::User;
use crate::infrastructure::db::repositories::product_repository_sqlx::map_image;
use crate::infrastructure::db::repositories::user_repository_sqlx::map_user;
use crate::infrastructure::db::{PgPool, is_unique_violation};

const BUSINESS_COLUMNS: &str =
    "id, inn, ogrn, owner, short_name, full_name, address, created_at, updated_at";

pub struct SqlxBusinessRepository {
    pub pool: PgPool,
}

impl SqlxBusinessRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, column: &str, value: i64) -> anyhow::Result<Option<Business>> {
        let sql = format!("SELECT {BUSINESS_COLUMNS} FROM businesses WHERE {column} = $1");
        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_business).transpose()
    }
}

fn map_business(row: &PgRow) -> anyhow::Result<Business> {
    Ok(Business {
        id: row.try_get("id")?,
        inn: row.try_get("inn")?,
        ogrn: row.try_get("ogrn")?,
        owner: row.try_get("owner")?,
        short_name: row.try_get("short_name")?,
        full_name: row.try_get("full_name")?,
        address: row.try_get("address")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl BusinessRepository for SqlxBusinessRepository {
    async fn create_for_user(
        &self,
        owner_user_id: i64,
        business: &NewBusiness,
    ) -> anyhow::Result<Option<Business>> {
        let mut tx = self.pool.begin().await?;
        let sql = format!(
            "INSERT INTO businesses (inn, ogrn, owner, short_name, full_name, address)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {BUSINESS_COLUMNS}"
        );
        let inserted = sqlx::query(&sql)
            .bind(business.inn)
            .bind(business.ogrn)
            .bind(&business.owner)
            .bind(&business.short_name)
            .bind(&business.full_name)
            .bind(business.address.as_deref())
            .fetch_one(&mut *tx)
            .await;
        let row = match inserted {
            Ok(row) => row,
            Err(e) if is_unique_violation(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let created = map_business(&row)?;
        sqlx::query("INSERT INTO user_businesses (user_id, business_id) VALUES ($1, $2)")
            .bind(owner_user_id)
            .bind(created.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(created))
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Business>> {
        self.fetch_one_by("id", id).await
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Business>> {
        let sql = format!("SELECT {BUSINESS_COLUMNS} FROM businesses ORDER BY id");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(map_business).collect()
    }

    async fn update(&self, id: i64, patch: &BusinessPatch) -> anyhow::Result<BusinessUpdate> {
        let sql = format!(
            "UPDATE businesses SET
                inn = COALESCE($2, inn),
                ogrn = COALESCE($3, ogrn),
                owner = COALESCE($4, owner),
                short_name = COALESCE($5, short_name),
                full_name = COALESCE($6, full_name),
                address = COALESCE($7, address),
                updated_at = now()
             WHERE id = $1
             RETURNING {BUSINESS_COLUMNS}"
        );
        let res = sqlx::query(&sql)
            .bind(id)
            .bind(patch.inn)
            .bind(patch.ogrn)
            .bind(patch.owner.as_deref())
            .bind(patch.short_name.as_deref())
            .bind(patch.full_name.as_deref())
            .bind(patch.address.as_deref())
            .fetch_optional(&self.pool)
            .await;
        match res {
            Ok(Some(row)) => Ok(BusinessUpdate::Updated(map_business(&row)?)),
            Ok(None) => Ok(BusinessUpdate::NotFound),
            Err(e) if is_unique_violation(&e) => Ok(BusinessUpdate::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: i64) -> anyhow::Result<BusinessDeletion> {
        let mut tx = self.pool.begin().await?;
        let exists = sqlx::query("SELECT id FROM businesses WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(BusinessDeletion::NotFound);
        }
        // Locking the products keeps concurrent orders out until the delete commits.
        sqlx::query("SELECT id FROM products WHERE business_id = $1 ORDER BY id FOR UPDATE")
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;
        let ordered: bool = sqlx::query_scalar(
            r#"SELECT EXISTS(
                   SELECT 1 FROM order_items oi
                   JOIN products p ON p.id = oi.product_id
                   WHERE p.business_id = $1)"#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        if ordered {
            return Ok(BusinessDeletion::Ordered);
        }
        let image_rows = sqlx::query(
            r#"SELECT i.id, i.product_id, i.file_key, i.url, i.is_primary
               FROM product_images i
               JOIN products p ON p.id = i.product_id
               WHERE p.business_id = $1"#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        let images = image_rows
            .iter()
            .map(map_image)
            .collect::<anyhow::Result<Vec<_>>>()?;
        // members, products and everything hanging off them cascade
        sqlx::query("DELETE FROM businesses WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(BusinessDeletion::Deleted(images))
    }

    async fn find_by_inn(&self, inn: i64) -> anyhow::Result<Option<Business>> {
        self.fetch_one_by("inn", inn).await
    }

    async fn find_by_ogrn(&self, ogrn: i64) -> anyhow::Result<Option<Business>> {
        self.fetch_one_by("ogrn", ogrn).await
    }

    async fn list_for_user(&self, user_id: i64) -> anyhow::Result<Vec<Business>> {
        let rows = sqlx::query(
            r#"SELECT b.id, b.inn, b.ogrn, b.owner, b.short_name, b.full_name, b.address,
                      b.created_at, b.updated_at
               FROM businesses b
               JOIN user_businesses ub ON ub.business_id = b.id
               WHERE ub.user_id = $1
               ORDER BY b.id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_business).collect()
    }

    async fn list_members(&self, business_id: i64) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query(
            r#"SELECT u.id, u.name, u.patronymic, u.surname, u.email, u.password_hash,
                      u.date_of_birth, u.is_email_verified, u.role, u.created_at, u.updated_at
               FROM users u
               JOIN user_businesses ub ON ub.user_id = u.id
               WHERE ub.business_id = $1
               ORDER BY u.id"#,
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_user).collect()
    }

    async fn add_member(&self, business_id: i64, user_id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"INSERT INTO user_businesses (user_id, business_id) VALUES ($1, $2)
               ON CONFLICT DO NOTHING"#,
        )
        .bind(user_id)
        .bind(business_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn remove_member(&self, business_id: i64, user_id: i64) -> anyhow::Result<bool> {
        let res =
            sqlx::query("DELETE FROM user_businesses WHERE user_id = $1 AND business_id = $2")
                .bind(user_id)
                .bind(business_id)
                .execute(&self.pool)
                .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn is_member(&self, user_id: i64, business_id: i64) -> anyhow::Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM user_businesses WHERE user_id = $1 AND business_id = $2)",
        )
        .bind(user_id)
        .bind(business_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
