use async_trait::async_trait;
use sqlx::Row;

use crate::application::ports::cart_repository::CartRepository;
use crate::domain::cart::cart_item::{CartItem, CartLine};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::product_repository_sqlx::fetch_products_by_ids;

pub struct SqlxCartRepository {
    pub pool: PgPool,
}

impl SqlxCartRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for SqlxCartRepository {
    async fn list(&self, user_id: i64) -> anyhow::Result<Vec<CartLine>> {
        let rows = sqlx::query(
            r#"SELECT user_id, product_id, quantity
               FROM cart_items WHERE user_id = $1
               ORDER BY created_at, product_id"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        let items = rows
            .iter()
            .map(|row| -> anyhow::Result<CartItem> {
                Ok(CartItem {
                    user_id: row.try_get("user_id")?,
                    product_id: row.try_get("product_id")?,
                    quantity: row.try_get("quantity")?,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        let ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
        let mut products = fetch_products_by_ids(&self.pool, &ids).await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let product = products.remove(&item.product_id)?;
                Some(CartLine { item, product })
            })
            .collect())
    }

    async fn insert(&self, item: &CartItem) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"INSERT INTO cart_items (user_id, product_id, quantity) VALUES ($1, $2, $3)
               ON CONFLICT (user_id, product_id) DO NOTHING"#,
        )
        .bind(item.user_id)
        .bind(item.product_id)
        .bind(item.quantity)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn remove(&self, user_id: i64, product_ids: &[i64]) -> anyhow::Result<u64> {
        if product_ids.is_empty() {
            return Ok(0);
        }
        let res = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = ANY($2)")
            .bind(user_id)
            .bind(product_ids)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn set_quantity(
        &self,
        user_id: i64,
        product_id: i64,
        quantity: i32,
    ) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE cart_items SET quantity = $3 WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }
}
