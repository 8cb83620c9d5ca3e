use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::ports::order_repository::{OrderRepository, PaymentEventOutcome};
use crate::domain::orders::order::{
    Order, OrderDetails, OrderItem, OrderItemDetails, OrderLine, OrderStatus, PlaceOrderOutcome,
    merge_lines,
};
use crate::domain::products::product::{discounted_price, max_amount};
use crate::infrastructure::db::PgPool;
use crate::infrastructure::db::repositories::product_repository_sqlx::fetch_products_by_ids;

const ORDER_COLUMNS: &str =
    "id, user_id, status, payment_confirmed, payment_id, total, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, order_id, product_id, quantity, price";

pub struct SqlxOrderRepository {
    pub pool: PgPool,
}

impl SqlxOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_order(row: &PgRow) -> anyhow::Result<Order> {
    let status: String = row.try_get("status")?;
    Ok(Order {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        status: OrderStatus::parse(&status)
            .ok_or_else(|| anyhow::anyhow!("unknown order status {status:?}"))?,
        payment_confirmed: row.try_get("payment_confirmed")?,
        payment_id: row.try_get("payment_id")?,
        total: row.try_get("total")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_item(row: &PgRow) -> anyhow::Result<OrderItem> {
    Ok(OrderItem {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        quantity: row.try_get("quantity")?,
        price: row.try_get("price")?,
    })
}

#[async_trait]
impl OrderRepository for SqlxOrderRepository {
    async fn place_order(
        &self,
        user_id: i64,
        lines: &[OrderLine],
    ) -> anyhow::Result<PlaceOrderOutcome> {
        let lines = merge_lines(lines)?;
        let ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();

        let mut tx = self.pool.begin().await?;
        // Rows are locked in id order so concurrent orders cannot deadlock.
        let rows = sqlx::query(
            r#"SELECT id, price, discount, quantity
               FROM products WHERE id = ANY($1)
               ORDER BY id
               FOR UPDATE"#,
        )
        .bind(&ids[..])
        .fetch_all(&mut *tx)
        .await?;
        let mut stock: HashMap<i64, (Decimal, i32, i32)> = HashMap::with_capacity(rows.len());
        for row in &rows {
            stock.insert(
                row.try_get("id")?,
                (
                    row.try_get("price")?,
                    row.try_get("discount")?,
                    row.try_get("quantity")?,
                ),
            );
        }

        let mut priced = Vec::with_capacity(lines.len());
        let mut total = Decimal::ZERO;
        for line in &lines {
            let Some(&(price, discount, available)) = stock.get(&line.product_id) else {
                return Ok(PlaceOrderOutcome::ProductMissing(line.product_id));
            };
            if available < line.quantity {
                return Ok(PlaceOrderOutcome::OutOfStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available,
                });
            }
            let unit = discounted_price(price, discount);
            total += unit * Decimal::from(line.quantity);
            priced.push((*line, unit));
        }
        if total.round_dp(2) > max_amount() {
            return Ok(PlaceOrderOutcome::TotalTooLarge);
        }

        for (line, _) in &priced {
            sqlx::query(
                "UPDATE products SET quantity = quantity - $2, updated_at = now() WHERE id = $1",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!(
            "INSERT INTO orders (user_id, total) VALUES ($1, $2) RETURNING {ORDER_COLUMNS}"
        );
        let order_row = sqlx::query(&sql)
            .bind(user_id)
            .bind(total.round_dp(2))
            .fetch_one(&mut *tx)
            .await?;
        let order = map_order(&order_row)?;

        let item_sql = format!(
            "INSERT INTO order_items (order_id, product_id, quantity, price)
             VALUES ($1, $2, $3, $4)
             RETURNING {ITEM_COLUMNS}"
        );
        let mut items = Vec::with_capacity(priced.len());
        for (line, unit) in &priced {
            let row = sqlx::query(&item_sql)
                .bind(order.id)
                .bind(line.product_id)
                .bind(line.quantity)
                .bind(*unit)
                .fetch_one(&mut *tx)
                .await?;
            items.push(map_item(&row)?);
        }

        sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = ANY($2)")
            .bind(user_id)
            .bind(&ids[..])
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(PlaceOrderOutcome::Placed { order, items })
    }

    async fn get(&self, order_id: i64) -> anyhow::Result<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_order).transpose()
    }

    async fn list_for_user(&self, user_id: i64) -> anyhow::Result<Vec<OrderDetails>> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        let orders = rows.iter().map(map_order).collect::<anyhow::Result<Vec<_>>>()?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let item_sql =
            format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id");
        let item_rows = sqlx::query(&item_sql)
            .bind(&order_ids[..])
            .fetch_all(&self.pool)
            .await?;
        let items = item_rows
            .iter()
            .map(map_item)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
        product_ids.sort_unstable();
        product_ids.dedup();
        let products = fetch_products_by_ids(&self.pool, &product_ids).await?;

        let mut by_order: HashMap<i64, Vec<OrderItemDetails>> = HashMap::new();
        for item in items {
            let Some(product) = products.get(&item.product_id) else {
                continue;
            };
            by_order
                .entry(item.order_id)
                .or_default()
                .push(OrderItemDetails {
                    product: product.clone(),
                    item,
                });
        }
        Ok(orders
            .into_iter()
            .map(|order| OrderDetails {
                items: by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect())
    }

    async fn set_status(&self, order_id: i64, status: OrderStatus) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
            .bind(order_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn attach_payment(&self, order_id: i64, payment_id: &str) -> anyhow::Result<bool> {
        let res =
            sqlx::query("UPDATE orders SET payment_id = $2, updated_at = now() WHERE id = $1")
                .bind(order_id)
                .bind(payment_id)
                .execute(&self.pool)
                .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn mark_paid(&self, order_id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query(
            "UPDATE orders SET payment_confirmed = TRUE, updated_at = now() WHERE id = $1",
        )
        .bind(order_id)
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn record_payment_event(
        &self,
        payment_id: &str,
        event: &str,
        order_id: i64,
        confirm_order: bool,
    ) -> anyhow::Result<PaymentEventOutcome> {
        let mut tx = self.pool.begin().await?;
        let order = sqlx::query("SELECT id FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;
        if order.is_none() {
            return Ok(PaymentEventOutcome::OrderMissing);
        }
        let inserted = sqlx::query(
            r#"INSERT INTO payment_events (payment_id, event, order_id) VALUES ($1, $2, $3)
               ON CONFLICT (payment_id, event) DO NOTHING"#,
        )
        .bind(payment_id)
        .bind(event)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;
        if inserted.rows_affected() == 0 {
            return Ok(PaymentEventOutcome::Duplicate);
        }
        if confirm_order {
            sqlx::query(
                r#"UPDATE orders
                   SET payment_confirmed = TRUE, payment_id = COALESCE(payment_id, $2), updated_at = now()
                   WHERE id = $1"#,
            )
            .bind(order_id)
            .bind(payment_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(PaymentEventOutcome::Applied)
    }
}
