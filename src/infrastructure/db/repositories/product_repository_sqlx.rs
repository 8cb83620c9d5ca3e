use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, QueryBuilder, Row, Transaction};

use crate::application::ports::product_repository::{ProductDeletion, ProductRepository};
use crate::domain::products::product::{
    NewProductImage, NewReview, Product, ProductCategory, ProductDraft, ProductFilters,
    ProductImage, ProductReview, ProductSpecification, ReviewImage,
};
use crate::infrastructure::db::PgPool;

pub(crate) const PRODUCT_COLUMNS: &str = "id, business_id, price, title, description, quantity, \
     discount, category, brand, sku, estimated_delivery, rating, review_count, created_at, updated_at";

pub struct SqlxProductRepository {
    pub pool: PgPool,
}

impl SqlxProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_product(row: &PgRow) -> anyhow::Result<Product> {
    let category: String = row.try_get("category")?;
    Ok(Product {
        id: row.try_get("id")?,
        business_id: row.try_get("business_id")?,
        price: row.try_get("price")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        discount: row.try_get("discount")?,
        category: ProductCategory::parse(&category).unwrap_or(ProductCategory::Other),
        brand: row.try_get("brand")?,
        sku: row.try_get("sku")?,
        estimated_delivery: row.try_get("estimated_delivery")?,
        rating: row.try_get("rating")?,
        review_count: row.try_get("review_count")?,
        images: Vec::new(),
        specifications: Vec::new(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub(crate) fn map_image(row: &PgRow) -> anyhow::Result<ProductImage> {
    Ok(ProductImage {
        id: row.try_get("id")?,
        product_id: row.try_get("product_id")?,
        file_key: row.try_get("file_key")?,
        url: row.try_get("url")?,
        is_primary: row.try_get("is_primary")?,
    })
}

fn map_review(row: &PgRow) -> anyhow::Result<ProductReview> {
    Ok(ProductReview {
        id: row.try_get("id")?,
        product_id: row.try_get("product_id")?,
        user_id: row.try_get("user_id")?,
        rating: row.try_get("rating")?,
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
        images: Vec::new(),
    })
}

/// Escapes `%`, `_` and `\` so user input matches literally inside ILIKE.
fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Fills `images` and `specifications` of the given products.
async fn attach_details(pool: &PgPool, products: &mut [Product]) -> anyhow::Result<()> {
    if products.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = products.iter().map(|p| p.id).collect();
    let image_rows = sqlx::query(
        r#"SELECT id, product_id, file_key, url, is_primary
           FROM product_images
           WHERE product_id = ANY($1)
           ORDER BY is_primary DESC, id"#,
    )
    .bind(&ids[..])
    .fetch_all(pool)
    .await?;
    let spec_rows = sqlx::query(
        r#"SELECT product_id, name, value
           FROM product_specifications
           WHERE product_id = ANY($1)
           ORDER BY id"#,
    )
    .bind(&ids[..])
    .fetch_all(pool)
    .await?;

    let mut by_id: HashMap<i64, &mut Product> = products.iter_mut().map(|p| (p.id, p)).collect();
    for row in &image_rows {
        let image = map_image(row)?;
        if let Some(p) = by_id.get_mut(&image.product_id) {
            p.images.push(image);
        }
    }
    for row in &spec_rows {
        let product_id: i64 = row.try_get("product_id")?;
        if let Some(p) = by_id.get_mut(&product_id) {
            p.specifications.push(ProductSpecification {
                name: row.try_get("name")?,
                value: row.try_get("value")?,
            });
        }
    }
    Ok(())
}

/// Loads products with their images and specifications, keyed by id.
pub(crate) async fn fetch_products_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> anyhow::Result<HashMap<i64, Product>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)");
    let rows = sqlx::query(&sql).bind(ids).fetch_all(pool).await?;
    let mut products = rows.iter().map(map_product).collect::<anyhow::Result<Vec<_>>>()?;
    attach_details(pool, &mut products).await?;
    Ok(products.into_iter().map(|p| (p.id, p)).collect())
}

async fn replace_specifications(
    tx: &mut Transaction<'_, Postgres>,
    product_id: i64,
    specs: &[ProductSpecification],
) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM product_specifications WHERE product_id = $1")
        .bind(product_id)
        .execute(&mut **tx)
        .await?;
    for spec in specs {
        sqlx::query(
            "INSERT INTO product_specifications (product_id, name, value) VALUES ($1, $2, $3)",
        )
        .bind(product_id)
        .bind(spec.name.trim())
        .bind(&spec.value)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[async_trait]
impl ProductRepository for SqlxProductRepository {
    async fn get(&self, id: i64) -> anyhow::Result<Option<Product>> {
        Ok(fetch_products_by_ids(&self.pool, &[id]).await?.remove(&id))
    }

    async fn filter(&self, filters: &ProductFilters) -> anyhow::Result<Vec<Product>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE TRUE"));
        if let Some(q) = filters.search_query.as_deref() {
            let pattern = format!("%{}%", escape_like(q));
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if !filters.categories.is_empty() {
            let categories: Vec<String> = filters
                .categories
                .iter()
                .map(|c| c.as_str().to_string())
                .collect();
            qb.push(" AND category = ANY(").push_bind(categories).push(")");
        }
        if let Some(min) = filters.min_price {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = filters.max_price {
            qb.push(" AND price <= ").push_bind(max);
        }
        if !filters.brands.is_empty() {
            qb.push(" AND brand = ANY(")
                .push_bind(filters.brands.clone())
                .push(")");
        }
        if let Some(rating) = filters.rating {
            qb.push(" AND rating >= ").push_bind(rating);
        }
        if filters.in_stock {
            qb.push(" AND quantity > 0");
        }
        if filters.on_sale {
            qb.push(" AND discount > 0");
        }
        if let Some(business_id) = filters.business_id {
            qb.push(" AND business_id = ").push_bind(business_id);
        }
        qb.push(" ORDER BY ").push(filters.sort_by.order_clause());
        qb.push(" LIMIT ")
            .push_bind(filters.limit)
            .push(" OFFSET ")
            .push_bind(filters.offset);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut products = rows.iter().map(map_product).collect::<anyhow::Result<Vec<_>>>()?;
        attach_details(&self.pool, &mut products).await?;
        Ok(products)
    }

    async fn create(&self, draft: &ProductDraft) -> anyhow::Result<Product> {
        let mut tx = self.pool.begin().await?;
        let id: i64 = sqlx::query_scalar(
            r#"INSERT INTO products
                 (business_id, price, title, description, quantity, discount, category,
                  brand, sku, estimated_delivery)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING id"#,
        )
        .bind(draft.business_id)
        .bind(draft.price)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.quantity)
        .bind(draft.discount)
        .bind(draft.category.as_str())
        .bind(draft.brand.as_deref())
        .bind(draft.sku.as_deref())
        .bind(draft.estimated_delivery.as_deref())
        .fetch_one(&mut *tx)
        .await?;
        if let Some(specs) = &draft.specifications {
            replace_specifications(&mut tx, id, specs).await?;
        }
        tx.commit().await?;
        self.get(id).await?.context("product missing right after insert")
    }

    async fn update(&self, id: i64, draft: &ProductDraft) -> anyhow::Result<Option<Product>> {
        let mut tx = self.pool.begin().await?;
        let res = sqlx::query(
            r#"UPDATE products SET
                 business_id = $2, price = $3, title = $4, description = $5, quantity = $6,
                 discount = $7, category = $8, brand = $9, sku = $10,
                 estimated_delivery = $11, updated_at = now()
               WHERE id = $1"#,
        )
        .bind(id)
        .bind(draft.business_id)
        .bind(draft.price)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.quantity)
        .bind(draft.discount)
        .bind(draft.category.as_str())
        .bind(draft.brand.as_deref())
        .bind(draft.sku.as_deref())
        .bind(draft.estimated_delivery.as_deref())
        .execute(&mut *tx)
        .await?;
        if res.rows_affected() == 0 {
            return Ok(None);
        }
        if let Some(specs) = &draft.specifications {
            replace_specifications(&mut tx, id, specs).await?;
        }
        tx.commit().await?;
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> anyhow::Result<ProductDeletion> {
        let mut tx = self.pool.begin().await?;
        let exists = sqlx::query("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(ProductDeletion::NotFound);
        }
        let ordered: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM order_items WHERE product_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
        if ordered {
            return Ok(ProductDeletion::Ordered);
        }
        let image_rows = sqlx::query(
            "SELECT id, product_id, file_key, url, is_primary FROM product_images WHERE product_id = $1",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        let images = image_rows
            .iter()
            .map(map_image)
            .collect::<anyhow::Result<Vec<_>>>()?;
        // images, specifications, reviews and cart lines cascade
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(ProductDeletion::Deleted(images))
    }

    async fn list_images(&self, product_id: i64) -> anyhow::Result<Vec<ProductImage>> {
        let rows = sqlx::query(
            r#"SELECT id, product_id, file_key, url, is_primary
               FROM product_images WHERE product_id = $1
               ORDER BY is_primary DESC, id"#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_image).collect()
    }

    async fn get_image(&self, image_id: i64) -> anyhow::Result<Option<ProductImage>> {
        let row = sqlx::query(
            "SELECT id, product_id, file_key, url, is_primary FROM product_images WHERE id = $1",
        )
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_image).transpose()
    }

    async fn add_image(&self, image: &NewProductImage) -> anyhow::Result<ProductImage> {
        let mut tx = self.pool.begin().await?;
        // Serializes concurrent uploads for the same product.
        sqlx::query("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(image.product_id)
            .fetch_one(&mut *tx)
            .await?;
        let has_images: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM product_images WHERE product_id = $1)")
                .bind(image.product_id)
                .fetch_one(&mut *tx)
                .await?;
        let primary = image.is_primary || !has_images;
        if primary {
            sqlx::query("UPDATE product_images SET is_primary = FALSE WHERE product_id = $1")
                .bind(image.product_id)
                .execute(&mut *tx)
                .await?;
        }
        let row = sqlx::query(
            r#"INSERT INTO product_images (product_id, file_key, url, is_primary)
               VALUES ($1, $2, $3, $4)
               RETURNING id, product_id, file_key, url, is_primary"#,
        )
        .bind(image.product_id)
        .bind(&image.file_key)
        .bind(&image.url)
        .bind(primary)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        map_image(&row)
    }

    async fn delete_image(&self, image_id: i64) -> anyhow::Result<Option<ProductImage>> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"DELETE FROM product_images WHERE id = $1
               RETURNING id, product_id, file_key, url, is_primary"#,
        )
        .bind(image_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let removed = map_image(&row)?;
        if removed.is_primary {
            sqlx::query(
                r#"UPDATE product_images SET is_primary = TRUE
                   WHERE id = (SELECT id FROM product_images WHERE product_id = $1 ORDER BY id LIMIT 1)"#,
            )
            .bind(removed.product_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(Some(removed))
    }

    async fn list_reviews(&self, product_id: i64) -> anyhow::Result<Vec<ProductReview>> {
        let rows = sqlx::query(
            r#"SELECT id, product_id, user_id, rating, text, created_at
               FROM product_reviews WHERE product_id = $1
               ORDER BY created_at DESC, id DESC"#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        let mut reviews = rows.iter().map(map_review).collect::<anyhow::Result<Vec<_>>>()?;
        if reviews.is_empty() {
            return Ok(reviews);
        }
        let ids: Vec<i64> = reviews.iter().map(|r| r.id).collect();
        let image_rows =
            sqlx::query("SELECT review_id, url FROM review_images WHERE review_id = ANY($1) ORDER BY id")
                .bind(&ids[..])
                .fetch_all(&self.pool)
                .await?;
        let mut urls: HashMap<i64, Vec<String>> = HashMap::new();
        for row in &image_rows {
            urls.entry(row.try_get("review_id")?)
                .or_default()
                .push(row.try_get("url")?);
        }
        for review in &mut reviews {
            review.images = urls.remove(&review.id).unwrap_or_default();
        }
        Ok(reviews)
    }

    async fn get_review(&self, review_id: i64) -> anyhow::Result<Option<ProductReview>> {
        let row = sqlx::query(
            "SELECT id, product_id, user_id, rating, text, created_at FROM product_reviews WHERE id = $1",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut review = map_review(&row)?;
        review.images =
            sqlx::query_scalar("SELECT url FROM review_images WHERE review_id = $1 ORDER BY id")
                .bind(review_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(Some(review))
    }

    async fn add_review(&self, review: &NewReview) -> anyhow::Result<ProductReview> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query(
            r#"INSERT INTO product_reviews (product_id, user_id, rating, text)
               VALUES ($1, $2, $3, $4)
               RETURNING id, product_id, user_id, rating, text, created_at"#,
        )
        .bind(review.product_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.text)
        .fetch_one(&mut *tx)
        .await?;
        sqlx::query(
            r#"UPDATE products SET
                 rating = COALESCE((SELECT AVG(rating)::float8 FROM product_reviews WHERE product_id = $1), 0),
                 review_count = (SELECT COUNT(*) FROM product_reviews WHERE product_id = $1),
                 updated_at = now()
               WHERE id = $1"#,
        )
        .bind(review.product_id)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        map_review(&row)
    }

    async fn add_review_image(&self, review_id: i64, url: &str) -> anyhow::Result<ReviewImage> {
        let row = sqlx::query(
            "INSERT INTO review_images (review_id, url) VALUES ($1, $2) RETURNING id, review_id, url",
        )
        .bind(review_id)
        .bind(url)
        .fetch_one(&self.pool)
        .await?;
        Ok(ReviewImage {
            id: row.try_get("id")?,
            review_id: row.try_get("review_id")?,
            url: row.try_get("url")?,
        })
    }
}
