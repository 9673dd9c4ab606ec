use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{from_sql_int, to_sql_int};
use crate::{
    CatalogStore, Money, Product, ProductDraft, ProductFilter, ProductId, Result,
};

const PRODUCT_COLUMNS: &str = "id, name, description, price, original_price, image_url, \
     category_id, stock, is_active, is_featured, tags, created_at";

/// PostgreSQL catalog over the `products` table.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let stock = row
            .try_get::<Option<i32>, _>("stock")?
            .map(|stock| from_sql_int(stock, "stock"))
            .transpose()?;

        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: Money::new(row.try_get::<Decimal, _>("price")?),
            original_price: row
                .try_get::<Option<Decimal>, _>("original_price")?
                .map(Money::new),
            image_url: row.try_get("image_url")?,
            category_id: row.try_get("category_id")?,
            stock,
            is_active: row.try_get("is_active")?,
            is_featured: row.try_get("is_featured")?,
            tags: row.try_get("tags")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn get_many(&self, ids: &[ProductId]) -> Result<HashMap<ProductId, Product>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let raw: Vec<i64> = ids.iter().map(ProductId::as_i64).collect();
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(raw)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Self::row_to_product(row).map(|p| (p.id, p)))
            .collect()
    }

    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE (NOT $1 OR is_active)
              AND ($2::BOOLEAN IS NULL OR is_featured = $2)
              AND ($3::BIGINT IS NULL OR category_id = $3)
            ORDER BY id ASC
            "#
        ))
        .bind(filter.active_only)
        .bind(filter.featured)
        .bind(filter.category_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn create(&self, draft: ProductDraft) -> Result<Product> {
        let stock = draft.stock.map(|s| to_sql_int(s, "stock")).transpose()?;
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO products
                (name, description, price, original_price, image_url, category_id, stock, is_active, is_featured, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price.amount())
        .bind(draft.original_price.map(|m| m.amount()))
        .bind(&draft.image_url)
        .bind(draft.category_id)
        .bind(stock)
        .bind(draft.is_active)
        .bind(draft.is_featured)
        .bind(&draft.tags)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(row)
    }

    async fn update(&self, id: ProductId, draft: ProductDraft) -> Result<Option<Product>> {
        let stock = draft.stock.map(|s| to_sql_int(s, "stock")).transpose()?;
        let row = sqlx::query(&format!(
            r#"
            UPDATE products SET
                name = $2, description = $3, price = $4, original_price = $5, image_url = $6,
                category_id = $7, stock = $8, is_active = $9, is_featured = $10, tags = $11
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_i64())
        .bind(&draft.name)
        .bind(&draft.description)
        .bind(draft.price.amount())
        .bind(draft.original_price.map(|m| m.amount()))
        .bind(&draft.image_url)
        .bind(draft.category_id)
        .bind(stock)
        .bind(draft.is_active)
        .bind(draft.is_featured)
        .bind(&draft.tags)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn delete(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
