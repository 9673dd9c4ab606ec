use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use super::{from_sql_int, to_sql_int};
use crate::{CartLineId, CartLineRecord, CartStore, ProductId, Result, UserId};

const LINE_COLUMNS: &str = "id, user_id, product_id, quantity, created_at";

/// PostgreSQL cart store over the `cart_lines` table.
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_line(row: PgRow) -> Result<CartLineRecord> {
        Ok(CartLineRecord {
            id: CartLineId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            quantity: from_sql_int(row.try_get("quantity")?, "quantity")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl CartStore for PostgresCartStore {
    async fn add_or_increment(
        &self,
        user_id: &UserId,
        product_id: ProductId,
        quantity: u32,
        max: u32,
    ) -> Result<CartLineRecord> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO cart_lines (user_id, product_id, quantity)
            VALUES ($1, $2, LEAST($3, $4))
            ON CONFLICT (user_id, product_id)
            DO UPDATE SET quantity = LEAST(cart_lines.quantity + EXCLUDED.quantity, $4)
            RETURNING {LINE_COLUMNS}
            "#
        ))
        .bind(user_id.as_str())
        .bind(product_id.as_i64())
        .bind(to_sql_int(quantity, "quantity")?)
        .bind(to_sql_int(max, "quantity limit")?)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_line(row)
    }

    async fn set_quantity(
        &self,
        user_id: &UserId,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<Option<CartLineRecord>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE cart_lines SET quantity = $3
            WHERE id = $1 AND user_id = $2
            RETURNING {LINE_COLUMNS}
            "#
        ))
        .bind(line_id.as_i64())
        .bind(user_id.as_str())
        .bind(to_sql_int(quantity, "quantity")?)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_line).transpose()
    }

    async fn remove(&self, user_id: &UserId, line_id: CartLineId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE id = $1 AND user_id = $2")
            .bind(line_id.as_i64())
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, user_id: &UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE user_id = $1")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn consume(&self, user_id: &UserId, taken: &[CartLineRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut deleted = 0;

        for snapshot in taken {
            let quantity = to_sql_int(snapshot.quantity, "quantity")?;
            sqlx::query(
                r#"
                UPDATE cart_lines SET quantity = quantity - $3
                WHERE id = $1 AND user_id = $2 AND quantity > $3
                "#,
            )
            .bind(snapshot.id.as_i64())
            .bind(user_id.as_str())
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

            let result = sqlx::query(
                "DELETE FROM cart_lines WHERE id = $1 AND user_id = $2 AND quantity <= $3",
            )
            .bind(snapshot.id.as_i64())
            .bind(user_id.as_str())
            .bind(quantity)
            .execute(&mut *tx)
            .await?;
            deleted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(deleted)
    }

    async fn lines(&self, user_id: &UserId) -> Result<Vec<CartLineRecord>> {
        let rows = sqlx::query(&format!(
            "SELECT {LINE_COLUMNS} FROM cart_lines WHERE user_id = $1 ORDER BY id ASC"
        ))
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_line).collect()
    }
}
