use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{ProductId, Result, UserId, WishlistEntry, WishlistStore};

/// PostgreSQL wishlist store over the `wishlist_entries` table.
#[derive(Clone)]
pub struct PostgresWishlistStore {
    pool: PgPool,
}

impl PostgresWishlistStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_entry(row: PgRow) -> Result<WishlistEntry> {
        Ok(WishlistEntry {
            id: row.try_get("id")?,
            user_id: UserId::new(row.try_get::<String, _>("user_id")?),
            product_id: ProductId::new(row.try_get("product_id")?),
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl WishlistStore for PostgresWishlistStore {
    async fn add(&self, user_id: &UserId, product_id: ProductId) -> Result<WishlistEntry> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row = sqlx::query(
            r#"
            INSERT INTO wishlist_entries (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, product_id, created_at
            "#,
        )
        .bind(user_id.as_str())
        .bind(product_id.as_i64())
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_entry(row)
    }

    async fn remove(&self, user_id: &UserId, product_id: ProductId) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM wishlist_entries WHERE user_id = $1 AND product_id = $2")
                .bind(user_id.as_str())
                .bind(product_id.as_i64())
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn entries(&self, user_id: &UserId) -> Result<Vec<WishlistEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, product_id, created_at
            FROM wishlist_entries
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_entry).collect()
    }
}
