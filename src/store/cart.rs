//! Session-keyed cart rows.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::CartLine;
use crate::error::ApiError;

#[derive(Clone)]
pub struct CartStore {
    pool: PgPool,
}

impl CartStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lines joined with live product fields. The inner join filters on
    /// `is_active`, so rows whose product has gone inactive or missing
    /// silently vanish from listings and from totals.
    pub async fn items(&self, session_id: &str) -> Result<Vec<CartLine>, ApiError> {
        let lines = sqlx::query_as::<_, CartLine>(
            "SELECT ci.id, ci.session_id, ci.product_id, ci.quantity,
                    p.name, p.price, p.image_url
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.session_id = $1 AND p.is_active = TRUE
             ORDER BY ci.created_at",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(lines)
    }

    /// Atomic insert-or-increment under the (session_id, product_id) unique
    /// constraint. Two concurrent adds serialize into one row with the
    /// summed quantity. No product-existence or stock check here.
    pub async fn add_item(
        &self,
        session_id: &str,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), ApiError> {
        sqlx::query(
            "INSERT INTO cart_items (id, session_id, product_id, quantity)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (session_id, product_id)
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity",
        )
        .bind(Uuid::now_v7())
        .bind(session_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Overwrites the stored quantity; non-positive quantities delegate to
    /// remove so a cart row can never hold quantity <= 0.
    pub async fn update_item(
        &self,
        session_id: &str,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<(), ApiError> {
        if quantity <= 0 {
            return self.remove_item(session_id, product_id).await;
        }
        sqlx::query(
            "UPDATE cart_items SET quantity = $3
             WHERE session_id = $1 AND product_id = $2",
        )
        .bind(session_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Idempotent: removing a pair that is not present succeeds.
    pub async fn remove_item(&self, session_id: &str, product_id: Uuid) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM cart_items WHERE session_id = $1 AND product_id = $2")
            .bind(session_id)
            .bind(product_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn clear(&self, session_id: &str) -> Result<(), ApiError> {
        sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Empty cart totals to zero, never an error.
    pub async fn total(&self, session_id: &str) -> Result<Decimal, ApiError> {
        let total = sqlx::query_scalar::<_, Decimal>(
            "SELECT COALESCE(SUM(ci.quantity * p.price), 0)
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.session_id = $1 AND p.is_active = TRUE",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}
