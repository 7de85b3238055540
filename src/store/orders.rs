//! Order creation and lookup. Checkout is the one multi-step write in the
//! system and runs entirely inside a single transaction.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{CustomerDetails, Order, OrderItem, OrderStatus};
use crate::error::ApiError;

/// One caller-supplied checkout line. Price and name are taken as given and
/// frozen into the order item snapshot; they are not re-read from the
/// catalog (the storefront's original contract).
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub product_id: Uuid,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Clone)]
pub struct OrderStore {
    pool: PgPool,
}

impl OrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Places an order: one `orders` row, one `order_items` row per line,
    /// then the session's cart rows are deleted, all inside one
    /// transaction. Any failure rolls the whole attempt back; no partial
    /// order is ever visible and the cart is left untouched.
    ///
    /// Supplied lines referencing a missing or inactive product abort the
    /// checkout. Supplied prices are trusted (see DESIGN.md); the total is
    /// Σ(quantity × price) over exactly the lines given.
    pub async fn create(
        &self,
        session_id: &str,
        customer: &CustomerDetails,
        lines: &[OrderLine],
    ) -> Result<Uuid, ApiError> {
        // An order with no items is a degenerate state; hold the invariant
        // here as well as at the handler.
        if lines.is_empty() {
            return Err(ApiError::validation("Cart items are required"));
        }

        let mut tx = self.pool.begin().await?;

        let supplied_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let active: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM products WHERE id = ANY($1) AND is_active = TRUE",
        )
        .bind(&supplied_ids)
        .fetch_all(&mut *tx)
        .await?;
        if let Some(bad) = lines.iter().find(|l| !active.contains(&l.product_id)) {
            return Err(ApiError::validation(format!(
                "Product {} is not available",
                bad.product_id
            )));
        }

        let total_amount: Decimal = lines
            .iter()
            .map(|l| Decimal::from(l.quantity) * l.price)
            .sum();

        let order_id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO orders (id, session_id, customer_name, customer_email,
                                 customer_phone, shipping_address, shipping_method,
                                 total_amount, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(order_id)
        .bind(session_id)
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.shipping_method)
        .bind(total_amount)
        .bind(OrderStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        for line in lines {
            sqlx::query(
                "INSERT INTO order_items (id, order_id, product_id, product_name,
                                          product_price, quantity)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(Uuid::now_v7())
            .bind(order_id)
            .bind(line.product_id)
            .bind(&line.product_name)
            .bind(line.price)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(%order_id, session_id, %total_amount, "order placed");
        Ok(order_id)
    }

    /// Newest first; optionally narrowed to one session's receipts.
    pub async fn list(&self, session_id: Option<&str>) -> Result<Vec<Order>, ApiError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders
             WHERE ($1::text IS NULL OR session_id = $1)
             ORDER BY created_at DESC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Header plus its frozen line-item snapshots. The snapshots come from
    /// `order_items` only; live product rows are never consulted.
    pub async fn get(&self, order_id: Uuid) -> Result<(Order, Vec<OrderItem>), ApiError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ApiError::not_found("Order not found"))?;
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        Ok((order, items))
    }

    /// The only mutation orders allow after creation.
    pub async fn set_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING *",
        )
        .bind(order_id)
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Order not found"))
    }
}
