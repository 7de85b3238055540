//! Checkout and order reads. The checkout body mirrors the storefront's
//! wire contract: session id, customer block, and the cart-line snapshot
//! the client assembled.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::api::check;
use crate::auth::AuthUser;
use crate::domain::OrderStatus;
use crate::error::ApiError;
use crate::store::OrderLine;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CustomerBody {
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Customer address is required"))]
    pub address: String,
    pub shipping_method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LineBody {
    pub product_id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderBody {
    #[validate(length(min = 1, message = "Session ID is required"))]
    pub session_id: String,
    #[validate]
    pub customer: CustomerBody,
    pub cart_items: Vec<LineBody>,
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

/// POST /orders — validates everything up front, then runs the one
/// transactional write in the system.
pub async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    check(&body)?;
    if body.cart_items.is_empty() {
        return Err(ApiError::validation("Cart items are required"));
    }
    for line in &body.cart_items {
        if line.quantity < 1 {
            return Err(ApiError::validation("Quantity must be at least 1"));
        }
        if line.price < Decimal::ZERO {
            return Err(ApiError::validation("Price cannot be negative"));
        }
    }

    let customer = crate::domain::CustomerDetails {
        name: body.customer.name,
        email: body.customer.email,
        phone: body.customer.phone,
        address: body.customer.address,
        shipping_method: body.customer.shipping_method,
    };
    let lines: Vec<OrderLine> = body
        .cart_items
        .into_iter()
        .map(|l| OrderLine {
            product_id: l.product_id,
            product_name: l.name,
            price: l.price,
            quantity: l.quantity,
        })
        .collect();

    let order_id = state
        .orders
        .create(&body.session_id, &customer, &lines)
        .await?;

    // Fire-and-forget event; checkout already committed.
    if let Some(nats) = &state.nats {
        let event = json!({ "order_id": order_id, "session_id": body.session_id });
        if let Err(err) = nats
            .publish("orders.created", event.to_string().into())
            .await
        {
            tracing::warn!(error = %err, %order_id, "failed to publish order event");
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order created successfully",
            "order_id": order_id,
        })),
    ))
}

/// GET /orders?session_id= — a shopper's own receipts are public; the
/// unfiltered listing is an admin view.
pub async fn list_orders(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Value>, ApiError> {
    let session_id = query.session_id.as_deref().filter(|s| !s.is_empty());
    if session_id.is_none() {
        user.ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?
            .require_admin()?;
    }
    let orders = state.orders.list(session_id).await?;
    Ok(Json(json!({ "success": true, "orders": orders })))
}

/// GET /orders/:id — header plus frozen item snapshots.
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let (order, items) = state.orders.get(id).await?;
    Ok(Json(json!({ "success": true, "order": order, "items": items })))
}

/// PUT /orders/:id — admin-only status transition.
pub async fn update_order_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<Json<Value>, ApiError> {
    user.require_admin()?;
    let status = OrderStatus::parse(&body.status)
        .ok_or_else(|| ApiError::validation(format!("Unknown order status '{}'", body.status)))?;
    let order = state.orders.set_status(id, status).await?;
    tracing::info!(order_id = %id, status = %status, admin = %user.username, "order status changed");
    Ok(Json(json!({ "success": true, "order": order })))
}
