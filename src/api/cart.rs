//! Cart endpoints, keyed by the caller's opaque session identity. The
//! server never stores sessions; it only requires the id to be non-blank.

use axum::{extract::Query, extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::api::check;
use crate::error::ApiError;
use crate::AppState;

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct CartQuery {
    #[validate(length(min = 1, message = "Session ID is required"))]
    pub session_id: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemBody {
    #[validate(length(min = 1, message = "Session ID is required"))]
    pub session_id: String,
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateItemBody {
    #[validate(length(min = 1, message = "Session ID is required"))]
    pub session_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RemoveItemBody {
    #[validate(length(min = 1, message = "Session ID is required"))]
    pub session_id: String,
    pub product_id: Option<Uuid>,
    #[serde(default)]
    pub clear_all: bool,
}

/// GET /cart?session_id=
pub async fn get_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> Result<Json<Value>, ApiError> {
    check(&query)?;
    let items = state.cart.items(&query.session_id).await?;
    let total = state.cart.total(&query.session_id).await?;
    Ok(Json(json!({ "success": true, "items": items, "total": total })))
}

/// POST /cart — insert-or-increment for the (session, product) pair.
pub async fn add_item(
    State(state): State<AppState>,
    Json(body): Json<AddItemBody>,
) -> Result<Json<Value>, ApiError> {
    check(&body)?;
    state
        .cart
        .add_item(&body.session_id, body.product_id, body.quantity)
        .await?;
    Ok(Json(json!({ "success": true, "message": "Item added to cart" })))
}

/// PUT /cart — overwrite the quantity; zero or less removes the row.
pub async fn update_item(
    State(state): State<AppState>,
    Json(body): Json<UpdateItemBody>,
) -> Result<Json<Value>, ApiError> {
    check(&body)?;
    state
        .cart
        .update_item(&body.session_id, body.product_id, body.quantity)
        .await?;
    Ok(Json(json!({ "success": true, "message": "Cart updated" })))
}

/// DELETE /cart — one pair, or the whole session with `clear_all`.
pub async fn remove_item(
    State(state): State<AppState>,
    Json(body): Json<RemoveItemBody>,
) -> Result<Json<Value>, ApiError> {
    check(&body)?;
    if body.clear_all {
        state.cart.clear(&body.session_id).await?;
        return Ok(Json(json!({ "success": true, "message": "Cart cleared" })));
    }
    let product_id = body
        .product_id
        .ok_or_else(|| ApiError::validation("Product ID is required"))?;
    state.cart.remove_item(&body.session_id, product_id).await?;
    Ok(Json(json!({ "success": true, "message": "Item removed from cart" })))
}
