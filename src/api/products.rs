//! Catalog product endpoints. Reads are public; writes are admin-gated.

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
use crate::error::ApiError;
use crate::store::ProductInput;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductBody {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    #[validate(range(min = 0, message = "stock_quantity cannot be negative"))]
    pub stock_quantity: i32,
}

impl ProductBody {
    fn into_input(self) -> Result<ProductInput, ApiError> {
        if self.price < Decimal::ZERO {
            return Err(ApiError::validation("price cannot be negative"));
        }
        Ok(ProductInput {
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            category_id: self.category_id,
            stock_quantity: self.stock_quantity,
        })
    }
}

/// GET /products?search=&category=
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Value>, ApiError> {
    let search = query.search.as_deref().filter(|s| !s.is_empty());
    let products = state.catalog.list_products(search, query.category).await?;
    Ok(Json(json!({ "success": true, "products": products })))
}

/// GET /products/:id — active rows only.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let product = state.catalog.get_product(id).await?;
    Ok(Json(json!({ "success": true, "product": product })))
}

/// POST /products — admin.
pub async fn create_product(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    user.require_admin()?;
    check(&body)?;
    let id = state.catalog.create_product(&body.into_input()?).await?;
    tracing::info!(product_id = %id, admin = %user.username, "product created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Product created successfully", "id": id })),
    ))
}

/// PUT /products/:id — admin, full-record update of an active row.
pub async fn update_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ProductBody>,
) -> Result<Json<Value>, ApiError> {
    user.require_admin()?;
    check(&body)?;
    state.catalog.update_product(id, &body.into_input()?).await?;
    Ok(Json(json!({ "success": true, "message": "Product updated successfully" })))
}

/// DELETE /products/:id — admin, soft delete.
pub async fn delete_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    user.require_admin()?;
    state.catalog.delete_product(id).await?;
    tracing::info!(product_id = %id, admin = %user.username, "product deactivated");
    Ok(Json(json!({ "success": true, "message": "Product deleted successfully" })))
}
