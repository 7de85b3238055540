//! Category endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::api::check;
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryBody {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub description: Option<String>,
}

/// GET /categories
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let categories = state.catalog.list_categories().await?;
    Ok(Json(json!({ "success": true, "categories": categories })))
}

/// GET /categories/:id
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let category = state.catalog.get_category(id).await?;
    Ok(Json(json!({ "success": true, "category": category })))
}

/// POST /categories — admin.
pub async fn create_category(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CategoryBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    user.require_admin()?;
    check(&body)?;
    let id = state
        .catalog
        .create_category(&body.name, body.description.as_deref())
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "message": "Category created successfully", "id": id })),
    ))
}

/// DELETE /categories/:id — admin, refused while products reference it.
pub async fn delete_category(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    user.require_admin()?;
    state.catalog.delete_category(id).await?;
    Ok(Json(json!({ "success": true, "message": "Category deleted successfully" })))
}
