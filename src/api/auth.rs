//! Account endpoints: public register/login, the caller's own profile, and
//! admin user management.

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
use crate::auth::{hash_password, verify_password, AuthUser};
use crate::domain::Role;
use crate::error::ApiError;
use crate::store::NewUser;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterBody {
    #[validate(length(min = 1, message = "Field 'username' is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserBody {
    #[validate(length(min = 1, message = "Field 'username' is required"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
    pub role: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginBody {
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub password: String,
}

async fn reject_duplicates(state: &AppState, username: &str, email: &str) -> Result<(), ApiError> {
    if state.users.username_exists(username).await? {
        return Err(ApiError::validation(format!(
            "Username \"{username}\" already exists"
        )));
    }
    if state.users.email_exists(email).await? {
        return Err(ApiError::validation(format!(
            "Email \"{email}\" already exists"
        )));
    }
    Ok(())
}

/// POST /auth/register — public; the role is always `user`.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    check(&body)?;
    reject_duplicates(&state, &body.username, &body.email).await?;

    let password_hash = hash_password(body.password).await?;
    let username = body.username.clone();
    state
        .users
        .create(&NewUser {
            username: body.username,
            email: body.email,
            password_hash,
            role: Role::User,
            first_name: body.first_name,
            last_name: body.last_name,
            phone: body.phone,
            address: body.address,
        })
        .await?;
    tracing::info!(%username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": format!("User \"{username}\" registered successfully"),
        })),
    ))
}

/// POST /auth/login — uniform failure message, no username/password oracle.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<Value>, ApiError> {
    check(&body)?;
    let user = state
        .users
        .find_by_username(&body.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;
    if !verify_password(body.password, user.password_hash.clone()).await? {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }
    let role = Role::parse(&user.role)
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let token = state.auth.issue(user.id, &user.username, role)?;
    let profile = state.users.get_profile(user.id).await?;
    tracing::info!(username = %user.username, "login");
    Ok(Json(json!({ "success": true, "user": profile, "token": token })))
}

/// GET /auth/me
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<Value>, ApiError> {
    let profile = state.users.get_profile(user.id).await?;
    Ok(Json(json!({ "success": true, "user": profile })))
}

/// GET /auth/users — admin.
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    user.require_admin()?;
    let users = state.users.list_profiles().await?;
    Ok(Json(json!({ "success": true, "users": users })))
}

/// POST /auth/users — admin creates an account with an explicit role;
/// minting an elevated account takes superadmin.
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateUserBody>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    user.require_admin()?;
    check(&body)?;

    let role = match body.role.as_deref() {
        None | Some("") => Role::User,
        Some(raw) => Role::parse(raw)
            .ok_or_else(|| ApiError::validation(format!("Unknown role '{raw}'")))?,
    };
    if role.is_elevated() {
        user.require_superadmin()?;
    }
    reject_duplicates(&state, &body.username, &body.email).await?;

    let password_hash = hash_password(body.password).await?;
    let username = body.username.clone();
    state
        .users
        .create(&NewUser {
            username: body.username,
            email: body.email,
            password_hash,
            role,
            first_name: body.first_name,
            last_name: body.last_name,
            phone: body.phone,
            address: body.address,
        })
        .await?;
    tracing::info!(%username, role = %role, admin = %user.username, "user created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": format!("User \"{username}\" created successfully"),
        })),
    ))
}

/// DELETE /auth/users/:id — admin soft delete. Self-deletion is rejected
/// before any store access; deleting an elevated account takes superadmin.
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    user.require_admin()?;
    if id == user.id {
        return Err(ApiError::validation("Cannot delete your own account"));
    }

    let target = state.users.get_profile(id).await?;
    if Role::parse(&target.role).is_some_and(|r| r.is_elevated()) {
        user.require_superadmin()?;
    }
    state.users.delete(id).await?;
    tracing::info!(target = %target.username, admin = %user.username, "user deactivated");
    Ok(Json(json!({ "success": true, "message": "User deleted successfully" })))
}
