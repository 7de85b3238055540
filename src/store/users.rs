//! User accounts. Rows are soft-deleted like products; the only code that
//! ever sees a password hash is the login path.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Role, User, UserProfile};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Login lookup: the one read that includes the hash.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, role, is_active
             FROM users WHERE username = $1 AND is_active = TRUE",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, ApiError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, ApiError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// The pre-insert exists checks give friendly messages; the unique
    /// violation mapping backstops the race between check and insert.
    pub async fn create(&self, user: &NewUser) -> Result<Uuid, ApiError> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, role,
                                first_name, last_name, phone, address)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(&user.address)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            ApiError::on_unique_violation(err, "Username or email already exists")
        })?;
        Ok(id)
    }

    pub async fn get_profile(&self, id: Uuid) -> Result<UserProfile, ApiError> {
        sqlx::query_as::<_, UserProfile>(
            "SELECT id, username, email, role, first_name, last_name, phone,
                    address, created_at
             FROM users WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub async fn list_profiles(&self) -> Result<Vec<UserProfile>, ApiError> {
        let profiles = sqlx::query_as::<_, UserProfile>(
            "SELECT id, username, email, role, first_name, last_name, phone,
                    address, created_at
             FROM users WHERE is_active = TRUE
             ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(profiles)
    }

    /// Soft delete; an unknown or already-deleted target reads as not found.
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1 AND is_active = TRUE")
                .bind(id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("User not found"));
        }
        Ok(())
    }
}
