//! Row and record types shared by the stores and the HTTP layer.
//!
//! Persisted rows keep `status`/`role` as plain strings (that is what the
//! columns hold); the [`Role`] and [`OrderStatus`] vocabularies sit next to
//! them so callers parse once and compare typed values.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product row joined with its category name, which every catalog read
/// returns. Soft-deleted rows (`is_active = false`) never leave the store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// One cart row joined with the live product fields the storefront renders.
/// Lines whose product is inactive or missing are filtered out by the join,
/// so they vanish from both listings and totals.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CartLine {
    pub id: Uuid,
    pub session_id: String,
    pub product_id: Uuid,
    pub quantity: i32,
    pub name: String,
    pub price: Decimal,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: Uuid,
    pub session_id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub shipping_address: String,
    pub shipping_method: Option<String>,
    pub total_amount: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Line-item snapshot frozen at checkout. `product_name` and
/// `product_price` are copies, deliberately decoupled from the live product
/// row so later catalog edits cannot rewrite purchase history.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_price: Decimal,
    pub quantity: i32,
}

/// Who the order ships to, validated before the checkout transaction runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub shipping_method: Option<String>,
}

/// Full user row, hash included. Only the login path reads this; everything
/// that answers HTTP uses [`UserProfile`], which has no hash column at all.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller roles. `admin` and `superadmin` form one equivalence class for
/// "requires elevated access"; mutating another elevated account takes
/// exactly `superadmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Superadmin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            "superadmin" => Some(Self::Superadmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Superadmin => "superadmin",
        }
    }

    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin-settable order states. Orders are created `Pending` and are
/// otherwise immutable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "shipped" => Some(Self::Shipped),
            "delivered" => Some(Self::Delivered),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
