//! Catalog reads and admin-gated writes. Products are soft-deleted; every
//! read path filters `is_active = TRUE`.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Category, Product};
use crate::error::ApiError;

/// Full-record product write, used by create and update alike.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub stock_quantity: i32,
}

#[derive(Clone)]
pub struct CatalogStore {
    pool: PgPool,
}

impl CatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Active products, optionally narrowed by category and a
    /// case-insensitive substring match on name or description.
    pub async fn list_products(
        &self,
        search: Option<&str>,
        category_id: Option<Uuid>,
    ) -> Result<Vec<Product>, ApiError> {
        let pattern = search.map(|q| format!("%{q}%"));
        let products = sqlx::query_as::<_, Product>(
            "SELECT p.id, p.name, p.description, p.price, p.image_url,
                    p.category_id, c.name AS category_name,
                    p.stock_quantity, p.is_active, p.created_at, p.updated_at
             FROM products p
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE p.is_active = TRUE
               AND ($1::text IS NULL OR p.name ILIKE $1 OR p.description ILIKE $1)
               AND ($2::uuid IS NULL OR p.category_id = $2)
             ORDER BY p.created_at DESC",
        )
        .bind(pattern)
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, ApiError> {
        sqlx::query_as::<_, Product>(
            "SELECT p.id, p.name, p.description, p.price, p.image_url,
                    p.category_id, c.name AS category_name,
                    p.stock_quantity, p.is_active, p.created_at, p.updated_at
             FROM products p
             LEFT JOIN categories c ON c.id = p.category_id
             WHERE p.id = $1 AND p.is_active = TRUE",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Uuid, ApiError> {
        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO products (id, name, description, price, image_url,
                                   category_id, stock_quantity)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(input.category_id)
        .bind(input.stock_quantity)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    /// Full-record update of an active row. A soft-deleted product is not
    /// silently resurrected; it reads as not found.
    pub async fn update_product(&self, id: Uuid, input: &ProductInput) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE products
             SET name = $2, description = $3, price = $4, image_url = $5,
                 category_id = $6, stock_quantity = $7, updated_at = now()
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.price)
        .bind(&input.image_url)
        .bind(input.category_id)
        .bind(input.stock_quantity)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Product not found"));
        }
        Ok(())
    }

    /// Soft delete. Historical order items keep their frozen snapshots.
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE products SET is_active = FALSE, updated_at = now()
             WHERE id = $1 AND is_active = TRUE",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Product not found"));
        }
        Ok(())
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn get_category(&self, id: Uuid) -> Result<Category, ApiError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, description FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Category not found"))
    }

    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Uuid, ApiError> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO categories (id, name, description) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(|err| ApiError::on_unique_violation(err, "Category name already exists"))?;
        Ok(id)
    }

    /// Refused while any product row (active or soft-deleted) still points
    /// at the category. The FK from `products.category_id` is the guard;
    /// mapping the violation here keeps the check atomic with the delete.
    pub async fn delete_category(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                ApiError::on_fk_violation(
                    err,
                    "Cannot delete a category that products still reference",
                )
            })?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Category not found"));
        }
        Ok(())
    }
}
