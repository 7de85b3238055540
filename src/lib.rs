//! Storefront service: relational catalog, session-keyed carts,
//! transactional checkout, and role-gated administration.
//!
//! The router lives here so integration tests can drive the app with
//! `tower::ServiceExt::oneshot` without binding a socket.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod store;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::AuthKeys;
use crate::store::{CartStore, CatalogStore, OrderStore, UserStore};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub catalog: CatalogStore,
    pub cart: CartStore,
    pub orders: OrderStore,
    pub users: UserStore,
    pub auth: AuthKeys,
    pub nats: Option<async_nats::Client>,
}

impl AppState {
    pub fn new(pool: sqlx::PgPool, auth: AuthKeys, nats: Option<async_nats::Client>) -> Self {
        Self {
            catalog: CatalogStore::new(pool.clone()),
            cart: CartStore::new(pool.clone()),
            orders: OrderStore::new(pool.clone()),
            users: UserStore::new(pool),
            auth,
            nats,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({ "status": "healthy", "service": "storefront" })) }),
        )
        .route(
            "/products",
            get(api::products::list_products).post(api::products::create_product),
        )
        .route(
            "/products/:id",
            get(api::products::get_product)
                .put(api::products::update_product)
                .delete(api::products::delete_product),
        )
        .route(
            "/categories",
            get(api::categories::list_categories).post(api::categories::create_category),
        )
        .route(
            "/categories/:id",
            get(api::categories::get_category).delete(api::categories::delete_category),
        )
        .route(
            "/cart",
            get(api::cart::get_cart)
                .post(api::cart::add_item)
                .put(api::cart::update_item)
                .delete(api::cart::remove_item),
        )
        .route(
            "/orders",
            get(api::orders::list_orders).post(api::orders::create_order),
        )
        .route(
            "/orders/:id",
            get(api::orders::get_order).put(api::orders::update_order_status),
        )
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/me", get(api::auth::me))
        .route(
            "/auth/users",
            get(api::auth::list_users).post(api::auth::create_user),
        )
        .route("/auth/users/:id", axum::routing::delete(api::auth::delete_user))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
