//! Database-backed properties of the cart and order stores.
//!
//! These run against a real Postgres via `#[sqlx::test]`, which provisions
//! a fresh database per test and applies `./migrations`. They are ignored
//! by default so `cargo test` stays green without a server; run them with
//! `DATABASE_URL=... cargo test -- --ignored`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use storefront::auth::AuthKeys;
use storefront::domain::{CustomerDetails, Role};
use storefront::store::{
    CartStore, CatalogStore, NewUser, OrderLine, OrderStore, ProductInput, UserStore,
};
use storefront::{router, AppState};

fn product(name: &str, price: Decimal) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        description: None,
        price,
        image_url: None,
        category_id: None,
        stock_quantity: 100,
    }
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        name: "Jane".to_string(),
        email: "j@x.com".to_string(),
        phone: None,
        address: "1 Main St".to_string(),
        shipping_method: None,
    }
}

async fn seed_product(pool: &PgPool, name: &str, price: Decimal) -> Uuid {
    CatalogStore::new(pool.clone())
        .create_product(&product(name, price))
        .await
        .expect("seed product")
}

fn new_user(username: &str, email: &str, role: Role) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role,
        first_name: None,
        last_name: None,
        phone: None,
        address: None,
    }
}

async fn delete_user_via_api(
    app: axum::Router,
    keys: &AuthKeys,
    caller: (Uuid, &str, Role),
    target: Uuid,
) -> StatusCode {
    let token = keys.issue(caller.0, caller.1, caller.2).expect("token");
    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/auth/users/{target}"))
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    app.oneshot(req).await.unwrap().status()
}

async fn order_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders")
        .fetch_one(pool)
        .await
        .expect("count orders")
}

// P1 / Scenario A: repeat adds merge into one row with the summed quantity.
#[sqlx::test]
#[ignore]
async fn repeat_adds_merge_into_one_line(pool: PgPool) {
    let product_id = seed_product(&pool, "Widget", dec!(10.00)).await;
    let cart = CartStore::new(pool);

    cart.add_item("s1", product_id, 2).await.unwrap();
    cart.add_item("s1", product_id, 3).await.unwrap();

    let items = cart.items("s1").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 5);
    assert_eq!(cart.total("s1").await.unwrap(), dec!(50.00));
}

// The upsert is atomic under the unique pair constraint: concurrent adds
// never produce duplicate rows or lose increments.
#[sqlx::test]
#[ignore]
async fn concurrent_adds_serialize(pool: PgPool) {
    let product_id = seed_product(&pool, "Widget", dec!(1.00)).await;
    let cart = CartStore::new(pool.clone());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let cart = cart.clone();
        handles.push(tokio::spawn(async move {
            cart.add_item("s1", product_id, 1).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let items = cart.items("s1").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].quantity, 8);
}

// P2: removing an absent pair succeeds and changes nothing.
#[sqlx::test]
#[ignore]
async fn remove_is_idempotent(pool: PgPool) {
    let product_id = seed_product(&pool, "Widget", dec!(10.00)).await;
    let cart = CartStore::new(pool);

    cart.add_item("s1", product_id, 2).await.unwrap();
    cart.remove_item("s1", Uuid::now_v7()).await.unwrap();
    assert_eq!(cart.items("s1").await.unwrap().len(), 1);

    cart.remove_item("s1", product_id).await.unwrap();
    cart.remove_item("s1", product_id).await.unwrap();
    assert!(cart.items("s1").await.unwrap().is_empty());
}

// P3: updating to zero or a negative quantity removes the row.
#[sqlx::test]
#[ignore]
async fn update_to_zero_removes(pool: PgPool) {
    let product_id = seed_product(&pool, "Widget", dec!(10.00)).await;
    let cart = CartStore::new(pool);

    cart.add_item("s1", product_id, 2).await.unwrap();
    cart.update_item("s1", product_id, 0).await.unwrap();
    assert!(cart.items("s1").await.unwrap().is_empty());

    cart.add_item("s1", product_id, 2).await.unwrap();
    cart.update_item("s1", product_id, -1).await.unwrap();
    assert!(cart.items("s1").await.unwrap().is_empty());
}

#[sqlx::test]
#[ignore]
async fn update_overwrites_rather_than_increments(pool: PgPool) {
    let product_id = seed_product(&pool, "Widget", dec!(10.00)).await;
    let cart = CartStore::new(pool);

    cart.add_item("s1", product_id, 2).await.unwrap();
    cart.update_item("s1", product_id, 7).await.unwrap();
    assert_eq!(cart.items("s1").await.unwrap()[0].quantity, 7);
}

// Cart lines whose product goes inactive vanish from listings and totals.
#[sqlx::test]
#[ignore]
async fn inactive_products_drop_out_of_cart(pool: PgPool) {
    let catalog = CatalogStore::new(pool.clone());
    let keep = seed_product(&pool, "Keep", dec!(4.00)).await;
    let drop = seed_product(&pool, "Drop", dec!(6.00)).await;
    let cart = CartStore::new(pool);

    cart.add_item("s1", keep, 1).await.unwrap();
    cart.add_item("s1", drop, 1).await.unwrap();
    assert_eq!(cart.total("s1").await.unwrap(), dec!(10.00));

    catalog.delete_product(drop).await.unwrap();
    let items = cart.items("s1").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id, keep);
    assert_eq!(cart.total("s1").await.unwrap(), dec!(4.00));
}

#[sqlx::test]
#[ignore]
async fn empty_cart_totals_to_zero(pool: PgPool) {
    let cart = CartStore::new(pool);
    assert_eq!(cart.total("nobody").await.unwrap(), Decimal::ZERO);
}

// P5 / P6 / Scenario B: checkout persists the supplied snapshot total and
// clears the cart.
#[sqlx::test]
#[ignore]
async fn checkout_clears_cart_and_freezes_total(pool: PgPool) {
    let product_id = seed_product(&pool, "Widget", dec!(99.99)).await;
    let cart = CartStore::new(pool.clone());
    let orders = OrderStore::new(pool.clone());

    cart.add_item("s1", product_id, 2).await.unwrap();

    // Supplied price differs from the live catalog price on purpose.
    let lines = [OrderLine {
        product_id,
        product_name: "Widget".to_string(),
        price: dec!(10.00),
        quantity: 2,
    }];
    let order_id = orders.create("s1", &customer(), &lines).await.unwrap();

    assert!(cart.items("s1").await.unwrap().is_empty());
    assert_eq!(cart.total("s1").await.unwrap(), Decimal::ZERO);

    let (order, items) = orders.get(order_id).await.unwrap();
    assert_eq!(order.total_amount, dec!(20.00));
    assert_eq!(order.status, "pending");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_price, dec!(10.00));
}

// P4: a line referencing a missing product aborts the whole attempt; no
// order is visible and the cart is untouched.
#[sqlx::test]
#[ignore]
async fn unknown_product_aborts_checkout(pool: PgPool) {
    let product_id = seed_product(&pool, "Widget", dec!(10.00)).await;
    let cart = CartStore::new(pool.clone());
    let orders = OrderStore::new(pool.clone());

    cart.add_item("s1", product_id, 2).await.unwrap();

    let lines = [
        OrderLine {
            product_id,
            product_name: "Widget".to_string(),
            price: dec!(10.00),
            quantity: 2,
        },
        OrderLine {
            product_id: Uuid::now_v7(),
            product_name: "Ghost".to_string(),
            price: dec!(1.00),
            quantity: 1,
        },
    ];
    assert!(orders.create("s1", &customer(), &lines).await.is_err());

    assert_eq!(order_count(&pool).await, 0);
    assert_eq!(cart.items("s1").await.unwrap()[0].quantity, 2);
}

// P4 again, failing mid item-loop: the second line violates the quantity
// check constraint after the order header and first item were written.
#[sqlx::test]
#[ignore]
async fn failed_item_insert_rolls_back_everything(pool: PgPool) {
    let first = seed_product(&pool, "First", dec!(5.00)).await;
    let second = seed_product(&pool, "Second", dec!(5.00)).await;
    let cart = CartStore::new(pool.clone());
    let orders = OrderStore::new(pool.clone());

    cart.add_item("s1", first, 1).await.unwrap();

    let lines = [
        OrderLine {
            product_id: first,
            product_name: "First".to_string(),
            price: dec!(5.00),
            quantity: 1,
        },
        OrderLine {
            product_id: second,
            product_name: "Second".to_string(),
            price: dec!(5.00),
            quantity: -1,
        },
    ];
    assert!(orders.create("s1", &customer(), &lines).await.is_err());

    assert_eq!(order_count(&pool).await, 0);
    let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(items, 0);
    assert_eq!(cart.items("s1").await.unwrap().len(), 1);
}

#[sqlx::test]
#[ignore]
async fn inactive_product_aborts_checkout(pool: PgPool) {
    let catalog = CatalogStore::new(pool.clone());
    let product_id = seed_product(&pool, "Widget", dec!(10.00)).await;
    catalog.delete_product(product_id).await.unwrap();

    let orders = OrderStore::new(pool.clone());
    let lines = [OrderLine {
        product_id,
        product_name: "Widget".to_string(),
        price: dec!(10.00),
        quantity: 1,
    }];
    assert!(orders.create("s1", &customer(), &lines).await.is_err());
    assert_eq!(order_count(&pool).await, 0);
}

// P7 / Scenario C: soft delete hides the product from the catalog but order
// history keeps its frozen snapshot.
#[sqlx::test]
#[ignore]
async fn soft_delete_preserves_order_history(pool: PgPool) {
    let catalog = CatalogStore::new(pool.clone());
    let orders = OrderStore::new(pool.clone());
    let product_id = seed_product(&pool, "Widget", dec!(10.00)).await;

    let lines = [OrderLine {
        product_id,
        product_name: "Widget".to_string(),
        price: dec!(10.00),
        quantity: 2,
    }];
    let order_id = orders.create("s1", &customer(), &lines).await.unwrap();

    catalog.delete_product(product_id).await.unwrap();

    assert!(catalog.list_products(None, None).await.unwrap().is_empty());
    assert!(catalog.get_product(product_id).await.is_err());

    let (_, items) = orders.get(order_id).await.unwrap();
    assert_eq!(items[0].product_name, "Widget");
    assert_eq!(items[0].product_price, dec!(10.00));
}

#[sqlx::test]
#[ignore]
async fn order_listing_filters_by_session(pool: PgPool) {
    let product_id = seed_product(&pool, "Widget", dec!(10.00)).await;
    let orders = OrderStore::new(pool.clone());
    let line = |qty| OrderLine {
        product_id,
        product_name: "Widget".to_string(),
        price: dec!(10.00),
        quantity: qty,
    };

    orders.create("s1", &customer(), &[line(1)]).await.unwrap();
    orders.create("s2", &customer(), &[line(2)]).await.unwrap();

    assert_eq!(orders.list(Some("s1")).await.unwrap().len(), 1);
    assert_eq!(orders.list(None).await.unwrap().len(), 2);
}

#[sqlx::test]
#[ignore]
async fn search_matches_name_or_description(pool: PgPool) {
    let catalog = CatalogStore::new(pool.clone());
    catalog
        .create_product(&ProductInput {
            description: Some("A sturdy widget".to_string()),
            ..product("Gadget", dec!(3.00))
        })
        .await
        .unwrap();
    catalog.create_product(&product("Doohickey", dec!(4.00))).await.unwrap();

    let hits = catalog.list_products(Some("WIDGET"), None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Gadget");
}

#[sqlx::test]
#[ignore]
async fn category_with_references_cannot_be_deleted(pool: PgPool) {
    let catalog = CatalogStore::new(pool.clone());
    let category_id = catalog.create_category("Tools", None).await.unwrap();
    let product_id = catalog
        .create_product(&ProductInput {
            category_id: Some(category_id),
            ..product("Hammer", dec!(12.00))
        })
        .await
        .unwrap();

    let err = catalog.delete_category(category_id).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot delete a category that products still reference"
    );

    // Soft-deleting the product is not enough; the row still references it.
    catalog.delete_product(product_id).await.unwrap();
    assert!(catalog.delete_category(category_id).await.is_err());
}

// Deleting an elevated account takes exactly a superadmin caller; an admin
// caller gets 403 and the target row is untouched.
#[sqlx::test]
#[ignore]
async fn deleting_elevated_account_takes_superadmin(pool: PgPool) {
    let users = UserStore::new(pool.clone());
    let caller = users
        .create(&new_user("ops", "ops@example.com", Role::Admin))
        .await
        .unwrap();
    let target = users
        .create(&new_user("other-admin", "other@example.com", Role::Admin))
        .await
        .unwrap();
    let boss = users
        .create(&new_user("boss", "boss@example.com", Role::Superadmin))
        .await
        .unwrap();

    let keys = AuthKeys::new("props-test-secret", 1);
    let app = router(AppState::new(pool.clone(), keys.clone(), None));

    let status =
        delete_user_via_api(app.clone(), &keys, (caller, "ops", Role::Admin), target).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(users.get_profile(target).await.is_ok());

    // A plain user target needs only admin.
    let plain = users
        .create(&new_user("shopper", "shopper@example.com", Role::User))
        .await
        .unwrap();
    let status =
        delete_user_via_api(app.clone(), &keys, (caller, "ops", Role::Admin), plain).await;
    assert_eq!(status, StatusCode::OK);
    assert!(users.get_profile(plain).await.is_err());

    let status =
        delete_user_via_api(app.clone(), &keys, (boss, "boss", Role::Superadmin), target).await;
    assert_eq!(status, StatusCode::OK);
    assert!(users.get_profile(target).await.is_err());

    // Unknown or already-deleted targets read as not found.
    let status =
        delete_user_via_api(app.clone(), &keys, (boss, "boss", Role::Superadmin), target).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let status = delete_user_via_api(
        app,
        &keys,
        (boss, "boss", Role::Superadmin),
        Uuid::now_v7(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test]
#[ignore]
async fn duplicate_username_or_email_is_rejected(pool: PgPool) {
    let users = UserStore::new(pool.clone());
    users
        .create(&new_user("sam", "sam@example.com", Role::User))
        .await
        .unwrap();

    assert!(users.username_exists("sam").await.unwrap());
    assert!(!users.username_exists("dean").await.unwrap());
    assert!(users.email_exists("sam@example.com").await.unwrap());
    assert!(!users.email_exists("dean@example.com").await.unwrap());

    // The unique-violation backstop behind the exists checks.
    let err = users
        .create(&new_user("sam", "fresh@example.com", Role::User))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Username or email already exists");
    let err = users
        .create(&new_user("fresh", "sam@example.com", Role::User))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Username or email already exists");
}

#[sqlx::test]
#[ignore]
async fn checkout_requires_at_least_one_line(pool: PgPool) {
    let orders = OrderStore::new(pool.clone());
    let err = orders.create("s1", &customer(), &[]).await.unwrap_err();
    assert_eq!(err.to_string(), "Cart items are required");
    assert_eq!(order_count(&pool).await, 0);
}

#[sqlx::test]
#[ignore]
async fn duplicate_category_name_is_a_validation_error(pool: PgPool) {
    let catalog = CatalogStore::new(pool.clone());
    catalog.create_category("Tools", None).await.unwrap();
    let err = catalog.create_category("Tools", None).await.unwrap_err();
    assert_eq!(err.to_string(), "Category name already exists");
}
