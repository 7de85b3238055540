use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::auth::AuthKeys;
use storefront::config::AppConfig;
use storefront::{router, store, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    let pool = store::connect(&config).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url).await {
            Ok(client) => Some(client),
            Err(err) => {
                tracing::warn!(error = %err, "NATS unavailable, events disabled");
                None
            }
        },
        None => None,
    };

    let keys = AuthKeys::new(&config.auth_secret, config.auth_token_ttl_hours);
    let app = router(AppState::new(pool, keys, nats));

    let addr = config.bind_addr();
    tracing::info!("storefront listening on {addr}");
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app).await?;
    Ok(())
}
