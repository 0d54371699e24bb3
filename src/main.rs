//! Shop orders service entry point.

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shop_orders::{app, db, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shop_orders=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");

    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to database")?;
    if config.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await.context("failed to run migrations")?;
        tracing::info!("migrations applied");
    }

    let nats = match &config.nats_url {
        Some(url) => match async_nats::connect(url.as_str()).await {
            Ok(client) => {
                tracing::info!(%url, "connected to NATS");
                Some(client)
            }
            Err(error) => {
                tracing::warn!(%url, %error, "NATS unavailable, events disabled");
                None
            }
        },
        None => None,
    };

    let addr = config.socket_addr();
    let app = app(AppState::new(pool, nats, config));

    tracing::info!(%addr, "shop-orders listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
