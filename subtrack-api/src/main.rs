//! # Subtrack API Server
//!
//! REST service for tracking users' paid subscriptions.
//!
//! ## Startup
//!
//! 1. Load staged configuration (`APP_STAGE`, default `prod`)
//! 2. Connect to PostgreSQL and apply pending migrations
//! 3. Serve the router until Ctrl-C
//!
//! ## Usage
//!
//! ```bash
//! APP_STAGE=dev cargo run -p subtrack-api
//! ```
//!
//! Set `LOG_FORMAT=json` for structured log lines; `RUST_LOG` overrides the
//! default filter.

use std::net::SocketAddr;
use std::sync::Arc;

use subtrack_api::app::{build_router, AppState, SWAGGER_PATH};
use subtrack_api::config::Config;
use subtrack_shared::db::{
    migrations::{get_migration_status, run_migrations},
    pool::{close_pool, create_pool},
};
use subtrack_shared::repository::postgres::PgSubscriptionRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "Subtrack API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::load()?;

    let pool = create_pool(config.database.pool_config()?).await?;
    run_migrations(&pool).await?;

    let status = get_migration_status(&pool).await?;
    tracing::info!(
        applied_migrations = status.applied_migrations,
        latest_version = ?status.latest_version,
        "Database ready"
    );

    let repo = Arc::new(PgSubscriptionRepository::new(pool.clone()));
    let bind_address = config.bind_address();

    tracing::info!("===============> Subscription CRUDL api <===============");
    tracing::info!("=> Host: {}", config.server.host);
    tracing::info!("=> Port: {}", config.server.port);
    tracing::info!("=> Swagger: {}", SWAGGER_PATH);

    let app = build_router(AppState::new(repo));

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "subtrack_api=debug,subtrack_shared=info,tower_http=debug".into()
    });

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
