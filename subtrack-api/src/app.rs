/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use subtrack_api::{app::AppState, config::Config};
/// use subtrack_shared::db::pool::create_pool;
/// use subtrack_shared::repository::postgres::PgSubscriptionRepository;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// let pool = create_pool(config.database.pool_config()?).await?;
/// let state = AppState::new(Arc::new(PgSubscriptionRepository::new(pool)));
/// let app = subtrack_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{middleware::request_log::log_request, openapi::ApiDoc, routes};
use axum::{
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use subtrack_shared::repository::SubscriptionRepository;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Path of the Swagger UI
pub const SWAGGER_PATH: &str = "/swagger-ui";

/// Path of the generated OpenAPI document
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Subscription storage
    pub repo: Arc<dyn SubscriptionRepository>,
}

impl AppState {
    /// Creates new application state
    pub fn new(repo: Arc<dyn SubscriptionRepository>) -> Self {
        Self { repo }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                           # Health check
/// ├── /swagger-ui                       # Interactive API docs
/// ├── /api-docs/openapi.json            # OpenAPI document
/// └── /api/v1/
///     └── /subscriptions
///         ├── POST                      # Create
///         ├── GET    [?id=]             # Read one / list all
///         ├── PUT    ?id=               # Partial update
///         ├── DELETE ?id=               # Delete
///         └── GET    /calculate         # Total cost with filters
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. CORS (permissive)
/// 2. Access log
/// 3. Tracing spans (tower-http TraceLayer)
pub fn build_router(state: AppState) -> Router {
    let subscription_routes = Router::new()
        .route(
            "/subscriptions",
            get(routes::subscriptions::get_subscriptions)
                .post(routes::subscriptions::create_subscription)
                .put(routes::subscriptions::update_subscription)
                .delete(routes::subscriptions::delete_subscription),
        )
        .route(
            "/subscriptions/calculate",
            get(routes::subscriptions::calculate_total_cost),
        );

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api/v1", subscription_routes)
        .merge(SwaggerUi::new(SWAGGER_PATH).url(OPENAPI_PATH, ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
