// Electricity Dashboard API v0.1
use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod db;
mod errors;
mod helpers;
mod routes;
mod services;

use config::AppConfig;

/// Maximum number of connections in the database pool.
const DB_POOL_MAX_CONNECTIONS: u32 = 5;
/// Minimum number of connections kept alive in the database pool.
const DB_POOL_MIN_CONNECTIONS: u32 = 2;

/// Electricity Dashboard API — OpenAPI specification.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Electricity Dashboard API",
        version = "0.1.0",
        description = "Read-only API over historical hourly electricity data. \
            Aggregates hourly production, consumption and price records into \
            paginated daily summaries with data-quality diagnostics and \
            negative-price streaks, plus per-day drill-downs with peak-hour \
            analytics.",
        license(name = "MIT"),
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Electricity", description = "Daily summaries and single-day statistics"),
    ),
    paths(
        routes::health::health_check,
        routes::electricity::list_daily,
        routes::electricity::get_single_day,
    ),
    components(
        schemas(
            routes::health::HealthResponse,
            routes::electricity::DailyListItem,
            routes::electricity::ListMeta,
            routes::electricity::DailyListResponse,
            routes::electricity::PricedHourDto,
            routes::electricity::MaxDiffHourDto,
            routes::electricity::DaySummaryDto,
            routes::electricity::HourlyRecordDto,
            routes::electricity::SingleDayResponse,
            services::stats::DataQuality,
            errors::ErrorResponse,
        )
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "electricity_dashboard_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    // Set up database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(DB_POOL_MAX_CONNECTIONS)
        .min_connections(DB_POOL_MIN_CONNECTIONS)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // CORS — read-only API, restrict methods to GET
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    // Build router
    let electricity_routes = Router::new()
        .route("/api/electricity", get(routes::electricity::list_daily))
        .route(
            "/api/electricity/:date",
            get(routes::electricity::get_single_day),
        )
        .with_state(pool.clone());

    // Health check uses PgPool to verify DB connectivity
    let health_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .with_state(pool);

    let app = Router::new()
        .merge(health_routes)
        .merge(electricity_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("API server listening on {}", addr);
    tracing::info!(
        "Swagger UI available at http://localhost:{}/swagger-ui/",
        config.port
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");
    axum::serve(listener, app)
        .await
        .expect("Server terminated unexpectedly");
}
