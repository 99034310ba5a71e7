use std::net::SocketAddr;
use std::sync::Arc;

use rentshare_api::config::ServerConfig;
use rentshare_api::router::build_app_router;
use rentshare_api::state::AppState;
use rentshare_core::clock::SystemClock;
use rentshare_core::payment_window::PaymentWindowPolicy;
use rentshare_worker::{shutdown_signal, ExpiryScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "rentshare_api=debug,rentshare_worker=debug,tower_http=debug".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = rentshare_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    rentshare_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    rentshare_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Request expiry ---
    let payment_policy = Arc::new(PaymentWindowPolicy::default());

    let expiry_handle = if config.expiry.enabled {
        Some(
            ExpiryScheduler::for_pool(pool.clone())
                .with_interval(config.expiry.interval)
                .with_policy((*payment_policy).clone())
                .start(),
        )
    } else {
        tracing::warn!("Request expiry scheduler disabled");
        None
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        clock: Arc::new(SystemClock),
        payment_policy,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    if let Some(handle) = expiry_handle {
        handle.stop().await;
        tracing::info!("Request expiry scheduler stopped");
    }

    tracing::info!("Graceful shutdown complete");
}
