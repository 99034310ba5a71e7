use rentshare_worker::{shutdown_signal, ExpiryConfig, ExpiryScheduler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentshare_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ExpiryConfig::from_env().expect("Invalid request expiry configuration");
    if !config.enabled {
        tracing::warn!("REQUEST_EXPIRY_ENABLED is false, nothing to do");
        return;
    }

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = rentshare_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    rentshare_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    let handle = ExpiryScheduler::for_pool(pool)
        .with_interval(config.interval)
        .start();

    shutdown_signal().await;

    handle.stop().await;
    tracing::info!("Worker stopped");
}
