use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use photobooth_api::background::lease_reaper;
use photobooth_api::config::ServerConfig;
use photobooth_api::feed::FeedRegistry;
use photobooth_api::router::build_app_router;
use photobooth_api::state::AppState;
use photobooth_storage::PhotoUrlResolver;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photobooth_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid server configuration");
            std::process::exit(1);
        }
    };
    tracing::info!(
        host = %config.host,
        port = config.port,
        lease_secs = config.lease.lease_secs,
        max_attempts = config.lease.max_attempts,
        signed_urls = config.storage.signed_urls_enabled,
        "Loaded server configuration"
    );
    if config.print_agent_key.is_none() {
        tracing::warn!("PRINT_AGENT_KEY is not set; printer agents will be rejected");
    }

    // --- Database ---
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        tracing::error!("DATABASE_URL must be set");
        std::process::exit(1);
    };

    let pool = photobooth_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    photobooth_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    photobooth_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Image URLs ---
    let image_urls = match PhotoUrlResolver::from_config(&config.storage).await {
        Ok(resolver) => resolver,
        Err(e) => {
            tracing::error!(error = %e, "Failed to configure photo storage");
            std::process::exit(1);
        }
    };

    // --- Live feed ---
    let feed = Arc::new(FeedRegistry::new());

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        image_urls: Arc::new(image_urls),
        feed: Arc::clone(&feed),
    };

    // --- Lease reaper ---
    let reaper_cancel = CancellationToken::new();
    let reaper_handle = tokio::spawn(lease_reaper::run(
        state.clone(),
        Duration::from_secs(config.lease_reaper_interval_secs),
        reaper_cancel.clone(),
    ));

    // --- Router ---
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

    reaper_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), reaper_handle).await;
    tracing::info!("Lease reaper stopped");

    feed.shutdown_all().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
