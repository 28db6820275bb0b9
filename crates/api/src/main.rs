use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relay_api::config::ServerConfig;
use relay_api::router::build_app_router;
use relay_api::state::AppState;
use relay_api::background;
use relay_engine::transport::{AnalyticsSink, TransportDispatcher, WebhookTransport};
use relay_engine::{DeliveryEngine, EventTypeCatalog};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_api=debug,relay_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://relay.db?mode=rwc".into());

    let pool = relay_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    relay_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    relay_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event type catalogue ---
    EventTypeCatalog::bootstrap(&pool)
        .await
        .expect("Failed to bootstrap event type catalogue");

    // --- Delivery engine ---
    let webhook = WebhookTransport::new(Duration::from_secs(config.webhook_timeout_secs))
        .expect("Failed to build webhook HTTP client");
    let (analytics_sink, mut analytics_rx) = AnalyticsSink::channel();
    let dispatcher = Arc::new(TransportDispatcher::new(webhook, analytics_sink));

    let cancel = CancellationToken::new();

    // In-process analytics consumer: emit each record as a structured log line.
    let analytics_cancel = cancel.clone();
    let analytics_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = analytics_cancel.cancelled() => break,
                record = analytics_rx.recv() => {
                    let Some(record) = record else { break };
                    tracing::info!(
                        sink = %record.sink,
                        event_id = record.envelope.event_id,
                        event_type = %record.envelope.event_type,
                        "Analytics event",
                    );
                }
            }
        }
    });

    let engine = Arc::new(DeliveryEngine::new(
        pool.clone(),
        dispatcher,
        config.engine_config(),
    ));
    let engine_handles = engine.start(cancel.clone());
    tracing::info!(
        workers = config.engine_worker_count,
        "Delivery engine started"
    );

    // --- Event retention ---
    let retention_handle = tokio::spawn(background::retention::run(
        pool.clone(),
        config.event_retention_days,
        cancel.clone(),
    ));

    // --- App state and router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
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

    cancel.cancel();
    for handle in engine_handles {
        let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
    }
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), analytics_handle).await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server shuts
/// down cleanly whether stopped interactively or by a process manager.
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
