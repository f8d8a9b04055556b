//! Quorum Server - Main entry point
//!
//! Wires the event store, corruption notifier and HTTP API together.

use std::net::SocketAddr;
use std::sync::Arc;

use quorum_core::{
    alerts::{AlertPublisher, AuditSink, CorruptionNotifier, FsAuditStore, RedisAlertPublisher, WebhookAlertPublisher},
    api::{self, AppState},
    config::{AlertBackend, AlertsConfig, Config, StoreBackend},
    db::Database,
    events::{EventStore, InMemoryEventStore, PgEventStore},
    observability,
    service::ContainerService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!(
            "Warning: Could not load config ({}): {}. Using defaults.",
            e.error_code(),
            e
        );
        Config::default()
    });

    observability::init("quorum-server", &config.observability)?;
    let metrics_handle = observability::metrics::install_prometheus()?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Quorum Server"
    );

    let store: Arc<dyn EventStore> = match config.store.backend {
        StoreBackend::Postgres => {
            let db = Database::new(&config.database).await?;
            db.migrate().await?;
            tracing::info!("Connected to database, migrations applied");
            Arc::new(PgEventStore::new(db.pool().clone()))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory event store; events will not survive a restart");
            Arc::new(InMemoryEventStore::new())
        }
    };

    let publisher = build_alert_publisher(&config.alerts)?;
    let audit: Option<Arc<dyn AuditSink>> = match config.audit.root_dir.as_deref() {
        Some(root) => Some(Arc::new(FsAuditStore::new(root))),
        None => {
            tracing::warn!("Audit storage root not configured; audit records disabled");
            None
        }
    };

    let notifier = CorruptionNotifier::new(publisher, audit);
    let service = ContainerService::new(store, notifier);

    let app = api::build_router(AppState::new(service).with_metrics(metrics_handle));

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!(address = %addr, "Starting HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    observability::shutdown();
    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Build the configured alert channel. A backend without a destination
/// yields `None`; the notifier then only warns.
fn build_alert_publisher(config: &AlertsConfig) -> anyhow::Result<Option<Arc<dyn AlertPublisher>>> {
    let publisher: Option<Arc<dyn AlertPublisher>> = match config.backend {
        AlertBackend::Redis => match config.topic.as_deref() {
            Some(topic) => Some(Arc::new(RedisAlertPublisher::from_url(&config.redis_url, topic)?)),
            None => None,
        },
        AlertBackend::Webhook => match config.webhook_url.as_deref() {
            Some(url) => Some(Arc::new(WebhookAlertPublisher::new(url)?)),
            None => None,
        },
        AlertBackend::None => None,
    };

    match &publisher {
        Some(p) => tracing::info!(destination = p.destination(), "Alert channel configured"),
        None => tracing::warn!("Alert channel destination not configured; corrupt event alerts disabled"),
    }

    Ok(publisher)
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
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
