//! HTTP API for Quorum Core.
//!
//! Thin axum layer over [`ContainerService`]:
//!
//! - `POST /containers/events` - record an observation
//! - `GET  /containers/:id/status` - quorum-resolved state of one container
//! - `GET  /containers` - containers whose observation count reached quorum
//! - `GET  /health`, `GET /metrics` - operational endpoints

mod handlers;

pub use handlers::{CreateEventRequest, StatusResponse};

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::service::ContainerService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: ContainerService,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(service: ContainerService) -> Self {
        Self {
            service,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Build the API router.
///
/// # Example
///
/// ```rust,ignore
/// let state = AppState::new(ContainerService::new(store, notifier));
/// let app = build_router(state);
/// ```
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::prometheus_metrics))
        .route("/containers", get(handlers::list_verified))
        .route("/containers/events", post(handlers::create_event))
        .route("/containers/:id/status", get(handlers::get_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// API response wrapper for successful calls. Failures are rendered by
/// [`QuorumError`](crate::error::QuorumError)'s own `IntoResponse`.
#[derive(serde::Serialize, serde::Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
        }
    }
}
