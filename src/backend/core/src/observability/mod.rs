//! Observability: Distributed Tracing, Metrics, and Logging.

use opentelemetry_otlp::WithExportConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Initialize the observability stack.
///
/// Installs a JSON (or pretty) fmt layer filtered by `RUST_LOG`, falling back
/// to the configured level, plus an OTLP exporter when an endpoint is set.
pub fn init(service_name: &str, config: &ObservabilityConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let telemetry_layer = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let tracer = opentelemetry_otlp::new_pipeline()
                .tracing()
                .with_exporter(
                    opentelemetry_otlp::new_exporter()
                        .tonic()
                        .with_endpoint(endpoint),
                )
                .with_trace_config(
                    opentelemetry_sdk::trace::config()
                        .with_resource(opentelemetry_sdk::Resource::new(vec![
                            opentelemetry::KeyValue::new("service.name", service_name.to_string()),
                        ])),
                )
                .install_batch(opentelemetry_sdk::runtime::Tokio)?;

            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    let json_layer = config
        .json_logging
        .then(|| tracing_subscriber::fmt::layer().json());
    let pretty_layer = (!config.json_logging).then(|| tracing_subscriber::fmt::layer().pretty());

    tracing_subscriber::registry()
        .with(filter)
        .with(telemetry_layer)
        .with(json_layer)
        .with(pretty_layer)
        .init();

    Ok(())
}

/// Shutdown OpenTelemetry.
pub fn shutdown() {
    opentelemetry::global::shutdown_tracer_provider();
}

/// Metrics registry and helpers.
pub mod metrics {
    use metrics::{counter, describe_counter};
    use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

    use crate::events::ContainerState;

    /// Register all metric descriptions.
    pub fn register_metrics() {
        describe_counter!(
            "quorum_events_appended_total",
            "Container events appended to the store, by state"
        );
        describe_counter!(
            "quorum_corrupt_alerts_total",
            "Corrupt event alerts, by outcome (published, failed, skipped)"
        );
        describe_counter!(
            "quorum_resolutions_total",
            "Per-container quorum resolutions, by outcome"
        );
        describe_counter!(
            "quorum_errors_total",
            "Errors constructed, by code, category and severity"
        );
    }

    /// Install the Prometheus recorder and return its render handle.
    pub fn install_prometheus() -> anyhow::Result<PrometheusHandle> {
        let handle = PrometheusBuilder::new().install_recorder()?;
        register_metrics();
        Ok(handle)
    }

    /// Record a successful append.
    pub fn record_event_appended(state: ContainerState) {
        counter!("quorum_events_appended_total", "state" => state.as_str()).increment(1);
    }
}
