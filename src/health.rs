//! Health server for Kubernetes probes and Prometheus metrics.
//!
//! Provides:
//! - `/healthz` - Liveness probe (always returns 200 if server is running)
//! - `/readyz` - Readiness probe (returns 200 when ready to serve traffic)
//! - `/metrics` - Prometheus metrics endpoint

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::{EncodeLabel, EncodeLabelSet, LabelSetEncoder};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;
use tokio::sync::RwLock;
use tracing::info;

/// Labels for admission request metrics
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct AdmissionLabels {
    /// Which endpoint served the request ("mutate" or "validate")
    pub webhook: String,
    /// Admission operation ("CREATE", "UPDATE", ...)
    pub operation: String,
    /// "allowed", "denied" or "invalid"
    pub outcome: String,
}

impl EncodeLabelSet for AdmissionLabels {
    fn encode(&self, mut encoder: LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("webhook", self.webhook.as_str()).encode(encoder.encode_label())?;
        ("operation", self.operation.as_str()).encode(encoder.encode_label())?;
        ("outcome", self.outcome.as_str()).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Labels for per-webhook latency
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct WebhookLabels {
    pub webhook: String,
}

impl EncodeLabelSet for WebhookLabels {
    fn encode(&self, mut encoder: LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("webhook", self.webhook.as_str()).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Labels for defaulted fields
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct FieldLabels {
    pub field: String,
}

impl EncodeLabelSet for FieldLabels {
    fn encode(&self, mut encoder: LabelSetEncoder<'_>) -> Result<(), std::fmt::Error> {
        ("field", self.field.as_str()).encode(encoder.encode_label())?;
        Ok(())
    }
}

/// Shared metrics for the webhook
pub struct Metrics {
    /// Admission requests by webhook, operation and outcome
    pub admission_requests_total: Family<AdmissionLabels, Counter>,
    /// Admission handling duration histogram
    pub admission_duration_seconds: Family<WebhookLabels, Histogram>,
    /// Fields filled in or rewritten by defaulting
    pub defaulted_fields_total: Family<FieldLabels, Counter>,
    /// Prometheus registry
    registry: Registry,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new metrics instance with registered metrics
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let admission_requests_total = Family::<AdmissionLabels, Counter>::default();
        registry.register(
            "chaos_webhook_admission_requests",
            "Total number of admission requests",
            admission_requests_total.clone(),
        );

        let admission_duration_seconds =
            Family::<WebhookLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.0001, 2.0, 15))
            });
        registry.register(
            "chaos_webhook_admission_duration_seconds",
            "Duration of admission handling in seconds",
            admission_duration_seconds.clone(),
        );

        let defaulted_fields_total = Family::<FieldLabels, Counter>::default();
        registry.register(
            "chaos_webhook_defaulted_fields",
            "Total number of fields set or rewritten by defaulting",
            defaulted_fields_total.clone(),
        );

        Self {
            admission_requests_total,
            admission_duration_seconds,
            defaulted_fields_total,
            registry,
        }
    }

    /// Record one admission decision
    pub fn record_admission(
        &self,
        webhook: &str,
        operation: &str,
        outcome: &str,
        duration_secs: f64,
    ) {
        let labels = AdmissionLabels {
            webhook: webhook.to_string(),
            operation: operation.to_string(),
            outcome: outcome.to_string(),
        };
        self.admission_requests_total.get_or_create(&labels).inc();
        self.admission_duration_seconds
            .get_or_create(&WebhookLabels {
                webhook: webhook.to_string(),
            })
            .observe(duration_secs);
    }

    /// Record a field changed by defaulting
    pub fn record_defaulted(&self, field: &str) {
        self.defaulted_fields_total
            .get_or_create(&FieldLabels {
                field: field.to_string(),
            })
            .inc();
    }

    /// Encode metrics to Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        if encode(&mut buffer, &self.registry).is_err() {
            tracing::error!("Failed to encode metrics");
            return "# Error encoding metrics".to_string();
        }
        buffer
    }
}

/// Shared state for the health server
pub struct HealthState {
    /// Whether the webhook is ready to receive admission requests
    ready: RwLock<bool>,
    /// Metrics registry
    pub metrics: Metrics,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Create a new health state (starts as not ready)
    pub fn new() -> Self {
        Self {
            ready: RwLock::new(false),
            metrics: Metrics::new(),
        }
    }

    /// Mark the webhook as ready or not ready
    pub async fn set_ready(&self, ready: bool) {
        *self.ready.write().await = ready;
    }

    /// Check if the webhook is ready
    pub async fn is_ready(&self) -> bool {
        *self.ready.read().await
    }
}

/// Liveness probe handler
async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Readiness probe handler
///
/// Returns 503 Service Unavailable until the webhook server is listening,
/// and again once shutdown has started.
async fn readyz(State(state): State<Arc<HealthState>>) -> Response {
    if state.is_ready().await {
        (StatusCode::OK, "ready").into_response()
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not ready").into_response()
    }
}

/// Metrics handler
async fn metrics_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let body = state.metrics.encode();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// Create the health server router
pub fn create_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Run the health server on `port` (plain HTTP).
pub async fn run_health_server(state: Arc<HealthState>, port: u16) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(port, "Starting health server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
