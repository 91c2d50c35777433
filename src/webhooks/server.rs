//! Admission webhook server.
//!
//! Provides HTTP endpoints for Kubernetes admission webhooks:
//! - `POST /mutate-chaos-mesh-org-v1alpha1-physicalmachinechaos` applies defaults
//!   on CREATE and answers with a JSON patch
//! - `POST /validate-chaos-mesh-org-v1alpha1-physicalmachinechaos` runs the
//!   create/update/delete checks
//!
//! To enable webhooks:
//! 1. Deploy cert-manager for TLS certificates
//! 2. Create the Mutating and ValidatingWebhookConfiguration
//! 3. Mount the TLS certificate secret to the pod at /etc/webhook/certs/
//!
//! The webhook server starts automatically when certificates are present.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use axum_server::Handle;
use kube::Resource;
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::WebhookConfig;
use crate::crd::PhysicalMachineChaos;
use crate::health::HealthState;
use crate::webhooks::defaulting::Defaulter;
use crate::webhooks::policies::{AdmissionError, Validator};

/// Path of the mutating (defaulting) endpoint
pub const MUTATE_PATH: &str = "/mutate-chaos-mesh-org-v1alpha1-physicalmachinechaos";
/// Path of the validating endpoint
pub const VALIDATE_PATH: &str = "/validate-chaos-mesh-org-v1alpha1-physicalmachinechaos";

const MUTATE: &str = "mutate";
const VALIDATE: &str = "validate";

/// Shared state for webhook handlers
pub struct WebhookState {
    pub health: Arc<HealthState>,
}

impl WebhookState {
    pub fn new(health: Arc<HealthState>) -> Self {
        Self { health }
    }

    fn record(&self, webhook: &str, operation: &str, outcome: &str, started: Instant) {
        self.health.metrics.record_admission(
            webhook,
            operation,
            outcome,
            started.elapsed().as_secs_f64(),
        );
    }
}

/// Reviews are decoded untyped; the object is parsed per operation.
type ReviewPayload = Result<Json<AdmissionReview<DynamicObject>>, JsonRejection>;
type ReviewResponse = (StatusCode, Json<AdmissionReview<DynamicObject>>);

/// A rejected request, before it is turned into a response.
struct Denial {
    reason: String,
    message: String,
}

impl Denial {
    fn invalid_request(message: &str) -> Self {
        Self {
            reason: "InvalidRequest".to_string(),
            message: message.to_string(),
        }
    }

    fn invalid_object(message: &str) -> Self {
        Self {
            reason: "InvalidObject".to_string(),
            message: message.to_string(),
        }
    }
}

impl From<AdmissionError> for Denial {
    fn from(err: AdmissionError) -> Self {
        Self {
            reason: err.reason().to_string(),
            message: err.to_string(),
        }
    }
}

/// Create a denial response with reason embedded in message.
/// kube-rs deny() only sets status.message, so we format as "[reason] message"
fn deny_with_reason<T: Resource>(
    request: &AdmissionRequest<T>,
    message: &str,
    reason: &str,
) -> AdmissionReview<DynamicObject> {
    let full_message = format!("[{}] {}", reason, message);
    AdmissionResponse::from(request)
        .deny(full_message)
        .into_review()
}

fn operation_label(operation: &Operation) -> &'static str {
    match operation {
        Operation::Create => "CREATE",
        Operation::Update => "UPDATE",
        Operation::Delete => "DELETE",
        Operation::Connect => "CONNECT",
    }
}

fn invalid_review(message: String) -> ReviewResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(AdmissionResponse::invalid(message).into_review()),
    )
}

/// Unwrap the request from a review, or build the 400 response for it.
fn extract_request(
    payload: ReviewPayload,
) -> Result<AdmissionRequest<DynamicObject>, ReviewResponse> {
    let Json(review) = match payload {
        Ok(json) => json,
        Err(rejection) => {
            error!(error = %rejection, "Failed to decode AdmissionReview");
            return Err(invalid_review(format!(
                "Invalid AdmissionReview: {}",
                rejection
            )));
        }
    };

    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(error = %e, "Failed to extract admission request");
            return Err(invalid_review(format!("Invalid AdmissionReview: {}", e)));
        }
    };
    Ok(request)
}

fn parse_chaos(object: &DynamicObject) -> Result<PhysicalMachineChaos, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(object)?)
}

/// Result of defaulting a submitted object.
#[derive(Debug)]
pub struct Defaulting {
    /// Patch against the submitted JSON.
    pub patch: json_patch::Patch,
    /// The object after defaults were applied.
    pub resource: PhysicalMachineChaos,
    /// Spec fields the defaults changed.
    pub defaulted_fields: Vec<&'static str>,
}

/// Compute the JSON patch that defaults `object`, the JSON the API server
/// submitted.
///
/// Only `spec.uid` and `spec.address` are written back, so fields the typed
/// resource does not model are never touched and missing keys become `add`
/// operations.
pub fn defaulting_patch(object: &Value) -> Result<Defaulting, serde_json::Error> {
    let submitted: PhysicalMachineChaos = serde_json::from_value(object.clone())?;
    let mut resource = submitted.clone();
    resource.apply_defaults();

    let mut defaulted_fields = Vec::new();
    if submitted.spec.uid != resource.spec.uid {
        defaulted_fields.push("uid");
    }
    if submitted.spec.address != resource.spec.address {
        defaulted_fields.push("address");
    }

    let mut updated = object.clone();
    if let Some(root) = updated.as_object_mut() {
        let spec = root
            .entry("spec")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(spec) = spec.as_object_mut() {
            spec.insert("uid".to_string(), Value::String(resource.spec.uid.clone()));
            spec.insert(
                "address".to_string(),
                Value::String(resource.spec.address.clone()),
            );
        }
    }

    Ok(Defaulting {
        patch: json_patch::diff(object, &updated),
        resource,
        defaulted_fields,
    })
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(MUTATE_PATH, post(mutate_physicalmachinechaos))
        .route(VALIDATE_PATH, post(validate_physicalmachinechaos))
        .with_state(state)
}

/// Mutating admission handler: fills in defaults on CREATE
async fn mutate_physicalmachinechaos(
    State(state): State<Arc<WebhookState>>,
    payload: ReviewPayload,
) -> impl IntoResponse {
    let started = Instant::now();
    let request = match extract_request(payload) {
        Ok(req) => req,
        Err(response) => {
            state.record(MUTATE, "UNKNOWN", "invalid", started);
            return response;
        }
    };

    let uid = &request.uid;
    let operation = operation_label(&request.operation);
    debug!(
        uid = %uid,
        operation,
        namespace = ?request.namespace,
        name = %request.name,
        "Processing mutation request"
    );

    // Defaults are applied once, when the experiment is created
    if request.operation != Operation::Create {
        state.record(MUTATE, operation, "allowed", started);
        return (
            StatusCode::OK,
            Json(AdmissionResponse::from(&request).into_review()),
        );
    }

    let Some(object) = request.object.as_ref() else {
        error!(uid = %uid, "Missing object in request");
        state.record(MUTATE, operation, "denied", started);
        return (
            StatusCode::OK,
            Json(deny_with_reason(
                &request,
                "Missing object in request",
                "InvalidRequest",
            )),
        );
    };

    let defaulting = match serde_json::to_value(object).and_then(|raw| defaulting_patch(&raw)) {
        Ok(result) => result,
        Err(e) => {
            warn!(uid = %uid, error = %e, "Object does not decode as PhysicalMachineChaos");
            state.record(MUTATE, operation, "denied", started);
            return (
                StatusCode::OK,
                Json(deny_with_reason(&request, &e.to_string(), "InvalidObject")),
            );
        }
    };

    for field in &defaulting.defaulted_fields {
        state.health.metrics.record_defaulted(field);
    }

    if defaulting.patch.0.is_empty() {
        info!(uid = %uid, name = %request.name, "Nothing to default");
        state.record(MUTATE, operation, "allowed", started);
        return (
            StatusCode::OK,
            Json(AdmissionResponse::from(&request).into_review()),
        );
    }

    let experiment_uid = defaulting.resource.spec.uid.clone();
    match AdmissionResponse::from(&request).with_patch(defaulting.patch) {
        Ok(response) => {
            info!(
                uid = %uid,
                name = %request.name,
                experiment_uid = %experiment_uid,
                "Defaults applied"
            );
            state.record(MUTATE, operation, "allowed", started);
            (StatusCode::OK, Json(response.into_review()))
        }
        Err(e) => {
            error!(uid = %uid, error = %e, "Failed to encode defaulting patch");
            state.record(MUTATE, operation, "denied", started);
            (
                StatusCode::OK,
                Json(deny_with_reason(&request, &e.to_string(), "DefaultingFailed")),
            )
        }
    }
}

/// Parse the object the check needs, or explain why it cannot be checked.
fn required_object(
    object: Option<&DynamicObject>,
    missing: &str,
) -> Result<PhysicalMachineChaos, Denial> {
    let object = object.ok_or_else(|| Denial::invalid_request(missing))?;
    parse_chaos(object).map_err(|e| Denial::invalid_object(&e.to_string()))
}

/// Dispatch a request to the create/update/delete checks
fn run_validation(request: &AdmissionRequest<DynamicObject>) -> Result<(), Denial> {
    match request.operation {
        Operation::Create => {
            let resource = required_object(request.object.as_ref(), "Missing object in request")?;
            resource.validate_create()?;
        }
        Operation::Update => {
            let resource = required_object(request.object.as_ref(), "Missing object in request")?;
            let old = required_object(
                request.old_object.as_ref(),
                "Missing oldObject in UPDATE request",
            )?;
            resource.validate_update(&old)?;
        }
        Operation::Delete => {
            // The API server sends the stored object as oldObject on DELETE.
            // A stored object that no longer decodes must still be deletable.
            match request.old_object.as_ref().map(parse_chaos) {
                Some(Ok(old)) => old.validate_delete()?,
                Some(Err(e)) => {
                    debug!(error = %e, "oldObject does not decode, allowing delete");
                }
                None => {}
            }
        }
        Operation::Connect => {}
    }
    Ok(())
}

/// Validating admission handler
async fn validate_physicalmachinechaos(
    State(state): State<Arc<WebhookState>>,
    payload: ReviewPayload,
) -> impl IntoResponse {
    let started = Instant::now();
    let request = match extract_request(payload) {
        Ok(req) => req,
        Err(response) => {
            state.record(VALIDATE, "UNKNOWN", "invalid", started);
            return response;
        }
    };

    let uid = &request.uid;
    let operation = operation_label(&request.operation);
    debug!(
        uid = %uid,
        operation,
        namespace = ?request.namespace,
        name = %request.name,
        dry_run = request.dry_run,
        "Processing admission request"
    );

    if let Err(denial) = run_validation(&request) {
        warn!(
            uid = %uid,
            operation,
            name = %request.name,
            reason = %denial.reason,
            message = %denial.message,
            "Admission request denied"
        );
        state.record(VALIDATE, operation, "denied", started);
        return (
            StatusCode::OK,
            Json(deny_with_reason(&request, &denial.message, &denial.reason)),
        );
    }

    info!(uid = %uid, operation, name = %request.name, "Admission request allowed");
    state.record(VALIDATE, operation, "allowed", started);
    (
        StatusCode::OK,
        Json(AdmissionResponse::from(&request).into_review()),
    )
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Flip readiness on once the server behind `handle` has bound its port.
/// Readiness stays off if the bind fails.
async fn mark_ready_when_listening(handle: Handle, health: Arc<HealthState>) {
    match handle.listening().await {
        Some(addr) => {
            info!(%addr, "Webhook server listening");
            health.set_ready(true).await;
        }
        None => error!("Webhook server failed to bind, staying not ready"),
    }
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0 on the configured port and serves both admission
/// endpoints. TLS certificates are loaded from the configured PEM files.
/// Readiness is flipped on once the port is bound, and off again if the
/// server stops with an error.
pub async fn run_webhook_server(
    config: &WebhookConfig,
    health: Arc<HealthState>,
) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;
    use std::net::SocketAddr;

    let state = Arc::new(WebhookState::new(health.clone()));
    let app = create_webhook_router(state);

    let tls = RustlsConfig::from_pem_file(&config.cert_path, &config.key_path)
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.webhook_port));
    let handle = Handle::new();
    tokio::spawn(mark_ready_when_listening(handle.clone(), health.clone()));

    info!(port = config.webhook_port, "Starting webhook server with TLS");
    if let Err(e) = axum_server::bind_rustls(addr, tls)
        .handle(handle)
        .serve(app.into_make_service())
        .await
    {
        health.set_ready(false).await;
        return Err(WebhookError::Server(e.to_string()));
    }

    Ok(())
}
