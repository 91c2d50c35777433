//! chaos-webhook library crate
//!
//! Admission control for `PhysicalMachineChaos` resources: defaulting on the
//! mutating webhook, create/update/delete checks on the validating webhook.
//! Exports the CRD types, the webhook hooks and server, and the health server.

pub mod config;
pub mod crd;
pub mod health;
pub mod webhooks;

pub use config::{ConfigError, WebhookConfig};
pub use health::{HealthState, run_health_server};
pub use webhooks::{Defaulter, Validator, WebhookError, run_webhook_server};
