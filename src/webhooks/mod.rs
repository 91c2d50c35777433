//! Admission webhooks for PhysicalMachineChaos.
//!
//! - Mutating: [`defaulting`] assigns the experiment uid and normalizes addresses
//! - Validating: tiered [`policies`]
//!   - Tier 1 (Update): spec immutability, only on UPDATE
//!   - Tier 2 (Spec): field rules, on CREATE and UPDATE

pub mod defaulting;
pub mod field;
pub mod policies;
mod server;

pub use defaulting::{Defaulter, normalize_address};
pub use field::{Aggregate, ErrorList, ErrorType, FieldError, FieldPath};
pub use policies::{AdmissionError, Validator};
pub use server::{
    Defaulting, MUTATE_PATH, VALIDATE_PATH, WebhookError, WebhookState, create_webhook_router,
    defaulting_patch, run_webhook_server,
};

// Re-export kube-rs admission types for contract testing
pub use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview, Operation};
