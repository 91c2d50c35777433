//! Validation policies for PhysicalMachineChaos admission webhooks.
//!
//! Policies are organized into tiers:
//! - Tier 1 (Update): Only enforced on UPDATE operations (spec immutability).
//!   A rejected update stops here.
//! - Tier 2 (Spec): Field rules, always enforced on CREATE and UPDATE. Every
//!   rule runs and all field errors are reported together.

pub mod immutability;
pub mod spec_rules;

use thiserror::Error;

use crate::crd::PhysicalMachineChaos;
use crate::webhooks::field::Aggregate;

/// Why an admission request was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The stored spec differs from the submitted one.
    #[error("spec is immutable; updates to the chaos spec are not permitted")]
    SpecImmutable,

    /// One or more field rules failed.
    #[error("{0}")]
    Invalid(#[from] Aggregate),
}

impl AdmissionError {
    /// Machine-readable reason used in denial responses.
    pub fn reason(&self) -> &'static str {
        match self {
            AdmissionError::SpecImmutable => "SpecImmutable",
            AdmissionError::Invalid(_) => "FieldValueInvalid",
        }
    }
}

/// Admission checks for a resource, one per request kind.
pub trait Validator {
    /// Check a new object.
    fn validate_create(&self) -> Result<(), AdmissionError>;

    /// Check a replacement for `old`.
    fn validate_update(&self, old: &Self) -> Result<(), AdmissionError>;

    /// Check a deletion.
    fn validate_delete(&self) -> Result<(), AdmissionError>;
}

impl PhysicalMachineChaos {
    /// Run the spec rules and fold any failures into one error.
    pub fn validate(&self) -> Result<(), AdmissionError> {
        match spec_rules::validate_spec(&self.spec).to_aggregate() {
            Some(aggregate) => Err(AdmissionError::Invalid(aggregate)),
            None => Ok(()),
        }
    }
}

impl Validator for PhysicalMachineChaos {
    fn validate_create(&self) -> Result<(), AdmissionError> {
        self.validate()
    }

    fn validate_update(&self, old: &Self) -> Result<(), AdmissionError> {
        immutability::check_immutable(&old.spec, &self.spec)?;
        self.validate()
    }

    fn validate_delete(&self) -> Result<(), AdmissionError> {
        Ok(())
    }
}
