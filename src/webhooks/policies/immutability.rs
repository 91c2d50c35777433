//! Immutability validation policy.
//!
//! Tier 1 (Update): Only enforced on UPDATE operations
//!
//! Validates:
//! - The spec of a running experiment never changes. Targets may already be
//!   under fault injection; new parameters require delete and recreate.
//!
//! Metadata and status are not compared.

use super::AdmissionError;
use crate::crd::PhysicalMachineChaosSpec;

/// Reject the update if `new` differs from `old` in any spec field.
pub fn check_immutable(
    old: &PhysicalMachineChaosSpec,
    new: &PhysicalMachineChaosSpec,
) -> Result<(), AdmissionError> {
    if old != new {
        return Err(AdmissionError::SpecImmutable);
    }
    Ok(())
}
