//! Defaulting for PhysicalMachineChaos.
//!
//! Runs on the mutating webhook before validation:
//! - Assigns a fresh experiment uid when none is set
//! - Prefixes every chaosd address that does not start with `http` with `http://`

use uuid::Uuid;

use crate::crd::{PhysicalMachineChaos, PhysicalMachineChaosSpec};

/// Scheme prepended to addresses that lack one.
pub const DEFAULT_ADDRESS_SCHEME: &str = "http://";

/// Types that fill in their own unset fields during admission.
///
/// Implementations must be total: defaulting never rejects an object.
pub trait Defaulter {
    /// Mutate `self` in place, setting defaults and normalizing fields.
    fn apply_defaults(&mut self);
}

impl Defaulter for PhysicalMachineChaos {
    fn apply_defaults(&mut self) {
        self.spec.apply_defaults();
    }
}

impl Defaulter for PhysicalMachineChaosSpec {
    fn apply_defaults(&mut self) {
        if self.uid.is_empty() {
            self.uid = Uuid::new_v4().to_string();
        }

        self.address = normalize_address(&self.address);
    }
}

/// Prefix each comma-separated element with `http://` unless it already
/// starts with `http`.
///
/// This is a literal prefix test: `badscheme://x` becomes
/// `http://badscheme://x`, and an empty element becomes `http://`. Order and
/// element count are preserved.
pub fn normalize_address(address: &str) -> String {
    address
        .split(',')
        .map(|element| {
            if element.starts_with("http") {
                element.to_string()
            } else {
                format!("{}{}", DEFAULT_ADDRESS_SCHEME, element)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
