//! Field rules for PhysicalMachineChaos specs.
//!
//! Tier 2 (Spec): Always enforced on CREATE and UPDATE
//!
//! No rules are registered yet, so every spec is accepted. New rules
//! implement [`SpecRule`] and are added to [`SPEC_RULES`].

use crate::crd::PhysicalMachineChaosSpec;
use crate::webhooks::field::{ErrorList, FieldPath};

/// A single check over a spec.
///
/// Rules report every problem they find; they never stop early.
pub trait SpecRule: Send + Sync {
    /// Short identifier, unique among the registered rules.
    fn name(&self) -> &'static str;

    /// Check `spec`, rooted at `path`.
    fn check(&self, spec: &PhysicalMachineChaosSpec, path: &FieldPath) -> ErrorList;
}

/// Rules applied to every PhysicalMachineChaos spec.
pub const SPEC_RULES: &[&dyn SpecRule] = &[];

/// Validate `spec` against [`SPEC_RULES`].
pub fn validate_spec(spec: &PhysicalMachineChaosSpec) -> ErrorList {
    validate_with(spec, SPEC_RULES)
}

/// Validate `spec` against `rules`, collecting the errors of all of them.
pub fn validate_with(spec: &PhysicalMachineChaosSpec, rules: &[&dyn SpecRule]) -> ErrorList {
    let path = FieldPath::new("spec");
    let mut all_errs = ErrorList::new();
    for rule in rules {
        all_errs.extend(rule.check(spec, &path));
    }
    all_errs
}
