// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for chaos-webhook.
//!
//! Uses proptest to generate random inputs and verify invariants.

#[path = "../common/fixtures.rs"]
mod fixtures;

use proptest::prelude::*;

use chaos_webhook::crd::PhysicalMachineChaosAction;
use chaos_webhook::webhooks::{AdmissionError, normalize_address};
use chaos_webhook::{Defaulter, Validator};

use fixtures::PhysicalMachineChaosBuilder;

/// Strategy for a single address element: bare hosts, http(s) URLs, other
/// schemes and the occasional empty string.
fn address_element() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-z0-9.]{1,15}(:[0-9]{2,5})?",
        "https?://[a-z0-9.]{1,15}",
        "[a-z]{2,8}://[a-z0-9.]{1,10}",
        "http[a-z]{0,4}",
    ]
}

/// Strategy for comma-joined address lists.
fn address_list() -> impl Strategy<Value = String> {
    prop::collection::vec(address_element(), 1..8).prop_map(|parts| parts.join(","))
}

/// Strategy for experiment actions.
fn any_action() -> impl Strategy<Value = PhysicalMachineChaosAction> {
    prop_oneof![
        Just(PhysicalMachineChaosAction::StressCpu),
        Just(PhysicalMachineChaosAction::StressMem),
        Just(PhysicalMachineChaosAction::DiskFill),
        Just(PhysicalMachineChaosAction::NetworkDelay),
        Just(PhysicalMachineChaosAction::NetworkLoss),
        Just(PhysicalMachineChaosAction::Process),
        Just(PhysicalMachineChaosAction::Clock),
        "[a-z]{3,10}-[a-z]{3,10}".prop_map(PhysicalMachineChaosAction::from),
    ]
}

proptest! {
    /// Property: Every element starts with "http" after normalization.
    #[test]
    fn test_all_elements_prefixed(address in address_list()) {
        let normalized = normalize_address(&address);
        for element in normalized.split(',') {
            prop_assert!(element.starts_with("http"), "element {:?} not prefixed", element);
        }
    }

    /// Property: Element count and order are preserved; each element is either
    /// unchanged or gets exactly "http://" prepended.
    #[test]
    fn test_order_and_count_preserved(address in address_list()) {
        let normalized = normalize_address(&address);
        let before: Vec<&str> = address.split(',').collect();
        let after: Vec<&str> = normalized.split(',').collect();
        prop_assert_eq!(before.len(), after.len());

        for (original, updated) in before.iter().zip(after.iter()) {
            if original.starts_with("http") {
                prop_assert_eq!(original, updated);
            } else {
                prop_assert_eq!(format!("http://{}", original), *updated);
            }
        }
    }

    /// Property: Normalization is idempotent.
    #[test]
    fn test_normalization_idempotent(address in address_list()) {
        let once = normalize_address(&address);
        prop_assert_eq!(normalize_address(&once), once);
    }

    /// Property: Defaulting twice equals defaulting once.
    #[test]
    fn test_defaulting_idempotent(address in address_list(), action in any_action()) {
        let mut chaos = PhysicalMachineChaosBuilder::new("prop")
            .action(action)
            .address(address)
            .build();
        chaos.apply_defaults();
        let once = chaos.spec.clone();
        chaos.apply_defaults();
        prop_assert_eq!(chaos.spec, once);
    }

    /// Property: A non-empty uid survives defaulting untouched.
    #[test]
    fn test_preset_uid_stable(uid in "[a-z0-9-]{1,36}") {
        let mut chaos = PhysicalMachineChaosBuilder::new("prop").uid(uid.clone()).build();
        chaos.apply_defaults();
        prop_assert_eq!(chaos.spec.uid, uid);
    }

    /// Property: An update that leaves the spec alone is accepted.
    #[test]
    fn test_update_reflexive(address in address_list(), action in any_action()) {
        let chaos = PhysicalMachineChaosBuilder::new("prop")
            .action(action)
            .address(address)
            .uid("fixed")
            .build();
        prop_assert!(chaos.validate_update(&chaos.clone()).is_ok());
    }

    /// Property: Any address change on update is rejected.
    #[test]
    fn test_address_change_rejected(a in address_list(), b in address_list()) {
        prop_assume!(a != b);
        let old = PhysicalMachineChaosBuilder::new("prop").address(a).uid("fixed").build();
        let new = PhysicalMachineChaosBuilder::new("prop").address(b).uid("fixed").build();
        prop_assert_eq!(new.validate_update(&old), Err(AdmissionError::SpecImmutable));
    }

    /// Property: Create and delete accept every spec.
    #[test]
    fn test_create_and_delete_accept_all(address in address_list(), action in any_action()) {
        let chaos = PhysicalMachineChaosBuilder::new("prop")
            .action(action)
            .address(address)
            .build();
        prop_assert!(chaos.validate_create().is_ok());
        prop_assert!(chaos.validate_delete().is_ok());
    }
}
