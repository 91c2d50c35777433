// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Unit tests for chaos-webhook.
//!
//! These tests run without a Kubernetes cluster and exercise the admission
//! hooks through the public API only.

#[path = "../common/fixtures.rs"]
mod fixtures;

mod defaulting_tests {
    use chaos_webhook::Defaulter;
    use uuid::Uuid;

    use crate::fixtures::PhysicalMachineChaosBuilder;

    #[test]
    fn test_create_defaults() {
        let mut chaos = PhysicalMachineChaosBuilder::new("burn-cpu")
            .address("10.0.0.1,https://10.0.0.2,badscheme://x")
            .build();
        chaos.apply_defaults();

        assert_eq!(
            chaos.spec.address,
            "http://10.0.0.1,https://10.0.0.2,http://badscheme://x"
        );
        assert!(Uuid::parse_str(&chaos.spec.uid).is_ok());
    }

    #[test]
    fn test_preset_uid_kept() {
        let mut chaos = PhysicalMachineChaosBuilder::new("burn-cpu")
            .uid("experiment-42")
            .build();
        chaos.apply_defaults();
        assert_eq!(chaos.spec.uid, "experiment-42");
    }

    #[test]
    fn test_defaults_do_not_touch_other_fields() {
        let original = PhysicalMachineChaosBuilder::new("burn-cpu")
            .uid("fixed")
            .address("http://10.0.0.1")
            .stress_cpu(4, 100)
            .duration("1m")
            .build();
        let mut chaos = original.clone();
        chaos.apply_defaults();

        assert_eq!(chaos.spec, original.spec);
        assert_eq!(chaos.metadata, original.metadata);
    }
}

mod validation_tests {
    use chaos_webhook::Validator;
    use chaos_webhook::crd::PhysicalMachineChaosAction;
    use chaos_webhook::webhooks::AdmissionError;

    use crate::fixtures::{PhysicalMachineChaosBuilder, admitted_chaos};

    #[test]
    fn test_create_always_accepted() {
        let specs = [
            PhysicalMachineChaosBuilder::new("empty").address("").build(),
            PhysicalMachineChaosBuilder::new("commas").address(",,,").build(),
            admitted_chaos("ok"),
        ];
        for chaos in specs {
            assert!(chaos.validate_create().is_ok());
        }
    }

    #[test]
    fn test_update_same_spec_accepted() {
        let old = admitted_chaos("burn-cpu");
        assert!(old.validate_update(&old).is_ok());
    }

    #[test]
    fn test_update_any_change_rejected() {
        let old = admitted_chaos("burn-cpu");

        let mut changes = Vec::new();

        let mut new = old.clone();
        new.spec.action = PhysicalMachineChaosAction::NetworkDelay;
        changes.push(new);

        let mut new = old.clone();
        new.spec.duration = Some("10m".to_string());
        changes.push(new);

        let mut new = old.clone();
        new.spec.exp_info.stress_cpu = None;
        changes.push(new);

        let mut new = old.clone();
        new.spec.uid = String::new();
        changes.push(new);

        for new in changes {
            assert_eq!(
                new.validate_update(&old),
                Err(AdmissionError::SpecImmutable)
            );
        }
    }

    #[test]
    fn test_update_metadata_only_accepted() {
        let old = admitted_chaos("burn-cpu");
        let mut new = old.clone();
        new.metadata.labels = Some([("owner".to_string(), "sre".to_string())].into());
        new.metadata.generation = Some(2);
        assert!(new.validate_update(&old).is_ok());
    }

    #[test]
    fn test_delete_always_accepted() {
        let malformed = PhysicalMachineChaosBuilder::new("x")
            .address(",")
            .duration("forever")
            .build();
        assert!(malformed.validate_delete().is_ok());
        assert!(admitted_chaos("ok").validate_delete().is_ok());
    }
}

mod field_error_tests {
    use chaos_webhook::webhooks::{AdmissionError, ErrorList, FieldError, FieldPath};

    #[test]
    fn test_errors_accumulate_into_one_rejection() {
        let spec = FieldPath::new("spec");
        let mut errs = ErrorList::new();
        errs.push(FieldError::invalid(spec.child("address"), "ftp://x", "unsupported scheme"));
        errs.push(FieldError::required(spec.child("duration"), ""));

        let err = AdmissionError::from(errs.to_aggregate().unwrap());
        assert_eq!(err.reason(), "FieldValueInvalid");
        assert_eq!(
            err.to_string(),
            "[spec.address: Invalid value: \"ftp://x\": unsupported scheme, spec.duration: Required value]"
        );
    }
}

mod config_tests {
    use chaos_webhook::WebhookConfig;

    #[test]
    fn test_default_config_points_at_mounted_certs() {
        let config = WebhookConfig::default();
        assert_eq!(config.cert_path.to_str(), Some("/etc/webhook/certs/tls.crt"));
        assert_eq!(config.key_path.to_str(), Some("/etc/webhook/certs/tls.key"));
    }
}
