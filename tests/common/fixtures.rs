//! Test fixtures and builder patterns for PhysicalMachineChaos.

#![allow(dead_code)]

use chaos_webhook::crd::{
    ExpInfo, PhysicalMachineChaos, PhysicalMachineChaosAction, PhysicalMachineChaosSpec,
    StressCpuSpec,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Builder for creating PhysicalMachineChaos test fixtures.
///
/// # Example
/// ```
/// let chaos = PhysicalMachineChaosBuilder::new("burn-cpu")
///     .namespace("chaos-testing")
///     .address("10.0.0.1:31767,10.0.0.2:31767")
///     .stress_cpu(2, 80)
///     .build();
/// ```
#[derive(Clone, Debug)]
pub struct PhysicalMachineChaosBuilder {
    name: String,
    namespace: Option<String>,
    action: PhysicalMachineChaosAction,
    address: String,
    uid: String,
    duration: Option<String>,
    exp_info: ExpInfo,
    labels: BTreeMap<String, String>,
    generation: Option<i64>,
}

impl PhysicalMachineChaosBuilder {
    /// Create a new builder with the given resource name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            action: PhysicalMachineChaosAction::StressCpu,
            address: "10.0.0.1:31767".to_string(),
            uid: String::new(),
            duration: None,
            exp_info: ExpInfo::default(),
            labels: BTreeMap::new(),
            generation: None,
        }
    }

    /// Set the namespace for the resource.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the experiment action.
    pub fn action(mut self, action: PhysicalMachineChaosAction) -> Self {
        self.action = action;
        self
    }

    /// Set the raw chaosd address list.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the experiment uid.
    pub fn uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = uid.into();
        self
    }

    /// Set the experiment duration.
    pub fn duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Configure a CPU stress experiment.
    pub fn stress_cpu(mut self, workers: i32, load: i32) -> Self {
        self.action = PhysicalMachineChaosAction::StressCpu;
        self.exp_info.stress_cpu = Some(StressCpuSpec {
            workers,
            load,
            options: vec![],
        });
        self
    }

    /// Add a label to the resource metadata.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Set the generation.
    pub fn generation(mut self, generation: i64) -> Self {
        self.generation = Some(generation);
        self
    }

    /// Build the PhysicalMachineChaos.
    pub fn build(self) -> PhysicalMachineChaos {
        PhysicalMachineChaos {
            metadata: ObjectMeta {
                name: Some(self.name),
                namespace: self.namespace,
                labels: if self.labels.is_empty() {
                    None
                } else {
                    Some(self.labels)
                },
                generation: self.generation,
                ..Default::default()
            },
            spec: PhysicalMachineChaosSpec {
                action: self.action,
                address: self.address,
                uid: self.uid,
                duration: self.duration,
                exp_info: self.exp_info,
            },
            status: None,
        }
    }
}

impl Default for PhysicalMachineChaosBuilder {
    fn default() -> Self {
        Self::new("test-chaos")
    }
}

/// Create a PhysicalMachineChaos as the API server would store it after
/// defaulting: uid set and addresses prefixed.
pub fn admitted_chaos(name: &str) -> PhysicalMachineChaos {
    PhysicalMachineChaosBuilder::new(name)
        .namespace("default")
        .address("http://10.0.0.1:31767,https://10.0.0.2:31767")
        .uid(format!("uid-{}", name))
        .stress_cpu(1, 50)
        .duration("5m")
        .generation(1)
        .build()
}
