//! PhysicalMachineChaos Custom Resource Definition.
//!
//! Describes a chaos experiment injected into physical machines through the
//! chaosd daemons listening on `spec.address`. The operator side of Chaos Mesh
//! owns the experiment; this crate only admits or rejects the object.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// PhysicalMachineChaos is the custom resource for physical machine experiments.
///
/// Example:
/// ```yaml
/// apiVersion: chaos-mesh.org/v1alpha1
/// kind: PhysicalMachineChaos
/// metadata:
///   name: burn-cpu
/// spec:
///   action: stress-cpu
///   address: "10.0.0.1:31767,https://10.0.0.2:31768"
///   stress-cpu:
///     workers: 2
///     load: 80
///   duration: 5m
/// ```
///
/// Every spec type derives `PartialEq`: the update guard compares whole specs
/// structurally.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "chaos-mesh.org",
    version = "v1alpha1",
    kind = "PhysicalMachineChaos",
    plural = "physicalmachinechaos",
    shortname = "pmc",
    status = "ChaosStatus",
    namespaced,
    printcolumn = r#"{"name":"Action", "type":"string", "jsonPath":".spec.action"}"#,
    printcolumn = r#"{"name":"Duration", "type":"string", "jsonPath":".spec.duration"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalMachineChaosSpec {
    /// The experiment to run on the target machines.
    #[serde(default)]
    #[schemars(with = "String")]
    pub action: PhysicalMachineChaosAction,

    /// Comma-separated chaosd endpoints. Each element is prefixed with
    /// `http://` during admission unless it already starts with `http`.
    #[serde(default)]
    pub address: String,

    /// Unique id of this experiment instance, generated at admission when empty.
    #[serde(default)]
    pub uid: String,

    /// How long the experiment lasts (e.g. "30s", "5m"). Unset runs until deleted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    /// Parameters for the selected action.
    #[serde(flatten)]
    pub exp_info: ExpInfo,
}

/// Experiment kinds understood by chaosd.
///
/// Serialized as the plain kebab-case action name. Names chaosd gained after
/// this list was written are kept verbatim in [`PhysicalMachineChaosAction::Other`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum PhysicalMachineChaosAction {
    #[default]
    StressCpu,
    StressMem,
    DiskReadPayload,
    DiskWritePayload,
    DiskFill,
    NetworkCorrupt,
    NetworkDuplicate,
    NetworkLoss,
    NetworkDelay,
    NetworkPartition,
    NetworkDns,
    Process,
    JvmException,
    Clock,
    /// Any other action name.
    Other(String),
}

impl PhysicalMachineChaosAction {
    /// The action name as it appears in the resource.
    pub fn as_str(&self) -> &str {
        match self {
            PhysicalMachineChaosAction::StressCpu => "stress-cpu",
            PhysicalMachineChaosAction::StressMem => "stress-mem",
            PhysicalMachineChaosAction::DiskReadPayload => "disk-read-payload",
            PhysicalMachineChaosAction::DiskWritePayload => "disk-write-payload",
            PhysicalMachineChaosAction::DiskFill => "disk-fill",
            PhysicalMachineChaosAction::NetworkCorrupt => "network-corrupt",
            PhysicalMachineChaosAction::NetworkDuplicate => "network-duplicate",
            PhysicalMachineChaosAction::NetworkLoss => "network-loss",
            PhysicalMachineChaosAction::NetworkDelay => "network-delay",
            PhysicalMachineChaosAction::NetworkPartition => "network-partition",
            PhysicalMachineChaosAction::NetworkDns => "network-dns",
            PhysicalMachineChaosAction::Process => "process",
            PhysicalMachineChaosAction::JvmException => "jvm-exception",
            PhysicalMachineChaosAction::Clock => "clock",
            PhysicalMachineChaosAction::Other(name) => name,
        }
    }
}

impl From<String> for PhysicalMachineChaosAction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "stress-cpu" => PhysicalMachineChaosAction::StressCpu,
            "stress-mem" => PhysicalMachineChaosAction::StressMem,
            "disk-read-payload" => PhysicalMachineChaosAction::DiskReadPayload,
            "disk-write-payload" => PhysicalMachineChaosAction::DiskWritePayload,
            "disk-fill" => PhysicalMachineChaosAction::DiskFill,
            "network-corrupt" => PhysicalMachineChaosAction::NetworkCorrupt,
            "network-duplicate" => PhysicalMachineChaosAction::NetworkDuplicate,
            "network-loss" => PhysicalMachineChaosAction::NetworkLoss,
            "network-delay" => PhysicalMachineChaosAction::NetworkDelay,
            "network-partition" => PhysicalMachineChaosAction::NetworkPartition,
            "network-dns" => PhysicalMachineChaosAction::NetworkDns,
            "process" => PhysicalMachineChaosAction::Process,
            "jvm-exception" => PhysicalMachineChaosAction::JvmException,
            "clock" => PhysicalMachineChaosAction::Clock,
            _ => PhysicalMachineChaosAction::Other(name),
        }
    }
}

impl From<PhysicalMachineChaosAction> for String {
    fn from(action: PhysicalMachineChaosAction) -> Self {
        match action {
            PhysicalMachineChaosAction::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for PhysicalMachineChaosAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-action parameter blocks. Serialized inline in the spec, keyed by the
/// action name.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct ExpInfo {
    #[serde(rename = "stress-cpu", default, skip_serializing_if = "Option::is_none")]
    pub stress_cpu: Option<StressCpuSpec>,

    #[serde(rename = "stress-mem", default, skip_serializing_if = "Option::is_none")]
    pub stress_mem: Option<StressMemorySpec>,

    #[serde(
        rename = "disk-read-payload",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub disk_read_payload: Option<DiskPayloadSpec>,

    #[serde(
        rename = "disk-write-payload",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub disk_write_payload: Option<DiskPayloadSpec>,

    #[serde(rename = "disk-fill", default, skip_serializing_if = "Option::is_none")]
    pub disk_fill: Option<DiskFillSpec>,

    #[serde(
        rename = "network-delay",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub network_delay: Option<NetworkDelaySpec>,

    #[serde(
        rename = "network-loss",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub network_loss: Option<NetworkLossSpec>,

    #[serde(rename = "process", default, skip_serializing_if = "Option::is_none")]
    pub process: Option<ProcessSpec>,
}

/// CPU stressors.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct StressCpuSpec {
    /// Number of stressor workers.
    #[serde(default)]
    pub workers: i32,

    /// Percentage of one CPU each worker keeps busy.
    #[serde(default)]
    pub load: i32,

    /// Extra options passed through to stress-ng.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Memory stressors.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct StressMemorySpec {
    /// Amount of memory to occupy, e.g. "256MB".
    #[serde(default)]
    pub size: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

/// Disk read or write payload.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct DiskPayloadSpec {
    /// Target file or block device.
    #[serde(default)]
    pub path: String,

    /// Bytes to read or write, e.g. "1G".
    #[serde(default)]
    pub size: String,

    #[serde(default)]
    pub payload_process_num: u8,
}

/// Disk fill.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct DiskFillSpec {
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub size: String,

    /// Use fallocate instead of writing zeroes.
    #[serde(default)]
    pub fill_by_fallocate: bool,
}

/// Network latency injection.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkDelaySpec {
    /// Network interface to shape.
    #[serde(default)]
    pub device: String,

    /// Latency to add, e.g. "100ms".
    #[serde(default)]
    pub latency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<String>,

    /// Only affect traffic to these IPs or CIDRs (comma-separated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Packet loss injection.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkLossSpec {
    #[serde(default)]
    pub device: String,

    /// Loss percentage, e.g. "25".
    #[serde(default)]
    pub percent: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// Process kill or stop.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ProcessSpec {
    /// Process name or pid.
    #[serde(default)]
    pub process: String,

    /// Signal number to deliver.
    #[serde(default)]
    pub signal: i32,
}

// ============================================================================
// Status
// ============================================================================

/// Observed state of a PhysicalMachineChaos. Never compared by admission.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChaosStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Standard Kubernetes-style condition.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition.
    pub r#type: ChaosConditionType,
    /// Status of the condition ("True", "False", "Unknown").
    pub status: String,
    /// Machine-readable reason for the last transition.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Last time the condition transitioned from one status to another.
    pub last_transition_time: String,
}

impl Condition {
    /// Create a new condition stamped with the current time.
    pub fn new(condition_type: ChaosConditionType, status: bool, reason: &str) -> Self {
        Self {
            r#type: condition_type,
            status: if status {
                "True".to_string()
            } else {
                "False".to_string()
            },
            reason: reason.to_string(),
            last_transition_time: jiff::Timestamp::now().to_string(),
        }
    }

    /// Create a "Selected" condition.
    pub fn selected(selected: bool, reason: &str) -> Self {
        Self::new(ChaosConditionType::Selected, selected, reason)
    }

    /// Create an "AllInjected" condition.
    pub fn all_injected(injected: bool, reason: &str) -> Self {
        Self::new(ChaosConditionType::AllInjected, injected, reason)
    }

    /// Create an "AllRecovered" condition.
    pub fn all_recovered(recovered: bool, reason: &str) -> Self {
        Self::new(ChaosConditionType::AllRecovered, recovered, reason)
    }

    /// Whether the condition status is "True".
    pub fn is_true(&self) -> bool {
        self.status == "True"
    }
}

/// Condition types reported by the chaos controller.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize, JsonSchema)]
pub enum ChaosConditionType {
    /// Target machines have been selected.
    Selected,
    /// The fault is injected on every target.
    AllInjected,
    /// Every target has recovered.
    AllRecovered,
    /// The experiment is paused.
    Paused,
}
