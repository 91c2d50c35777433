//! Custom Resource Definitions admitted by chaos-webhook.
//!
//! - `PhysicalMachineChaos`: chaos experiment against physical machines via chaosd

mod physical_machine_chaos;

pub use physical_machine_chaos::*;
