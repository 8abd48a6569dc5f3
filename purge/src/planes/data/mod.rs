pub mod dispatch;
pub mod webhook;

pub use dispatch::{dispatch_to_target, probe_health, TargetOutcome};
