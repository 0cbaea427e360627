//! Application layer: long-running widget orchestration.

pub mod queue_poller;

pub use queue_poller::{PollerConfig, PollerEvent, QueuePoller, Snapshot, StopReason};
