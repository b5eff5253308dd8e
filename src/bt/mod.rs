//! Behaviour-tree engine - tick-based composable decision making
//!
//! One generic engine drives both the per-soldier trees and the team AI
//! trees. Nodes are ticked once per simulation frame and yield control by
//! returning [`Status::Running`]; that returned status is the system's only
//! concurrency primitive.
//!
//! Key properties:
//! - Composites exclusively own their children (no sharing, no cycles)
//! - Failure is a first-class result, never an error or panic
//! - `ActiveSelector` gives priority interruption: a higher-priority branch
//!   becoming executable aborts the running lower-priority one

pub mod behaviour;
pub mod builder;
pub mod composite;
pub mod decorator;
pub mod parallel;
pub mod status;

#[cfg(test)]
pub(crate) mod testkit;

// Re-exports for convenient access
pub use behaviour::{Behaviour, Node};
pub use builder::{
    action, active_selector, condition, inverter, monitor, node, parallel, repeat, selector,
    sequence, with_status,
};
pub use composite::{ActiveSelector, Selector, Sequence};
pub use decorator::{Inverter, Repeat, ReturnSpecificStatus};
pub use parallel::{Monitor, Parallel, Policy};
pub use status::Status;
