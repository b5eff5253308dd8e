//! Frame-stepped match orchestration
//!
//! Single-threaded and cooperative: one step advances every soldier's
//! behaviour tree, resolves flag interactions, then advances every team
//! AI, in a fixed host-controlled order. All cross-actor communication
//! goes through the message hub; no actor mutates another's state
//! directly.

pub mod context;
pub mod events;
pub mod perception;
pub mod runner;
pub mod world;

pub use context::{FlagState, FlagStatus, MatchState};
pub use events::SimulationEvent;
pub use runner::Simulation;
pub use world::World;
