//! Soldier entities and their individual behaviour trees
//!
//! Each soldier runs its own tree once per frame: a dead gate, team-order
//! execution, reactive combat and a patrol fallback, arbitrated by an
//! active selector so higher-priority branches preempt lower ones. Leaves
//! read and write the soldier's own memory (threats, current target,
//! current order) and report to the team AI purely through messages.

pub mod behaviours;
pub mod state;
pub mod tree;

pub use state::{ActiveOrder, PathProgress, Soldier, ThreatRecord};
pub use tree::build_soldier_tree;
