//! Team AI - knowledge, manoeuvres and the decision loop
//!
//! The team layer turns individual soldiers into squads. A team AI keeps
//! a belief store fed by messages (enemy records, flag state), runs at
//! most one manoeuvre per category at a time, and hands soldiers orders
//! whose progress flows back as UpdateOrderState messages.

pub mod knowledge;
pub mod manoeuvre;
pub mod manoeuvres;
pub mod team_ai;
pub mod tree;

pub use knowledge::{EnemyRecord, FlagBelief, FlagKnowledge, TeamKnowledge};
pub use manoeuvre::{
    Manoeuvre, ManoeuvreCategory, ManoeuvreCore, ManoeuvreKind, ManoeuvreRoster, TeamCtx,
};
pub use team_ai::TeamState;
pub use tree::build_team_tree;
