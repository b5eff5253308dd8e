//! Test environment - the grid the match is played on
//!
//! The arena supplies the environment queries the squad AI depends on
//! (base layouts, entrances, staging positions, line of sight, path
//! calculation). Pathfinding stays contract-level: callers only ask for
//! a walkable path, never about the search internals.

pub mod grid;
pub mod map;

pub use grid::GridPos;
pub use map::{Arena, BaseLayout};
