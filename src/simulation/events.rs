//! Events generated during simulation frames
//!
//! Returned alongside the world for display in the runner's match log;
//! the simulation itself never reads them back.

use serde::{Deserialize, Serialize};

use crate::arena::grid::GridPos;
use crate::core::types::{EntityId, Team, Tick};
use crate::team::manoeuvre::ManoeuvreKind;

/// One notable thing that happened, stamped with its frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
    ShotFired {
        tick: Tick,
        attacker: EntityId,
        target: EntityId,
    },
    SoldierKilled {
        tick: Tick,
        team: Team,
        entity: EntityId,
    },
    SoldierRespawned {
        tick: Tick,
        team: Team,
        entity: EntityId,
        position: GridPos,
    },
    FlagTaken {
        tick: Tick,
        flag_owner: Team,
        carrier: EntityId,
    },
    FlagDropped {
        tick: Tick,
        flag_owner: Team,
        position: GridPos,
    },
    FlagReturned {
        tick: Tick,
        flag_owner: Team,
    },
    FlagCaptured {
        tick: Tick,
        scoring_team: Team,
        score: u32,
    },
    ManoeuvreStarted {
        tick: Tick,
        team: Team,
        kind: ManoeuvreKind,
        participants: usize,
    },
    ManoeuvreEnded {
        tick: Tick,
        team: Team,
        kind: ManoeuvreKind,
        outcome: ManoeuvreOutcome,
    },
    MatchEnded {
        tick: Tick,
        red_score: u32,
        blue_score: u32,
    },
}

/// Why a manoeuvre stopped running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ManoeuvreOutcome {
    Succeeded,
    Failed,
    /// Cheap validity check stopped holding (e.g. the target flag moved)
    Invalidated,
    /// A new manoeuvre claimed the category
    Preempted,
}
