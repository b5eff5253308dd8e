//! The CTF game context - flags, score and the match clock
//!
//! The context owns ground truth about the match and is the origin of the
//! flag, score and time notifications broadcast to the registered team
//! AIs. Team knowledge is belief; this is fact.

use serde::{Deserialize, Serialize};

use crate::arena::grid::GridPos;
use crate::comms::message::Message;
use crate::core::types::{EntityId, Team};
use crate::simulation::events::SimulationEvent;
use crate::simulation::world::World;

/// Seconds between TimeUpdate broadcasts
const TIME_BROADCAST_INTERVAL: f32 = 5.0;

/// Ground-truth state of one flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlagState {
    InBase,
    Stolen { carrier: EntityId },
    Dropped { position: GridPos },
}

/// One flag with its home position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagStatus {
    pub owner: Team,
    pub state: FlagState,
    pub base_position: GridPos,
}

impl FlagStatus {
    pub fn at_base(owner: Team, base_position: GridPos) -> Self {
        Self {
            owner,
            state: FlagState::InBase,
            base_position,
        }
    }

    pub fn carrier(&self) -> Option<EntityId> {
        match self.state {
            FlagState::Stolen { carrier } => Some(carrier),
            _ => None,
        }
    }
}

/// Score, clock and both flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    red_flag: FlagStatus,
    blue_flag: FlagStatus,
    red_score: u32,
    blue_score: u32,
    pub time_remaining: f32,
    time_since_broadcast: f32,
    pub finished: bool,
}

impl MatchState {
    pub fn new(red_flag_base: GridPos, blue_flag_base: GridPos, match_duration: f32) -> Self {
        Self {
            red_flag: FlagStatus::at_base(Team::Red, red_flag_base),
            blue_flag: FlagStatus::at_base(Team::Blue, blue_flag_base),
            red_score: 0,
            blue_score: 0,
            time_remaining: match_duration,
            time_since_broadcast: 0.0,
            finished: false,
        }
    }

    pub fn flag(&self, owner: Team) -> &FlagStatus {
        match owner {
            Team::Red => &self.red_flag,
            Team::Blue => &self.blue_flag,
        }
    }

    pub fn flag_mut(&mut self, owner: Team) -> &mut FlagStatus {
        match owner {
            Team::Red => &mut self.red_flag,
            Team::Blue => &mut self.blue_flag,
        }
    }

    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::Red => self.red_score,
            Team::Blue => self.blue_score,
        }
    }

    fn add_score(&mut self, team: Team) -> u32 {
        match team {
            Team::Red => {
                self.red_score += 1;
                self.red_score
            }
            Team::Blue => {
                self.blue_score += 1;
                self.blue_score
            }
        }
    }
}

/// Advance the clock, broadcasting TimeUpdate periodically and ending the
/// match at zero
pub fn update_clock(world: &mut World, dt: f32) {
    if world.match_state.finished {
        return;
    }

    world.match_state.time_remaining = (world.match_state.time_remaining - dt).max(0.0);
    world.match_state.time_since_broadcast += dt;

    if world.match_state.time_since_broadcast >= TIME_BROADCAST_INTERVAL {
        world.match_state.time_since_broadcast = 0.0;
        let remaining = world.match_state.time_remaining;
        world.broadcast_from_context(Message::TimeUpdate { remaining });
    }

    if world.match_state.time_remaining <= 0.0 {
        world.match_state.finished = true;
        let event = SimulationEvent::MatchEnded {
            tick: world.tick,
            red_score: world.match_state.score(Team::Red),
            blue_score: world.match_state.score(Team::Blue),
        };
        tracing::info!(
            red = world.match_state.score(Team::Red),
            blue = world.match_state.score(Team::Blue),
            "match over"
        );
        world.events.push(event);
    }
}

/// Resolve pickups, returns and captures by proximity
///
/// Runs after the entity ticks each frame so movement from this frame
/// counts. Order is fixed: returns before pickups before captures, each
/// in soldier vector order, which keeps ties deterministic.
pub fn resolve_flags(world: &mut World) {
    let radius = world.config.flag_interaction_radius;
    let ids: Vec<EntityId> = world
        .soldiers
        .iter()
        .filter(|s| s.alive)
        .map(|s| s.id)
        .collect();

    for id in ids {
        resolve_flag_return(world, id, radius);
        resolve_flag_pickup(world, id, radius);
        resolve_capture(world, id, radius);
    }
}

/// Touching the own team's dropped flag sends it home
fn resolve_flag_return(world: &mut World, id: EntityId, radius: f32) {
    let Some(soldier) = world.soldier(id) else {
        return;
    };
    let team = soldier.team;
    let position = soldier.position;

    let state = world.match_state.flag(team).state;
    if let FlagState::Dropped { position: flag_pos } = state {
        if position.distance(&flag_pos) <= radius {
            world.match_state.flag_mut(team).state = FlagState::InBase;
            world.events.push(SimulationEvent::FlagReturned {
                tick: world.tick,
                flag_owner: team,
            });
            tracing::debug!(team = %team, "flag returned");
            world.broadcast_from_context(Message::FlagReturned { flag_owner: team });
        }
    }
}

/// Touching the enemy flag (at its stand or dropped) picks it up
fn resolve_flag_pickup(world: &mut World, id: EntityId, radius: f32) {
    let Some(soldier) = world.soldier(id) else {
        return;
    };
    if soldier.carrying_flag.is_some() {
        return;
    }
    let team = soldier.team;
    let position = soldier.position;
    let enemy = team.opponent();

    let flag = world.match_state.flag(enemy);
    let reachable = match flag.state {
        FlagState::InBase => position.distance(&flag.base_position) <= radius,
        FlagState::Dropped { position: flag_pos } => position.distance(&flag_pos) <= radius,
        FlagState::Stolen { .. } => false,
    };
    if !reachable {
        return;
    }

    world.match_state.flag_mut(enemy).state = FlagState::Stolen { carrier: id };
    if let Some(soldier) = world.soldier_mut(id) {
        soldier.carrying_flag = Some(enemy);
    }
    world.events.push(SimulationEvent::FlagTaken {
        tick: world.tick,
        flag_owner: enemy,
        carrier: id,
    });
    tracing::debug!(flag = %enemy, carrier = %id.0, "flag picked up");
    world.broadcast_from_context(Message::FlagPickedUp {
        flag_owner: enemy,
        carrier: id,
    });
}

/// Carrying the enemy flag to the own stand scores while the own flag is
/// home; the captured flag resets to its base
fn resolve_capture(world: &mut World, id: EntityId, radius: f32) {
    let Some(soldier) = world.soldier(id) else {
        return;
    };
    let team = soldier.team;
    let position = soldier.position;
    let Some(carried) = soldier.carrying_flag else {
        return;
    };

    let own_flag = world.match_state.flag(team);
    if own_flag.state != FlagState::InBase {
        return;
    }
    if position.distance(&own_flag.base_position) > radius {
        return;
    }

    if let Some(soldier) = world.soldier_mut(id) {
        soldier.carrying_flag = None;
    }
    world.match_state.flag_mut(carried).state = FlagState::InBase;
    let score = world.match_state.add_score(team);

    world.events.push(SimulationEvent::FlagCaptured {
        tick: world.tick,
        scoring_team: team,
        score,
    });
    tracing::info!(team = %team, score, "flag captured");
    world.broadcast_from_context(Message::ScoreUpdate { team, score });
    world.broadcast_from_context(Message::FlagReturned { flag_owner: carried });
}

/// Where a flag physically is right now
pub fn flag_position(world: &World, owner: Team) -> GridPos {
    let flag = world.match_state.flag(owner);
    match flag.state {
        FlagState::InBase => flag.base_position,
        FlagState::Dropped { position } => position,
        FlagState::Stolen { carrier } => world
            .soldier(carrier)
            .map(|s| s.position)
            .unwrap_or(flag.base_position),
    }
}

/// Dead soldiers wait out their timer, then rejoin at a base spawn point
pub fn process_respawns(world: &mut World, dt: f32) {
    let ids: Vec<EntityId> = world
        .soldiers
        .iter()
        .filter(|s| !s.alive)
        .map(|s| s.id)
        .collect();

    for (index, id) in ids.into_iter().enumerate() {
        let max_health = world.config.max_health;
        let Some(soldier) = world.soldier_mut(id) else {
            continue;
        };
        soldier.respawn_timer -= dt;
        if soldier.respawn_timer > 0.0 {
            continue;
        }

        let team = soldier.team;
        let spawns = world.arena.spawn_points(team);
        let spawn = spawns[index % spawns.len()];

        if let Some(soldier) = world.soldier_mut(id) {
            soldier.respawn(spawn, max_health);
        }
        let tick = world.tick;
        world.events.push(SimulationEvent::SoldierRespawned {
            tick,
            team,
            entity: id,
            position: spawn,
        });
        world.broadcast_from_context(Message::EntityRespawned {
            entity: id,
            position: spawn,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_status_carrier() {
        let mut flag = FlagStatus::at_base(Team::Red, GridPos::new(2, 8));
        assert_eq!(flag.carrier(), None);

        let carrier = EntityId::new();
        flag.state = FlagState::Stolen { carrier };
        assert_eq!(flag.carrier(), Some(carrier));
    }

    #[test]
    fn test_match_state_scores_independently() {
        let mut state = MatchState::new(GridPos::new(2, 8), GridPos::new(29, 8), 180.0);
        assert_eq!(state.add_score(Team::Red), 1);
        assert_eq!(state.add_score(Team::Red), 2);
        assert_eq!(state.add_score(Team::Blue), 1);
        assert_eq!(state.score(Team::Red), 2);
        assert_eq!(state.score(Team::Blue), 1);
    }
}
