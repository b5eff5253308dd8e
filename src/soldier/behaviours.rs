//! Leaf behaviours of the individual soldier tree
//!
//! Every leaf operates on the world's active soldier. Conditions read
//! memory the perception pass refreshed this frame; actions steer the
//! soldier and report order progress back to the team AI as messages.

use crate::arena::grid::GridPos;
use crate::bt::behaviour::Behaviour;
use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{OrderId, OrderKind, OrderState};
use crate::core::types::{EntityId, Team};
use crate::simulation::world::World;
use crate::soldier::state::PathProgress;

/// Result of advancing the active soldier towards a destination
pub(crate) enum MoveOutcome {
    Arrived,
    Moving,
    Unreachable,
}

/// Walk the active soldier one frame along a calculated path, repathing
/// when the destination changed since the last frame
pub(crate) fn advance_towards(world: &mut World, destination: GridPos, dt: f32) -> MoveOutcome {
    let Some(id) = world.active_entity else {
        return MoveOutcome::Unreachable;
    };
    let Some(index) = world.soldiers.iter().position(|s| s.id == id) else {
        return MoveOutcome::Unreachable;
    };

    let World {
        ref mut soldiers,
        ref arena,
        ref config,
        ..
    } = *world;
    let soldier = &mut soldiers[index];

    let needs_path = soldier
        .path
        .as_ref()
        .map_or(true, |p| p.destination != destination);
    if needs_path {
        match arena.calculate_path(soldier.position, destination) {
            Some(cells) => {
                // the first cell is the current position
                let cells: Vec<GridPos> = cells.into_iter().skip(1).collect();
                soldier.path = Some(PathProgress::new(destination, cells));
            }
            None => {
                soldier.path = None;
                return MoveOutcome::Unreachable;
            }
        }
    }

    if let Some(path) = soldier.path.as_mut() {
        soldier.position = path.advance(config.move_speed, dt, soldier.position);
        if path.arrived(soldier.position) {
            soldier.path = None;
            return MoveOutcome::Arrived;
        }
    }
    MoveOutcome::Moving
}

/// Report an order's terminal state and clear the soldier's order slot
fn complete_order(world: &mut World, id: EntityId, team: Team, order_id: OrderId, state: OrderState) {
    world.report_to_team_ai(
        id,
        team,
        Message::UpdateOrderState {
            entity: id,
            order_id,
            state,
        },
    );
    if let Some(soldier) = world.soldier_mut(id) {
        soldier.current_order = None;
        soldier.path = None;
    }
}

/// Condition: the soldier is dead and waiting to respawn
pub struct IsDead;

impl Behaviour<World> for IsDead {
    fn name(&self) -> &str {
        "is_dead"
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Status {
        match world.active_soldier() {
            Some(soldier) if !soldier.alive => Status::Success,
            _ => Status::Failure,
        }
    }
}

/// Dead soldiers do nothing until the respawn pass revives them
pub struct WaitForRespawn;

impl Behaviour<World> for WaitForRespawn {
    fn name(&self) -> &str {
        "wait_for_respawn"
    }

    fn update(&mut self, _world: &mut World, _dt: f32) -> Status {
        Status::Running
    }
}

/// Condition: at least one enemy is in sight
pub struct HasVisibleThreat;

impl Behaviour<World> for HasVisibleThreat {
    fn name(&self) -> &str {
        "has_visible_threat"
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Status {
        match world.active_soldier() {
            Some(soldier) if !soldier.threats.is_empty() => Status::Success,
            _ => Status::Failure,
        }
    }
}

/// Pick the closest visible threat as the combat target
pub struct SelectGreatestThreat;

impl Behaviour<World> for SelectGreatestThreat {
    fn name(&self) -> &str {
        "select_greatest_threat"
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Status {
        let Some(soldier) = world.active_soldier_mut() else {
            return Status::Failure;
        };
        match soldier.greatest_threat().map(|t| t.enemy) {
            Some(enemy) => {
                soldier.combat_target = Some(enemy);
                Status::Success
            }
            None => {
                soldier.combat_target = None;
                Status::Failure
            }
        }
    }
}

/// Condition guarding the attack: the chosen target is still in sight
pub struct TargetVisible;

impl Behaviour<World> for TargetVisible {
    fn name(&self) -> &str {
        "target_visible"
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Status {
        let Some(soldier) = world.active_soldier() else {
            return Status::Failure;
        };
        match soldier.combat_target {
            Some(target) if soldier.threat(target).is_some() => Status::Success,
            _ => Status::Failure,
        }
    }
}

/// Close to firing range and line up the shot
///
/// Succeeds once the target is inside attack range with line of sight;
/// keeps walking towards it otherwise.
pub struct AimAtTarget;

impl Behaviour<World> for AimAtTarget {
    fn name(&self) -> &str {
        "aim_at_target"
    }

    fn update(&mut self, world: &mut World, dt: f32) -> Status {
        let Some(soldier) = world.active_soldier() else {
            return Status::Failure;
        };
        let Some(target_pos) = soldier
            .combat_target
            .and_then(|t| soldier.threat(t))
            .map(|t| t.position)
        else {
            return Status::Failure;
        };
        let position = soldier.position;

        let in_range = position.distance(&target_pos) <= world.config.attack_range;
        if in_range && world.arena.line_of_sight(position, target_pos) {
            return Status::Success;
        }

        match advance_towards(world, target_pos, dt) {
            MoveOutcome::Unreachable => Status::Failure,
            _ => Status::Running,
        }
    }
}

/// Fire at the combat target, respecting the weapon cooldown
///
/// Keeps running while the engagement holds; fails the moment the shot is
/// no longer viable so the surrounding monitor re-engages cleanly.
pub struct FireAtTarget;

impl Behaviour<World> for FireAtTarget {
    fn name(&self) -> &str {
        "fire_at_target"
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Status {
        let Some(soldier) = world.active_soldier() else {
            return Status::Failure;
        };
        let id = soldier.id;
        let position = soldier.position;
        let cooldown = soldier.fire_cooldown;
        let Some((target, target_pos)) = soldier
            .combat_target
            .and_then(|t| soldier.threat(t))
            .map(|t| (t.enemy, t.position))
        else {
            return Status::Failure;
        };

        if position.distance(&target_pos) > world.config.attack_range
            || !world.arena.line_of_sight(position, target_pos)
        {
            return Status::Failure;
        }

        if cooldown > 0.0 {
            return Status::Running;
        }

        let fire_interval = world.config.fire_interval;
        world.apply_shot(id, target);
        if let Some(soldier) = world.soldier_mut(id) {
            soldier.fire_cooldown = fire_interval;
        }
        Status::Running
    }
}

/// Condition: the team has handed this soldier an order
pub struct HasActiveOrder;

impl Behaviour<World> for HasActiveOrder {
    fn name(&self) -> &str {
        "has_active_order"
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Status {
        match world.active_soldier() {
            Some(soldier) if soldier.current_order.is_some() => Status::Success,
            _ => Status::Failure,
        }
    }
}

/// Execute the current team order to completion
///
/// Progress is reported through UpdateOrderState messages; the slot
/// clears itself on terminal states so the tree falls back to its own
/// devices until the next FollowOrder arrives.
pub struct ExecuteOrder;

impl Behaviour<World> for ExecuteOrder {
    fn name(&self) -> &str {
        "execute_order"
    }

    fn update(&mut self, world: &mut World, dt: f32) -> Status {
        let Some(id) = world.active_entity else {
            return Status::Failure;
        };
        let Some((team, active)) = world
            .soldier(id)
            .and_then(|s| s.current_order.map(|o| (s.team, o)))
        else {
            return Status::Failure;
        };
        let order = active.order;

        match order.kind {
            OrderKind::MoveToPosition { destination } => {
                match advance_towards(world, destination, dt) {
                    MoveOutcome::Arrived => {
                        complete_order(world, id, team, order.id, OrderState::Succeeded);
                        Status::Success
                    }
                    MoveOutcome::Moving => Status::Running,
                    MoveOutcome::Unreachable => {
                        complete_order(world, id, team, order.id, OrderState::Failed);
                        Status::Failure
                    }
                }
            }
            OrderKind::DefendPosition { position } => {
                match advance_towards(world, position, dt) {
                    MoveOutcome::Arrived | MoveOutcome::Moving
                        if world
                            .soldier(id)
                            .is_some_and(|s| s.position == position) =>
                    {
                        // in place: report once, then hold until cancelled
                        if !active.arrival_reported {
                            if let Some(slot) = world
                                .soldier_mut(id)
                                .and_then(|s| s.current_order.as_mut())
                            {
                                slot.arrival_reported = true;
                            }
                            world.report_to_team_ai(
                                id,
                                team,
                                Message::UpdateOrderState {
                                    entity: id,
                                    order_id: order.id,
                                    state: OrderState::Succeeded,
                                },
                            );
                        }
                        Status::Running
                    }
                    MoveOutcome::Unreachable => {
                        complete_order(world, id, team, order.id, OrderState::Failed);
                        Status::Failure
                    }
                    _ => Status::Running,
                }
            }
            OrderKind::AttackEnemy {
                target,
                last_known_position,
            } => {
                if !world.is_alive(target) {
                    complete_order(world, id, team, order.id, OrderState::Succeeded);
                    return Status::Success;
                }
                let sees_target = world
                    .soldier(id)
                    .is_some_and(|s| s.threat(target).is_some());
                if sees_target {
                    // the combat branch outranks this one and will engage
                    return Status::Running;
                }
                match advance_towards(world, last_known_position, dt) {
                    MoveOutcome::Moving => Status::Running,
                    // nobody home, and nobody seen on the way
                    MoveOutcome::Arrived | MoveOutcome::Unreachable => {
                        complete_order(world, id, team, order.id, OrderState::Failed);
                        Status::Failure
                    }
                }
            }
        }
    }
}

/// Choose somewhere to wander when nothing else demands attention
pub struct DeterminePatrolTarget;

impl Behaviour<World> for DeterminePatrolTarget {
    fn name(&self) -> &str {
        "determine_patrol_target"
    }

    fn update(&mut self, world: &mut World, _dt: f32) -> Status {
        let Some(id) = world.active_entity else {
            return Status::Failure;
        };
        let Some((position, existing)) = world.soldier(id).map(|s| (s.position, s.patrol_target))
        else {
            return Status::Failure;
        };

        if let Some(target) = existing {
            if position != target {
                return Status::Success;
            }
        }

        let radius = world.config.patrol_radius;
        let World {
            ref arena,
            ref mut rng,
            ..
        } = *world;
        match arena.random_unblocked_target_in_area(rng, position, radius) {
            Some(target) => {
                if let Some(soldier) = world.soldier_mut(id) {
                    soldier.patrol_target = Some(target);
                }
                Status::Success
            }
            None => Status::Failure,
        }
    }
}

/// Walk to the chosen patrol waypoint
pub struct MoveToPatrolTarget;

impl Behaviour<World> for MoveToPatrolTarget {
    fn name(&self) -> &str {
        "move_to_patrol_target"
    }

    fn update(&mut self, world: &mut World, dt: f32) -> Status {
        let Some(id) = world.active_entity else {
            return Status::Failure;
        };
        let Some(target) = world.soldier(id).and_then(|s| s.patrol_target) else {
            return Status::Failure;
        };

        match advance_towards(world, target, dt) {
            MoveOutcome::Arrived => {
                if let Some(soldier) = world.soldier_mut(id) {
                    soldier.patrol_target = None;
                }
                Status::Success
            }
            MoveOutcome::Moving => Status::Running,
            MoveOutcome::Unreachable => {
                if let Some(soldier) = world.soldier_mut(id) {
                    soldier.patrol_target = None;
                }
                Status::Failure
            }
        }
    }
}
