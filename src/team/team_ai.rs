//! The team AI decision loop
//!
//! Per-frame sequence, driven by the team behaviour tree: drain the
//! inbox into knowledge and the active manoeuvres, advance those
//! manoeuvres, then (re)fill each category with the manoeuvre the
//! current situation calls for. Selection is deliberately deterministic:
//! the same beliefs and the same pool always produce the same tactic.

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use crate::arena::grid::GridPos;
use crate::arena::map::Arena;
use crate::bt::status::Status;
use crate::comms::hub::ActorId;
use crate::comms::order::OrderIdAllocator;
use crate::core::config::SimulationConfig;
use crate::core::types::{EntityId, Team};
use crate::simulation::events::{ManoeuvreOutcome, SimulationEvent};
use crate::simulation::world::World;
use crate::team::knowledge::TeamKnowledge;
use crate::team::manoeuvre::{ManoeuvreCategory, ManoeuvreKind, ManoeuvreRoster};
use crate::team::manoeuvres::standard_roster;

/// One team's AI-side state: beliefs, manoeuvre instances and the
/// participant bookkeeping tying soldiers to tactics
pub struct TeamState {
    pub team: Team,
    pub knowledge: TeamKnowledge,
    pub order_ids: OrderIdAllocator,
    pub roster: ManoeuvreRoster,
    /// Which manoeuvre each assigned soldier belongs to
    pub assignments: AHashMap<EntityId, ManoeuvreKind>,
    /// The single active manoeuvre per category
    pub active_by_category: AHashMap<ManoeuvreCategory, ManoeuvreKind>,
}

impl TeamState {
    pub fn new(team: Team, arena: &Arena, config: &SimulationConfig) -> Self {
        Self {
            team,
            knowledge: TeamKnowledge::new(
                team,
                arena.flag_stand(team),
                arena.flag_stand(team.opponent()),
                config.match_duration,
            ),
            order_ids: OrderIdAllocator::new(),
            roster: standard_roster(),
            assignments: AHashMap::new(),
            active_by_category: AHashMap::new(),
        }
    }

    /// Active manoeuvres in fixed category order, so per-frame handling
    /// is independent of map internals
    pub fn active_kinds(&self) -> Vec<ManoeuvreKind> {
        [
            ManoeuvreCategory::ProtectOwnFlag,
            ManoeuvreCategory::AttackEnemyFlag,
            ManoeuvreCategory::Uncategorised,
        ]
        .iter()
        .filter_map(|category| self.active_by_category.get(category))
        .copied()
        .collect()
    }

    pub fn occupant(&self, category: ManoeuvreCategory) -> Option<ManoeuvreKind> {
        self.active_by_category.get(&category).copied()
    }
}

/// Drain the team inbox: fold everything into knowledge, then forward to
/// each active manoeuvre for its own reaction
pub fn process_inbox(world: &mut World, team: Team) {
    world.hub.sort_out_processed(ActorId::TeamAi(team));
    let messages = world.hub.drain_inbox(ActorId::TeamAi(team));
    if messages.is_empty() {
        return;
    }

    {
        let state = world.team_state_mut(team);
        for message in &messages {
            state.knowledge.apply(message);
        }
    }

    for kind in world.team_state(team).active_kinds() {
        world.with_manoeuvre(team, kind, |manoeuvre, ctx| {
            for message in &messages {
                manoeuvre.process_message(ctx, message);
            }
        });
        reconcile_assignments(world, team, kind);
    }
}

/// Advance every active manoeuvre one frame and retire the finished or
/// no-longer-sensible ones
pub fn update_active_manoeuvres(world: &mut World, team: Team, dt: f32) {
    for kind in world.team_state(team).active_kinds() {
        let status = world
            .with_manoeuvre(team, kind, |manoeuvre, ctx| manoeuvre.update(ctx, dt))
            .unwrap_or(Status::Failure);
        reconcile_assignments(world, team, kind);

        match status {
            Status::Success => end_manoeuvre(world, team, kind, ManoeuvreOutcome::Succeeded),
            Status::Failure | Status::Invalid => {
                end_manoeuvre(world, team, kind, ManoeuvreOutcome::Failed)
            }
            Status::Running => {
                if !still_valid(world, team, kind) {
                    end_manoeuvre(world, team, kind, ManoeuvreOutcome::Invalidated);
                }
            }
        }
    }
}

/// Keep the category stocked with the manoeuvre the situation calls for
///
/// Success means the category has a suitable occupant (kept or freshly
/// initiated); Failure means nothing can run there right now.
pub fn ensure_category(world: &mut World, team: Team, category: ManoeuvreCategory) -> Status {
    let desired = desired_manoeuvre(world, team, category)
        .filter(|kind| preconditions_fulfilled(world, team, *kind));
    let occupant = world.team_state(team).occupant(category);

    match (desired, occupant) {
        (Some(desired), Some(occupant)) if desired == occupant => Status::Success,
        (Some(desired), occupant) => {
            if let Some(previous) = occupant {
                end_manoeuvre(world, team, previous, ManoeuvreOutcome::Preempted);
            }
            initiate_manoeuvre(world, team, desired)
        }
        (None, _) => Status::Failure,
    }
}

/// Cheap per-frame check that the manoeuvre's reason to exist still holds
pub fn still_valid(world: &World, team: Team, kind: ManoeuvreKind) -> bool {
    let knowledge = &world.team_state(team).knowledge;
    match kind {
        ManoeuvreKind::RunTheFlagHome => knowledge.enemy_flag.is_stolen(),
        ManoeuvreKind::PickUpDroppedFlag => knowledge.enemy_flag.is_dropped(),
        ManoeuvreKind::RushBaseAttack
        | ManoeuvreKind::CoordinatedBaseAttack
        | ManoeuvreKind::DistractionBaseAttack
        | ManoeuvreKind::SimpleBaseAttack
        | ManoeuvreKind::GuardedFlagCapture => knowledge.enemy_flag.is_in_base(),
        ManoeuvreKind::InterceptFlagCarrier => knowledge.own_flag.is_stolen(),
        ManoeuvreKind::ReturnDroppedFlag => knowledge.own_flag.is_dropped(),
        ManoeuvreKind::DefendBaseEntrances
        | ManoeuvreKind::SimpleBaseDefence
        | ManoeuvreKind::ActiveBaseDefence => knowledge.own_flag.is_in_base(),
        ManoeuvreKind::TestManoeuvre => true,
    }
}

/// Pure predicate: may this manoeuvre be initiated right now?
pub fn preconditions_fulfilled(world: &World, team: Team, kind: ManoeuvreKind) -> bool {
    if !still_valid(world, team, kind) {
        return false;
    }
    let minimum = world
        .team_state(team)
        .roster
        .get(kind)
        .map(|m| m.min_participants())
        .unwrap_or(usize::MAX);

    match kind {
        ManoeuvreKind::RunTheFlagHome => bound_carrier(world, team).is_some(),
        _ => available_for(world, team, kind.category()).len() >= minimum,
    }
}

/// The tactic this category should be running, given current beliefs
///
/// Priority is fixed within each category; the situational manoeuvres
/// (carrier chases, dropped-flag races) outrank the standing ones.
pub fn desired_manoeuvre(
    world: &World,
    team: Team,
    category: ManoeuvreCategory,
) -> Option<ManoeuvreKind> {
    let knowledge = &world.team_state(team).knowledge;
    let available = available_for(world, team, category).len();

    match category {
        ManoeuvreCategory::ProtectOwnFlag => {
            if knowledge.own_flag.is_stolen() && available >= 1 {
                return Some(ManoeuvreKind::InterceptFlagCarrier);
            }
            if knowledge.own_flag.is_dropped() && available >= 1 {
                return Some(ManoeuvreKind::ReturnDroppedFlag);
            }
            if knowledge.own_flag.is_in_base() {
                let intruder = knowledge
                    .enemy_near(
                        world.arena.flag_stand(team),
                        world.config.base_alert_radius,
                    )
                    .is_some();
                if intruder && available >= 1 {
                    return Some(ManoeuvreKind::ActiveBaseDefence);
                }
                if available >= 2 {
                    return Some(ManoeuvreKind::DefendBaseEntrances);
                }
                if available >= 1 {
                    return Some(ManoeuvreKind::SimpleBaseDefence);
                }
            }
            None
        }
        ManoeuvreCategory::AttackEnemyFlag => {
            if knowledge.enemy_flag.is_stolen() {
                return bound_carrier(world, team).map(|_| ManoeuvreKind::RunTheFlagHome);
            }
            if knowledge.enemy_flag.is_dropped() && available >= 1 {
                return Some(ManoeuvreKind::PickUpDroppedFlag);
            }
            if knowledge.enemy_flag.is_in_base() {
                // with the own flag away, capture cautiously
                if !knowledge.own_flag.is_in_base() && available >= 2 {
                    return Some(ManoeuvreKind::GuardedFlagCapture);
                }
                if available >= 4 {
                    return Some(ManoeuvreKind::CoordinatedBaseAttack);
                }
                if available >= 3 {
                    return Some(ManoeuvreKind::DistractionBaseAttack);
                }
                if available >= 2 {
                    return Some(ManoeuvreKind::RushBaseAttack);
                }
                if available >= 1 {
                    return Some(ManoeuvreKind::SimpleBaseAttack);
                }
            }
            None
        }
        ManoeuvreCategory::Uncategorised => None,
    }
}

/// Assign participants and run the manoeuvre's own initiation
pub fn initiate_manoeuvre(world: &mut World, team: Team, kind: ManoeuvreKind) -> Status {
    let Some((minimum, maximum)) = world
        .team_state(team)
        .roster
        .get(kind)
        .map(|m| (m.min_participants(), m.max_participants()))
    else {
        return Status::Failure;
    };

    let participants = select_participants(world, team, kind, maximum);
    if participants.len() < minimum {
        return Status::Failure;
    }

    // pull any cross-assigned soldier out of its previous manoeuvre
    for entity in &participants {
        let previous = world.team_state(team).assignments.get(entity).copied();
        if let Some(previous) = previous.filter(|p| *p != kind) {
            let entity = *entity;
            world.with_manoeuvre(team, previous, |manoeuvre, ctx| {
                manoeuvre.core_mut().release_participant(ctx, entity);
            });
            reconcile_assignments(world, team, previous);
        }
    }

    let status = world
        .with_manoeuvre(team, kind, |manoeuvre, ctx| {
            manoeuvre.reset();
            for entity in &participants {
                manoeuvre.core_mut().add_participant(*entity);
            }
            manoeuvre.core_mut().set_active(true);
            let status = manoeuvre.initiate(ctx);
            if matches!(status, Status::Failure | Status::Invalid) {
                manoeuvre.terminate(ctx);
            }
            status
        })
        .unwrap_or(Status::Failure);

    if matches!(status, Status::Running | Status::Success) {
        let tick = world.tick;
        let state = world.team_state_mut(team);
        state.active_by_category.insert(kind.category(), kind);
        for entity in &participants {
            state.assignments.insert(*entity, kind);
        }
        world.events.push(SimulationEvent::ManoeuvreStarted {
            tick,
            team,
            kind,
            participants: participants.len(),
        });
        tracing::info!(team = %team, %kind, participants = participants.len(), "manoeuvre initiated");
    }
    status
}

/// Terminate, clear bookkeeping, log the outcome
pub fn end_manoeuvre(
    world: &mut World,
    team: Team,
    kind: ManoeuvreKind,
    outcome: ManoeuvreOutcome,
) {
    world.with_manoeuvre(team, kind, |manoeuvre, ctx| {
        manoeuvre.terminate(ctx);
        manoeuvre.reset();
    });

    let tick = world.tick;
    let state = world.team_state_mut(team);
    if state.occupant(kind.category()) == Some(kind) {
        state.active_by_category.remove(&kind.category());
    }
    state.assignments.retain(|_, k| *k != kind);

    world.events.push(SimulationEvent::ManoeuvreEnded {
        tick,
        team,
        kind,
        outcome,
    });
    tracing::info!(team = %team, %kind, ?outcome, "manoeuvre ended");
}

/// Soldiers this category could draw on: alive and either unassigned or
/// already serving this category's occupant (who would be preempted)
fn available_for(world: &World, team: Team, category: ManoeuvreCategory) -> Vec<EntityId> {
    let state = world.team_state(team);
    world
        .soldiers
        .iter()
        .filter(|s| s.team == team && s.alive)
        .map(|s| s.id)
        .filter(|id| {
            state
                .assignments
                .get(id)
                .map_or(true, |kind| kind.category() == category)
        })
        .collect()
}

/// The enemy-flag carrier, if it is one of ours and alive
fn bound_carrier(world: &World, team: Team) -> Option<EntityId> {
    let carrier = world.team_state(team).knowledge.enemy_flag.carrier()?;
    let soldier = world.soldier(carrier)?;
    (soldier.team == team && soldier.alive).then_some(carrier)
}

/// Participant selection per manoeuvre; order within the result is the
/// assignment order the manoeuvre will see
fn select_participants(
    world: &World,
    team: Team,
    kind: ManoeuvreKind,
    maximum: usize,
) -> Vec<EntityId> {
    let knowledge = &world.team_state(team).knowledge;
    match kind {
        // binds exactly the carrier, bypassing the pool
        ManoeuvreKind::RunTheFlagHome => bound_carrier(world, team).into_iter().collect(),
        ManoeuvreKind::PickUpDroppedFlag => {
            closest_available(world, team, kind, knowledge.enemy_flag.position, maximum)
        }
        ManoeuvreKind::ReturnDroppedFlag => {
            closest_available(world, team, kind, knowledge.own_flag.position, maximum)
        }
        ManoeuvreKind::InterceptFlagCarrier => {
            let target = knowledge
                .own_flag
                .carrier()
                .and_then(|c| knowledge.enemies.get(&c))
                .map(|record| record.last_position)
                .unwrap_or(knowledge.own_flag.base_position);
            closest_available(world, team, kind, target, maximum)
        }
        _ => available_for(world, team, kind.category())
            .into_iter()
            .take(maximum)
            .collect(),
    }
}

/// Candidates sorted by ascending distance to the target position; ties
/// keep pool order, so selection is deterministic for fixed positions
fn closest_available(
    world: &World,
    team: Team,
    kind: ManoeuvreKind,
    target: GridPos,
    maximum: usize,
) -> Vec<EntityId> {
    let mut candidates: Vec<(OrderedFloat<f32>, EntityId)> =
        available_for(world, team, kind.category())
            .into_iter()
            .filter_map(|id| {
                world
                    .soldier(id)
                    .map(|s| (OrderedFloat(s.position.distance(&target)), id))
            })
            .collect();
    candidates.sort_by_key(|(distance, _)| *distance);
    candidates
        .into_iter()
        .take(maximum)
        .map(|(_, id)| id)
        .collect()
}

/// Sync the assignment map with what the manoeuvre actually retained
fn reconcile_assignments(world: &mut World, team: Team, kind: ManoeuvreKind) {
    let participants: Vec<EntityId> = world
        .team_state(team)
        .roster
        .get(kind)
        .map(|m| m.core().participants().to_vec())
        .unwrap_or_default();
    let state = world.team_state_mut(team);
    state
        .assignments
        .retain(|entity, k| *k != kind || participants.contains(entity));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comms::message::Message;
    use crate::core::config::SimulationConfig;

    fn world() -> World {
        World::new(SimulationConfig::default(), 5)
    }

    #[test]
    fn test_default_defence_is_entrance_guard() {
        let world = world();
        assert_eq!(
            desired_manoeuvre(&world, Team::Red, ManoeuvreCategory::ProtectOwnFlag),
            Some(ManoeuvreKind::DefendBaseEntrances)
        );
    }

    #[test]
    fn test_full_pool_prefers_coordinated_attack() {
        let world = world();
        assert_eq!(
            desired_manoeuvre(&world, Team::Red, ManoeuvreCategory::AttackEnemyFlag),
            Some(ManoeuvreKind::CoordinatedBaseAttack)
        );
    }

    #[test]
    fn test_stolen_own_flag_demands_interception() {
        let mut world = world();
        let carrier = world
            .soldiers
            .iter()
            .find(|s| s.team == Team::Blue)
            .map(|s| s.id)
            .expect("blue soldier");
        world
            .team_state_mut(Team::Red)
            .knowledge
            .apply(&Message::FlagPickedUp {
                flag_owner: Team::Red,
                carrier,
            });

        assert_eq!(
            desired_manoeuvre(&world, Team::Red, ManoeuvreCategory::ProtectOwnFlag),
            Some(ManoeuvreKind::InterceptFlagCarrier)
        );
    }

    #[test]
    fn test_our_carrier_triggers_run_home() {
        let mut world = world();
        let carrier = world
            .soldiers
            .iter()
            .find(|s| s.team == Team::Red)
            .map(|s| s.id)
            .expect("red soldier");
        world
            .team_state_mut(Team::Red)
            .knowledge
            .apply(&Message::FlagPickedUp {
                flag_owner: Team::Blue,
                carrier,
            });

        assert_eq!(
            desired_manoeuvre(&world, Team::Red, ManoeuvreCategory::AttackEnemyFlag),
            Some(ManoeuvreKind::RunTheFlagHome)
        );
    }

    #[test]
    fn test_initiation_records_assignments_and_occupancy() {
        let mut world = world();
        let status = initiate_manoeuvre(&mut world, Team::Red, ManoeuvreKind::DefendBaseEntrances);

        assert_eq!(status, Status::Running);
        let state = world.team_state(Team::Red);
        assert_eq!(
            state.occupant(ManoeuvreCategory::ProtectOwnFlag),
            Some(ManoeuvreKind::DefendBaseEntrances)
        );
        assert_eq!(state.assignments.len(), 2);
    }

    #[test]
    fn test_category_preemption_frees_participants() {
        let mut world = world();
        initiate_manoeuvre(&mut world, Team::Red, ManoeuvreKind::DefendBaseEntrances);

        // a dropped own flag outranks the standing defence
        world
            .team_state_mut(Team::Red)
            .knowledge
            .apply(&Message::FlagDropped {
                flag_owner: Team::Red,
                position: crate::arena::grid::GridPos::new(12, 7),
            });

        let status = ensure_category(&mut world, Team::Red, ManoeuvreCategory::ProtectOwnFlag);
        assert_eq!(status, Status::Running);
        let state = world.team_state(Team::Red);
        assert_eq!(
            state.occupant(ManoeuvreCategory::ProtectOwnFlag),
            Some(ManoeuvreKind::ReturnDroppedFlag)
        );
        assert!(state
            .assignments
            .values()
            .all(|k| *k == ManoeuvreKind::ReturnDroppedFlag));
    }

    #[test]
    fn test_distance_selection_is_deterministic() {
        let mut world = world();
        // park red soldiers at staggered distances from a drop point
        let drop = GridPos::new(20, 8);
        let ids: Vec<EntityId> = world
            .soldiers
            .iter()
            .filter(|s| s.team == Team::Red)
            .map(|s| s.id)
            .collect();
        for (i, id) in ids.iter().enumerate() {
            world.soldier_mut(*id).expect("exists").position = GridPos::new(4 + 4 * i as i32, 8);
        }
        world
            .team_state_mut(Team::Red)
            .knowledge
            .apply(&Message::FlagDropped {
                flag_owner: Team::Blue,
                position: drop,
            });

        let selected = select_participants(&mut world, Team::Red, ManoeuvreKind::PickUpDroppedFlag, 2);
        // the two soldiers parked closest to the drop, nearest first
        assert_eq!(selected, vec![ids[3], ids[2]]);
    }
}
