//! Factory for the team AI behaviour tree
//!
//! The tree sequences the decision loop: drain the inbox, advance the
//! running manoeuvres, then restock both categories in priority order.
//! The category branches are status-masked - a category with nothing
//! sensible to run must not abort the rest of the loop.

use crate::bt::behaviour::Node;
use crate::bt::builder::{action, sequence, with_status};
use crate::bt::status::Status;
use crate::simulation::world::World;
use crate::team::manoeuvre::ManoeuvreCategory;
use crate::team::team_ai;

pub fn build_team_tree() -> Node<World> {
    sequence(vec![
        action("process_team_messages", |world: &mut World, _dt| {
            let Some(team) = world.active_team else {
                return Status::Failure;
            };
            team_ai::process_inbox(world, team);
            Status::Success
        }),
        action("update_active_manoeuvres", |world: &mut World, dt| {
            let Some(team) = world.active_team else {
                return Status::Failure;
            };
            team_ai::update_active_manoeuvres(world, team, dt);
            Status::Success
        }),
        // defence gets first claim on the pool
        with_status(
            action("direct_defence", |world: &mut World, _dt| {
                let Some(team) = world.active_team else {
                    return Status::Failure;
                };
                team_ai::ensure_category(world, team, ManoeuvreCategory::ProtectOwnFlag)
            }),
            Status::Success,
        ),
        with_status(
            action("direct_attack", |world: &mut World, _dt| {
                let Some(team) = world.active_team else {
                    return Status::Failure;
                };
                team_ai::ensure_category(world, team, ManoeuvreCategory::AttackEnemyFlag)
            }),
            Status::Success,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SimulationConfig;
    use crate::core::types::Team;
    use crate::team::manoeuvre::ManoeuvreKind;

    #[test]
    fn test_one_tick_stocks_both_categories() {
        let mut world = World::new(SimulationConfig::default(), 11);
        let mut tree = build_team_tree();

        world.active_team = Some(Team::Red);
        let status = tree.tick(&mut world, 0.1);
        assert_eq!(status, Status::Success);

        let state = world.team_state(Team::Red);
        assert_eq!(
            state.occupant(ManoeuvreCategory::ProtectOwnFlag),
            Some(ManoeuvreKind::DefendBaseEntrances)
        );
        assert!(state.occupant(ManoeuvreCategory::AttackEnemyFlag).is_some());
    }

    #[test]
    fn test_tick_without_active_team_fails() {
        let mut world = World::new(SimulationConfig::default(), 11);
        let mut tree = build_team_tree();

        assert_eq!(tree.tick(&mut world, 0.1), Status::Failure);
    }
}
