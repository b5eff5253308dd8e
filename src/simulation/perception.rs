//! Per-frame sighting pass
//!
//! Refreshes every living soldier's threat memory against range and line
//! of sight, and turns the differences into perception reports for the
//! team AI: a fresh sighting, a position update, or lost contact.

use crate::comms::message::Message;
use crate::core::types::{EntityId, Team};
use crate::simulation::world::World;
use crate::soldier::state::ThreatRecord;

pub fn update_perception(world: &mut World) {
    let snapshot: Vec<(EntityId, Team, crate::arena::grid::GridPos, bool)> = world
        .soldiers
        .iter()
        .map(|s| (s.id, s.team, s.position, s.alive))
        .collect();
    let view_range = world.config.view_range;

    for index in 0..world.soldiers.len() {
        let (me, my_team, my_pos, alive) = snapshot[index];
        if !alive {
            world.soldiers[index].threats.clear();
            world.soldiers[index].combat_target = None;
            continue;
        }

        let mut visible = Vec::new();
        for (id, team, pos, their_alive) in &snapshot {
            if *team == my_team || !*their_alive {
                continue;
            }
            if my_pos.distance(pos) <= view_range && world.arena.line_of_sight(my_pos, *pos) {
                visible.push(ThreatRecord {
                    enemy: *id,
                    position: *pos,
                });
            }
        }

        let mut reports = Vec::new();
        {
            let previous = &world.soldiers[index].threats;
            for threat in &visible {
                match previous.iter().find(|p| p.enemy == threat.enemy) {
                    None => reports.push(Message::EnemySpotted {
                        spotter: me,
                        enemy: threat.enemy,
                        position: threat.position,
                    }),
                    Some(known) if known.position != threat.position => {
                        reports.push(Message::UpdateEnemyPosition {
                            enemy: threat.enemy,
                            position: threat.position,
                        })
                    }
                    _ => {}
                }
            }
            for known in previous {
                if !visible.iter().any(|t| t.enemy == known.enemy) {
                    reports.push(Message::LostSightOfEnemy {
                        spotter: me,
                        enemy: known.enemy,
                    });
                }
            }
        }

        let soldier = &mut world.soldiers[index];
        soldier.threats = visible;
        if let Some(target) = soldier.combat_target {
            if soldier.threat(target).is_none() {
                soldier.combat_target = None;
            }
        }

        for report in reports {
            world.report_to_team_ai(me, my_team, report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::grid::GridPos;
    use crate::comms::hub::ActorId;
    use crate::core::config::SimulationConfig;

    fn world() -> World {
        World::new(SimulationConfig::default(), 3)
    }

    fn face_off(world: &mut World) -> (EntityId, EntityId) {
        let red = world
            .soldiers
            .iter()
            .find(|s| s.team == Team::Red)
            .map(|s| s.id)
            .expect("red soldier");
        let blue = world
            .soldiers
            .iter()
            .find(|s| s.team == Team::Blue)
            .map(|s| s.id)
            .expect("blue soldier");
        world.soldier_mut(red).expect("exists").position = GridPos::new(10, 4);
        world.soldier_mut(blue).expect("exists").position = GridPos::new(14, 4);
        (red, blue)
    }

    #[test]
    fn test_sighting_reported_once() {
        let mut world = world();
        let (red, blue) = face_off(&mut world);

        update_perception(&mut world);
        update_perception(&mut world);

        assert!(world
            .soldier(red)
            .expect("exists")
            .threat(blue)
            .is_some());
        let inbox = world.hub.drain_inbox(ActorId::TeamAi(Team::Red));
        let sightings = inbox
            .iter()
            .filter(
                |m| matches!(m, Message::EnemySpotted { enemy, .. } if *enemy == blue),
            )
            .count();
        assert_eq!(sightings, 1, "an unchanged sighting is not re-reported");
    }

    #[test]
    fn test_movement_reported_as_position_update() {
        let mut world = world();
        let (_, blue) = face_off(&mut world);

        update_perception(&mut world);
        world.soldier_mut(blue).expect("exists").position = GridPos::new(13, 4);
        update_perception(&mut world);

        let inbox = world.hub.drain_inbox(ActorId::TeamAi(Team::Red));
        assert!(inbox
            .iter()
            .any(|m| matches!(m, Message::UpdateEnemyPosition { enemy, .. } if *enemy == blue)));
    }

    #[test]
    fn test_lost_contact_reported() {
        let mut world = world();
        let (red, blue) = face_off(&mut world);

        update_perception(&mut world);
        // move the blue soldier out of view range
        world.soldier_mut(blue).expect("exists").position = GridPos::new(30, 14);
        update_perception(&mut world);

        assert!(world.soldier(red).expect("exists").threats.is_empty());
        let inbox = world.hub.drain_inbox(ActorId::TeamAi(Team::Red));
        assert!(inbox
            .iter()
            .any(|m| matches!(m, Message::LostSightOfEnemy { enemy, .. } if *enemy == blue)));
    }

    #[test]
    fn test_dead_soldiers_neither_see_nor_are_seen() {
        let mut world = world();
        let (red, blue) = face_off(&mut world);

        world.soldier_mut(blue).expect("exists").kill(5.0);
        update_perception(&mut world);

        assert!(world.soldier(red).expect("exists").threats.is_empty());
    }
}
