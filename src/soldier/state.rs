//! Per-soldier state and memory

use serde::{Deserialize, Serialize};

use crate::arena::grid::GridPos;
use crate::comms::order::Order;
use crate::core::types::{EntityId, Team};

/// A visible enemy as remembered by one soldier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreatRecord {
    pub enemy: EntityId,
    pub position: GridPos,
}

/// An order the soldier is currently executing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveOrder {
    pub order: Order,
    /// Defend orders report arrival exactly once, then keep holding
    pub arrival_reported: bool,
}

impl ActiveOrder {
    pub fn new(order: Order) -> Self {
        Self {
            order,
            arrival_reported: false,
        }
    }
}

/// Cell-by-cell progress along a calculated path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathProgress {
    pub destination: GridPos,
    cells: Vec<GridPos>,
    next: usize,
    fraction: f32,
}

impl PathProgress {
    pub fn new(destination: GridPos, cells: Vec<GridPos>) -> Self {
        Self {
            destination,
            cells,
            next: 0,
            fraction: 0.0,
        }
    }

    /// Advance by `speed * dt` cells, returning the new position
    pub fn advance(&mut self, speed: f32, dt: f32, current: GridPos) -> GridPos {
        self.fraction += speed * dt;
        let mut position = current;
        while self.fraction >= 1.0 && self.next < self.cells.len() {
            position = self.cells[self.next];
            self.next += 1;
            self.fraction -= 1.0;
        }
        position
    }

    pub fn arrived(&self, current: GridPos) -> bool {
        self.next >= self.cells.len() && current == self.destination
    }
}

/// One combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Soldier {
    pub id: EntityId,
    pub team: Team,
    pub position: GridPos,
    pub health: f32,
    pub alive: bool,
    /// Seconds until respawn while dead
    pub respawn_timer: f32,
    /// Which team's flag this soldier is carrying, if any
    pub carrying_flag: Option<Team>,

    // --- per-entity memory, owned and mutated only by this soldier ---
    /// Enemies currently in sight, refreshed by the perception pass
    pub threats: Vec<ThreatRecord>,
    /// The threat this soldier has singled out
    pub combat_target: Option<EntityId>,
    /// Team order in execution (at most one at a time)
    pub current_order: Option<ActiveOrder>,
    /// Where the soldier is heading on its own initiative (patrol)
    pub patrol_target: Option<GridPos>,
    /// In-progress movement along a calculated path
    pub path: Option<PathProgress>,
    /// Seconds until the weapon can fire again
    pub fire_cooldown: f32,
}

impl Soldier {
    pub fn new(team: Team, position: GridPos, health: f32) -> Self {
        Self {
            id: EntityId::new(),
            team,
            position,
            health,
            alive: true,
            respawn_timer: 0.0,
            carrying_flag: None,
            threats: Vec::new(),
            combat_target: None,
            current_order: None,
            patrol_target: None,
            path: None,
            fire_cooldown: 0.0,
        }
    }

    /// The closest visible threat, if any
    pub fn greatest_threat(&self) -> Option<&ThreatRecord> {
        self.threats.iter().min_by_key(|threat| {
            ordered_float::OrderedFloat(self.position.distance(&threat.position))
        })
    }

    pub fn threat(&self, enemy: EntityId) -> Option<&ThreatRecord> {
        self.threats.iter().find(|t| t.enemy == enemy)
    }

    /// Wipe transient state on death; the order slot empties so a later
    /// CancelOrder for it is a no-op
    pub fn kill(&mut self, respawn_delay: f32) {
        self.alive = false;
        self.health = 0.0;
        self.respawn_timer = respawn_delay;
        self.carrying_flag = None;
        self.threats.clear();
        self.combat_target = None;
        self.current_order = None;
        self.patrol_target = None;
        self.path = None;
    }

    pub fn respawn(&mut self, position: GridPos, health: f32) {
        self.alive = true;
        self.health = health;
        self.respawn_timer = 0.0;
        self.position = position;
        self.fire_cooldown = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greatest_threat_is_closest() {
        let mut soldier = Soldier::new(Team::Red, GridPos::new(0, 0), 100.0);
        let far = EntityId::new();
        let near = EntityId::new();
        soldier.threats.push(ThreatRecord {
            enemy: far,
            position: GridPos::new(9, 9),
        });
        soldier.threats.push(ThreatRecord {
            enemy: near,
            position: GridPos::new(1, 1),
        });

        assert_eq!(soldier.greatest_threat().unwrap().enemy, near);
    }

    #[test]
    fn test_kill_clears_memory_and_flag() {
        let mut soldier = Soldier::new(Team::Blue, GridPos::new(3, 3), 100.0);
        soldier.carrying_flag = Some(Team::Red);
        soldier.threats.push(ThreatRecord {
            enemy: EntityId::new(),
            position: GridPos::new(4, 4),
        });

        soldier.kill(5.0);

        assert!(!soldier.alive);
        assert!(soldier.carrying_flag.is_none());
        assert!(soldier.threats.is_empty());
        assert!(soldier.current_order.is_none());
    }

    #[test]
    fn test_path_progress_advances_cell_by_cell() {
        let cells = vec![GridPos::new(1, 0), GridPos::new(2, 0), GridPos::new(3, 0)];
        let mut path = PathProgress::new(GridPos::new(3, 0), cells);
        let mut position = GridPos::new(0, 0);

        // speed 1 cell/sec, dt 0.5: two frames per cell
        position = path.advance(1.0, 0.5, position);
        assert_eq!(position, GridPos::new(0, 0));
        position = path.advance(1.0, 0.5, position);
        assert_eq!(position, GridPos::new(1, 0));

        for _ in 0..4 {
            position = path.advance(1.0, 0.5, position);
        }
        assert_eq!(position, GridPos::new(3, 0));
        assert!(path.arrived(position));
    }
}
