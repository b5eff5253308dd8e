//! Arena layout and environment queries
//!
//! A rectangular field with two mirrored bases. The red base sits on the
//! western edge, the blue base on the eastern edge; a band of obstacle
//! cells runs through the middle so line of sight is not a given.

use ahash::AHashSet;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::arena::grid::GridPos;
use crate::core::types::Team;

/// Everything the squad AI needs to know about one team's base
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseLayout {
    pub team: Team,
    /// Where the team's flag rests when it is home
    pub flag_stand: GridPos,
    /// Respawn cells inside the base
    pub spawn_points: Vec<GridPos>,
    /// Defensive posts inside the base perimeter
    pub field_positions: Vec<GridPos>,
    /// Cells an attacker must pass to get inside
    pub entrances: Vec<GridPos>,
    /// Staging cells outside the base used to mount an attack on it
    pub attack_positions: Vec<GridPos>,
}

/// The playing field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    width: i32,
    height: i32,
    blocked: AHashSet<GridPos>,
    red_base: BaseLayout,
    blue_base: BaseLayout,
}

impl Arena {
    /// Build the standard mirrored arena
    ///
    /// Dimensions below 16x8 leave no room for the base layouts.
    pub fn standard(width: i32, height: i32) -> Self {
        assert!(width >= 16 && height >= 8, "arena too small for two bases");

        let mid_y = height / 2;

        let red_base = Self::base_layout(Team::Red, 2, mid_y, 1);
        let blue_base = Self::base_layout(Team::Blue, width - 3, mid_y, -1);

        // Obstacle band through the middle, with gaps every fourth row
        let mut blocked = AHashSet::new();
        let mid_x = width / 2;
        for y in 0..height {
            if y % 4 != 0 {
                blocked.insert(GridPos::new(mid_x, y));
            }
        }

        Self {
            width,
            height,
            blocked,
            red_base,
            blue_base,
        }
    }

    /// Build an arena from explicit layouts (scenario setups, tests)
    pub fn custom(
        width: i32,
        height: i32,
        blocked: Vec<GridPos>,
        red_base: BaseLayout,
        blue_base: BaseLayout,
    ) -> Self {
        Self {
            width,
            height,
            blocked: blocked.into_iter().collect(),
            red_base,
            blue_base,
        }
    }

    /// One base, `facing` +1 when the field lies to the east of it
    fn base_layout(team: Team, flag_x: i32, mid_y: i32, facing: i32) -> BaseLayout {
        let flag_stand = GridPos::new(flag_x, mid_y);
        BaseLayout {
            team,
            flag_stand,
            spawn_points: vec![
                GridPos::new(flag_x, mid_y - 2),
                GridPos::new(flag_x, mid_y + 2),
            ],
            field_positions: vec![
                GridPos::new(flag_x + facing, mid_y - 1),
                GridPos::new(flag_x + facing, mid_y + 1),
                GridPos::new(flag_x, mid_y - 1),
                GridPos::new(flag_x, mid_y + 1),
            ],
            entrances: vec![
                GridPos::new(flag_x + 2 * facing, mid_y - 2),
                GridPos::new(flag_x + 2 * facing, mid_y + 2),
            ],
            attack_positions: vec![
                GridPos::new(flag_x + 4 * facing, mid_y - 3),
                GridPos::new(flag_x + 4 * facing, mid_y + 3),
                GridPos::new(flag_x + 5 * facing, mid_y),
            ],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    pub fn is_blocked(&self, pos: GridPos) -> bool {
        !self.contains(pos) || self.blocked.contains(&pos)
    }

    pub fn base(&self, team: Team) -> &BaseLayout {
        match team {
            Team::Red => &self.red_base,
            Team::Blue => &self.blue_base,
        }
    }

    /// Defensive posts inside a team's base
    pub fn base_field_positions(&self, team: Team) -> &[GridPos] {
        &self.base(team).field_positions
    }

    /// Entrance cells of a team's base
    pub fn base_entrances(&self, team: Team) -> &[GridPos] {
        &self.base(team).entrances
    }

    /// Staging cells for mounting an attack on a team's base
    pub fn attack_positions(&self, team: Team) -> &[GridPos] {
        &self.base(team).attack_positions
    }

    pub fn flag_stand(&self, team: Team) -> GridPos {
        self.base(team).flag_stand
    }

    pub fn spawn_points(&self, team: Team) -> &[GridPos] {
        &self.base(team).spawn_points
    }

    /// A random walkable cell within `radius` of `centre`, if one exists
    pub fn random_unblocked_target_in_area<R: Rng>(
        &self,
        rng: &mut R,
        centre: GridPos,
        radius: f32,
    ) -> Option<GridPos> {
        let reach = radius.ceil() as i32;
        let mut candidates = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                let pos = GridPos::new(centre.x + dx, centre.y + dy);
                if centre.distance(&pos) <= radius && !self.is_blocked(pos) {
                    candidates.push(pos);
                }
            }
        }
        if candidates.is_empty() {
            None
        } else {
            Some(candidates[rng.gen_range(0..candidates.len())])
        }
    }

    /// Whether an unobstructed straight line connects two cells
    pub fn line_of_sight(&self, from: GridPos, to: GridPos) -> bool {
        from.line_to(&to)
            .iter()
            .all(|cell| !self.is_blocked(*cell) || *cell == from || *cell == to)
    }

    /// A walkable path from start to target (inclusive of both)
    ///
    /// Straight line when it is clear, breadth-first search otherwise.
    /// Returns None when the target is unreachable or blocked.
    pub fn calculate_path(&self, start: GridPos, target: GridPos) -> Option<Vec<GridPos>> {
        if self.is_blocked(target) || self.is_blocked(start) {
            return None;
        }
        if start == target {
            return Some(vec![start]);
        }

        let line = start.line_to(&target);
        if line.iter().all(|cell| !self.is_blocked(*cell)) {
            return Some(line);
        }

        // Fall back to a breadth-first search over walkable cells
        use std::collections::VecDeque;
        let mut queue = VecDeque::new();
        let mut came_from: ahash::AHashMap<GridPos, GridPos> = ahash::AHashMap::new();
        queue.push_back(start);
        came_from.insert(start, start);

        while let Some(current) = queue.pop_front() {
            if current == target {
                let mut path = vec![target];
                let mut cursor = target;
                while cursor != start {
                    cursor = came_from[&cursor];
                    path.push(cursor);
                }
                path.reverse();
                return Some(path);
            }
            for next in current.neighbours() {
                if !self.is_blocked(next) && !came_from.contains_key(&next) {
                    came_from.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}
