//! Square-grid coordinate system for the test environment

use serde::{Deserialize, Serialize};

/// Cell coordinate on the arena grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in cells
    pub fn distance(&self, other: &Self) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Chebyshev distance - the number of 8-way steps between two cells
    pub fn steps(&self, other: &Self) -> u32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs()) as u32
    }

    /// All 8 neighbouring cells
    pub fn neighbours(&self) -> [GridPos; 8] {
        [
            GridPos::new(self.x + 1, self.y),
            GridPos::new(self.x + 1, self.y + 1),
            GridPos::new(self.x, self.y + 1),
            GridPos::new(self.x - 1, self.y + 1),
            GridPos::new(self.x - 1, self.y),
            GridPos::new(self.x - 1, self.y - 1),
            GridPos::new(self.x, self.y - 1),
            GridPos::new(self.x + 1, self.y - 1),
        ]
    }

    /// Cells in a straight line from self to other (inclusive)
    pub fn line_to(&self, other: &Self) -> Vec<GridPos> {
        let n = self.steps(other) as i32;
        if n == 0 {
            return vec![*self];
        }

        let mut results = Vec::with_capacity((n + 1) as usize);
        for i in 0..=n {
            let t = i as f32 / n as f32;
            let x = self.x as f32 + (other.x - self.x) as f32 * t;
            let y = self.y as f32 + (other.y - self.y) as f32 * t;
            results.push(GridPos::new(x.round() as i32, y.round() as i32));
        }
        results
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
