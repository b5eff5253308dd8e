//! Orders - single-entity commands issued by the team layer
//!
//! An order is addressed to exactly one soldier and tracked to completion
//! through UpdateOrderState messages. Each manoeuvre holds at most one
//! active order per participant.

use serde::{Deserialize, Serialize};

use crate::arena::grid::GridPos;
use crate::core::types::EntityId;

/// Unique, monotonically increasing order identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

/// Hands out order ids; owned by the team layer so ids stay unique
/// within a team for the lifetime of a match
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderIdAllocator {
    next: u64,
}

impl OrderIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> OrderId {
        let id = OrderId(self.next);
        self.next += 1;
        id
    }
}

/// What the soldier is being told to do
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Hunt down a specific enemy
    AttackEnemy {
        target: EntityId,
        last_known_position: GridPos,
    },
    /// Travel to a position
    MoveToPosition { destination: GridPos },
    /// Hold and guard a position
    DefendPosition { position: GridPos },
}

/// How insistent the issuing manoeuvre is
///
/// A soldier already executing an order only accepts a replacement of
/// strictly higher priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OrderPriority {
    Low,
    Medium,
    High,
}

/// Progress of an order as reported back by the executing soldier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    Pending,
    Succeeded,
    Failed,
}

/// A command addressed to one soldier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub entity: EntityId,
    pub kind: OrderKind,
    pub priority: OrderPriority,
    pub state: OrderState,
}

impl Order {
    pub fn new(id: OrderId, entity: EntityId, kind: OrderKind, priority: OrderPriority) -> Self {
        Self {
            id,
            entity,
            kind,
            priority,
            state: OrderState::Pending,
        }
    }

    /// Convenience: move order
    pub fn move_to(
        id: OrderId,
        entity: EntityId,
        destination: GridPos,
        priority: OrderPriority,
    ) -> Self {
        Self::new(id, entity, OrderKind::MoveToPosition { destination }, priority)
    }

    /// Convenience: attack order
    pub fn attack(
        id: OrderId,
        entity: EntityId,
        target: EntityId,
        last_known_position: GridPos,
        priority: OrderPriority,
    ) -> Self {
        Self::new(
            id,
            entity,
            OrderKind::AttackEnemy {
                target,
                last_known_position,
            },
            priority,
        )
    }

    /// Convenience: defend order
    pub fn defend(
        id: OrderId,
        entity: EntityId,
        position: GridPos,
        priority: OrderPriority,
    ) -> Self {
        Self::new(id, entity, OrderKind::DefendPosition { position }, priority)
    }

    /// The position this order steers the soldier towards
    pub fn target_position(&self) -> GridPos {
        match self.kind {
            OrderKind::AttackEnemy {
                last_known_position,
                ..
            } => last_known_position,
            OrderKind::MoveToPosition { destination } => destination,
            OrderKind::DefendPosition { position } => position,
        }
    }
}
