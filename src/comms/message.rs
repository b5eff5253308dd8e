//! Typed notifications exchanged between actors
//!
//! A closed sum type replaces the classic type-tag-plus-cast message
//! hierarchy: every variant carries its payload inline and dispatch is a
//! match, so an unhandled variant is a compiler warning instead of a
//! silent drop.

use serde::{Deserialize, Serialize};

use crate::arena::grid::GridPos;
use crate::comms::order::{Order, OrderId, OrderState};
use crate::core::types::{EntityId, Team};

/// One notification, tagged with its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Message {
    // --- perception reports (soldier -> team AI) ---
    /// A soldier gained sight of an enemy
    EnemySpotted {
        spotter: EntityId,
        enemy: EntityId,
        position: GridPos,
    },
    /// A soldier lost sight of an enemy it was tracking
    LostSightOfEnemy { spotter: EntityId, enemy: EntityId },
    /// Fresh position for an enemy already being tracked
    UpdateEnemyPosition { enemy: EntityId, position: GridPos },
    /// A soldier took fire
    AttackedByEnemy {
        victim: EntityId,
        attacker: EntityId,
        attacker_position: Option<GridPos>,
    },

    // --- lifecycle notifications (game context -> team AIs) ---
    EntityKilled { team: Team, entity: EntityId },
    EntityRespawned { entity: EntityId, position: GridPos },

    // --- flag notifications (game context -> team AIs) ---
    FlagPickedUp { flag_owner: Team, carrier: EntityId },
    FlagDropped { flag_owner: Team, position: GridPos },
    FlagReturned { flag_owner: Team },

    // --- match bookkeeping (game context -> team AIs) ---
    ScoreUpdate { team: Team, score: u32 },
    TimeUpdate { remaining: f32 },

    // --- order traffic (team layer <-> soldier) ---
    /// A manoeuvre or team AI hands a soldier an order
    FollowOrder { order: Order },
    /// The issuer withdraws an order before completion
    CancelOrder { order_id: OrderId },
    /// The executing soldier reports order progress
    UpdateOrderState {
        entity: EntityId,
        order_id: OrderId,
        state: OrderState,
    },
}

impl Message {
    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Message::EnemySpotted { .. } => "enemy_spotted",
            Message::LostSightOfEnemy { .. } => "lost_sight_of_enemy",
            Message::UpdateEnemyPosition { .. } => "update_enemy_position",
            Message::AttackedByEnemy { .. } => "attacked_by_enemy",
            Message::EntityKilled { .. } => "entity_killed",
            Message::EntityRespawned { .. } => "entity_respawned",
            Message::FlagPickedUp { .. } => "flag_picked_up",
            Message::FlagDropped { .. } => "flag_dropped",
            Message::FlagReturned { .. } => "flag_returned",
            Message::ScoreUpdate { .. } => "score_update",
            Message::TimeUpdate { .. } => "time_update",
            Message::FollowOrder { .. } => "follow_order",
            Message::CancelOrder { .. } => "cancel_order",
            Message::UpdateOrderState { .. } => "update_order_state",
        }
    }
}
