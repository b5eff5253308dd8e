//! Manoeuvre state machines - the building blocks of team tactics
//!
//! A manoeuvre orchestrates a pool of participant soldiers towards one
//! named tactical goal by issuing orders and reacting to messages. Its
//! lifecycle is Inactive -> Active -> Succeeded/Failed -> (terminate) ->
//! Inactive, driven by the owning team AI once per frame. At most one
//! manoeuvre per category runs at a time per team.

use ahash::AHashMap;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::arena::map::Arena;
use crate::bt::status::Status;
use crate::comms::hub::{ActorId, MessageHub};
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderId, OrderIdAllocator, OrderState};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, Team};
use crate::soldier::state::Soldier;
use crate::team::knowledge::TeamKnowledge;

/// Every tactic the team AI can run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManoeuvreKind {
    DefendBaseEntrances,
    SimpleBaseDefence,
    ActiveBaseDefence,
    RushBaseAttack,
    CoordinatedBaseAttack,
    DistractionBaseAttack,
    SimpleBaseAttack,
    GuardedFlagCapture,
    PickUpDroppedFlag,
    RunTheFlagHome,
    InterceptFlagCarrier,
    ReturnDroppedFlag,
    TestManoeuvre,
}

impl ManoeuvreKind {
    /// Mutual-exclusion group: one active manoeuvre per category per team
    pub fn category(&self) -> ManoeuvreCategory {
        match self {
            ManoeuvreKind::DefendBaseEntrances
            | ManoeuvreKind::SimpleBaseDefence
            | ManoeuvreKind::ActiveBaseDefence
            | ManoeuvreKind::InterceptFlagCarrier
            | ManoeuvreKind::ReturnDroppedFlag => ManoeuvreCategory::ProtectOwnFlag,
            ManoeuvreKind::RushBaseAttack
            | ManoeuvreKind::CoordinatedBaseAttack
            | ManoeuvreKind::DistractionBaseAttack
            | ManoeuvreKind::SimpleBaseAttack
            | ManoeuvreKind::GuardedFlagCapture
            | ManoeuvreKind::PickUpDroppedFlag
            | ManoeuvreKind::RunTheFlagHome => ManoeuvreCategory::AttackEnemyFlag,
            ManoeuvreKind::TestManoeuvre => ManoeuvreCategory::Uncategorised,
        }
    }

    pub fn all() -> &'static [ManoeuvreKind] {
        &[
            ManoeuvreKind::DefendBaseEntrances,
            ManoeuvreKind::SimpleBaseDefence,
            ManoeuvreKind::ActiveBaseDefence,
            ManoeuvreKind::RushBaseAttack,
            ManoeuvreKind::CoordinatedBaseAttack,
            ManoeuvreKind::DistractionBaseAttack,
            ManoeuvreKind::SimpleBaseAttack,
            ManoeuvreKind::GuardedFlagCapture,
            ManoeuvreKind::PickUpDroppedFlag,
            ManoeuvreKind::RunTheFlagHome,
            ManoeuvreKind::InterceptFlagCarrier,
            ManoeuvreKind::ReturnDroppedFlag,
            ManoeuvreKind::TestManoeuvre,
        ]
    }
}

impl std::fmt::Display for ManoeuvreKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ManoeuvreCategory {
    ProtectOwnFlag,
    AttackEnemyFlag,
    Uncategorised,
}

/// Everything a manoeuvre may touch while it runs
///
/// Borrowed views over the simulation: beliefs are read-only, the hub and
/// the order allocator are writable. Soldier state is visible but never
/// mutated here - soldiers are steered exclusively through orders.
pub struct TeamCtx<'a> {
    pub team: Team,
    pub config: &'a SimulationConfig,
    pub arena: &'a Arena,
    pub knowledge: &'a TeamKnowledge,
    pub hub: &'a mut MessageHub,
    pub order_ids: &'a mut OrderIdAllocator,
    pub soldiers: &'a [Soldier],
    pub rng: &'a mut ChaCha8Rng,
}

impl<'a> TeamCtx<'a> {
    pub fn soldier(&self, id: EntityId) -> Option<&Soldier> {
        self.soldiers.iter().find(|s| s.id == id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.soldier(id).is_some_and(|s| s.alive)
    }

    pub fn new_order_id(&mut self) -> OrderId {
        self.order_ids.allocate()
    }

    fn actor(&self) -> ActorId {
        ActorId::TeamAi(self.team)
    }

    /// Hand a soldier an order via the message queue
    pub fn send_order(&mut self, order: Order) -> Result<()> {
        let entity = order.entity;
        self.hub
            .send(self.actor(), ActorId::Soldier(entity), Message::FollowOrder { order })
    }

    /// Withdraw an order before completion
    pub fn send_cancel(&mut self, entity: EntityId, order_id: OrderId) -> Result<()> {
        self.hub.send(
            self.actor(),
            ActorId::Soldier(entity),
            Message::CancelOrder { order_id },
        )
    }
}

/// Shared participant and order bookkeeping embedded in every manoeuvre
#[derive(Debug, Default)]
pub struct ManoeuvreCore {
    active: bool,
    succeeded: bool,
    failed: bool,
    /// Insertion order is meaningful: group assignment is round-robin
    participants: Vec<EntityId>,
    active_orders: AHashMap<EntityId, Order>,
}

impl ManoeuvreCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_succeeded(&mut self) {
        self.succeeded = true;
    }

    pub fn set_failed(&mut self) {
        self.failed = true;
    }

    pub fn participants(&self) -> &[EntityId] {
        &self.participants
    }

    pub fn is_participant(&self, entity: EntityId) -> bool {
        self.participants.contains(&entity)
    }

    /// Add an entity to the pool; adding twice keeps it listed once
    pub fn add_participant(&mut self, entity: EntityId) {
        if !self.participants.contains(&entity) {
            self.participants.push(entity);
        }
    }

    pub fn order_for(&self, entity: EntityId) -> Option<&Order> {
        self.active_orders.get(&entity)
    }

    pub fn owns_order(&self, order_id: OrderId) -> bool {
        self.active_orders.values().any(|o| o.id == order_id)
    }

    /// Send an order and record it as the participant's single active one
    ///
    /// A previous order for the same entity is cancelled first, keeping
    /// the one-order-per-entity invariant.
    pub fn issue_order(&mut self, ctx: &mut TeamCtx<'_>, order: Order) -> Result<()> {
        self.cancel_order(ctx, order.entity);
        tracing::debug!(
            team = %ctx.team,
            entity = %order.entity.0,
            order = ?order.kind,
            "order issued"
        );
        ctx.send_order(order)?;
        self.active_orders.insert(order.entity, order);
        Ok(())
    }

    /// Cancel the entity's active order, notifying it so its own tree can
    /// unwind cleanly
    pub fn cancel_order(&mut self, ctx: &mut TeamCtx<'_>, entity: EntityId) {
        if let Some(order) = self.active_orders.remove(&entity) {
            if ctx.send_cancel(entity, order.id).is_err() {
                tracing::warn!(entity = %entity.0, "cancel notification undeliverable");
            }
        }
    }

    /// Cancel every outstanding order
    ///
    /// Keys are collected (and sorted, so notification order does not
    /// depend on map internals) before cancelling - the map is never
    /// erased while being iterated.
    pub fn cancel_all_orders(&mut self, ctx: &mut TeamCtx<'_>) {
        let mut entities: Vec<EntityId> = self.active_orders.keys().copied().collect();
        entities.sort();
        for entity in entities {
            self.cancel_order(ctx, entity);
        }
    }

    /// Drop an entity from the manoeuvre, cancelling its order
    pub fn release_participant(&mut self, ctx: &mut TeamCtx<'_>, entity: EntityId) {
        self.cancel_order(ctx, entity);
        self.participants.retain(|p| *p != entity);
    }

    /// Shared terminate: cancel orders, clear participants, go inactive.
    /// Safe to call any number of times.
    pub fn terminate(&mut self, ctx: &mut TeamCtx<'_>) {
        self.cancel_all_orders(ctx);
        self.participants.clear();
        self.active = false;
    }

    /// Return to the pristine inactive state for the next round
    pub fn reset(&mut self) {
        self.active = false;
        self.succeeded = false;
        self.failed = false;
        self.participants.clear();
        self.active_orders.clear();
    }

    /// Terminal checks in fixed priority: inactive, failed or starved of
    /// participants means Failure; success only if nothing failed first
    pub fn evaluate(&self, min_participants: usize) -> Status {
        if !self.active || self.failed || self.participants.len() < min_participants {
            Status::Failure
        } else if self.succeeded {
            Status::Success
        } else {
            Status::Running
        }
    }

    /// Reactions shared by every manoeuvre; returns true when the message
    /// was consumed here
    ///
    /// A participant reported killed is released. A participant whose
    /// order failed is released outright - the manoeuvre carries on with
    /// the rest until it drops below its minimum.
    pub fn handle_common_message(&mut self, ctx: &mut TeamCtx<'_>, message: &Message) -> bool {
        match message {
            Message::EntityKilled { team, entity }
                if *team == ctx.team && self.is_participant(*entity) =>
            {
                self.release_participant(ctx, *entity);
                true
            }
            Message::UpdateOrderState {
                entity,
                order_id,
                state: OrderState::Failed,
            } if self.order_for(*entity).map(|o| o.id) == Some(*order_id) => {
                self.release_participant(ctx, *entity);
                true
            }
            _ => false,
        }
    }
}

/// One named tactic as a state machine
pub trait Manoeuvre {
    fn kind(&self) -> ManoeuvreKind;

    fn min_participants(&self) -> usize;

    fn max_participants(&self) -> usize;

    fn core(&self) -> &ManoeuvreCore;

    fn core_mut(&mut self) -> &mut ManoeuvreCore;

    /// Build and send the opening orders to every participant
    ///
    /// Returns Running on success; any delivery failure surfaces as an
    /// immediate Failure with the manoeuvre left inactive.
    fn initiate(&mut self, ctx: &mut TeamCtx<'_>) -> Status;

    /// Per-frame advance: timers, phase transitions, terminal checks
    fn update(&mut self, ctx: &mut TeamCtx<'_>, dt: f32) -> Status;

    /// React to one message forwarded by the owning team AI
    fn process_message(&mut self, ctx: &mut TeamCtx<'_>, message: &Message);

    /// Cancel outstanding orders and clear participants; idempotent, and
    /// called both on natural completion and on category preemption
    fn terminate(&mut self, ctx: &mut TeamCtx<'_>) {
        self.core_mut().terminate(ctx);
    }

    /// Back to pristine for the next round
    fn reset(&mut self);

    fn category(&self) -> ManoeuvreCategory {
        self.kind().category()
    }

    fn is_active(&self) -> bool {
        self.core().is_active()
    }
}

/// The team's long-lived manoeuvre instances, created once at setup
///
/// Slots are takeable so a manoeuvre can be run against a context that
/// borrows the rest of the team state.
pub struct ManoeuvreRoster {
    slots: AHashMap<ManoeuvreKind, Option<Box<dyn Manoeuvre>>>,
}

impl ManoeuvreRoster {
    pub fn new(manoeuvres: Vec<Box<dyn Manoeuvre>>) -> Self {
        let mut slots = AHashMap::new();
        for manoeuvre in manoeuvres {
            slots.insert(manoeuvre.kind(), Some(manoeuvre));
        }
        Self { slots }
    }

    pub fn kinds(&self) -> Vec<ManoeuvreKind> {
        self.slots.keys().copied().collect()
    }

    pub fn contains(&self, kind: ManoeuvreKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Borrow a manoeuvre out of its slot; must be returned via `put_back`
    pub fn take(&mut self, kind: ManoeuvreKind) -> Option<Box<dyn Manoeuvre>> {
        self.slots.get_mut(&kind).and_then(|slot| slot.take())
    }

    pub fn put_back(&mut self, manoeuvre: Box<dyn Manoeuvre>) {
        self.slots.insert(manoeuvre.kind(), Some(manoeuvre));
    }

    /// Peek without taking (slot may be empty while its owner runs it)
    pub fn get(&self, kind: ManoeuvreKind) -> Option<&dyn Manoeuvre> {
        self.slots
            .get(&kind)
            .and_then(|slot| slot.as_deref())
    }
}
