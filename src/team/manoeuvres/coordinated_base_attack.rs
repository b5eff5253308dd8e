//! Assemble in groups at staging points, then attack together

use ahash::AHashSet;

use crate::arena::grid::GridPos;
use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority, OrderState};
use crate::core::types::EntityId;
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Assemble,
    Attack,
}

/// Participants split round-robin into assembly groups, gather at the
/// staging positions outside the enemy base, and commit to the attack
/// when everyone has arrived or the wait timer expires - whichever comes
/// first.
pub struct CoordinatedBaseAttack {
    core: ManoeuvreCore,
    phase: Phase,
    assembly_points: Vec<GridPos>,
    arrived: AHashSet<EntityId>,
    wait_timer: f32,
}

impl CoordinatedBaseAttack {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
            phase: Phase::Assemble,
            assembly_points: Vec::new(),
            arrived: AHashSet::new(),
            wait_timer: 0.0,
        }
    }

    /// Commit to the attack run; phase-guarded so the timer expiring and
    /// the quorum completing in the same frame launch it only once
    fn start_attack(&mut self, ctx: &mut TeamCtx<'_>) {
        if self.phase == Phase::Attack {
            return;
        }
        self.phase = Phase::Attack;
        tracing::debug!(team = %ctx.team, "coordinated attack launched");

        let target = ctx.knowledge.enemy_flag.position;
        let participants = self.core.participants().to_vec();
        for entity in participants {
            let order = Order::move_to(ctx.new_order_id(), entity, target, OrderPriority::High);
            if self.core.issue_order(ctx, order).is_err() {
                self.core.set_failed();
                return;
            }
        }
    }

    /// Everyone still on the books has reported arrival
    fn quorum_reached(&self) -> bool {
        !self.core.participants().is_empty()
            && self
                .core
                .participants()
                .iter()
                .all(|entity| self.arrived.contains(entity))
    }
}

impl Default for CoordinatedBaseAttack {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for CoordinatedBaseAttack {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::CoordinatedBaseAttack
    }

    fn min_participants(&self) -> usize {
        3
    }

    fn max_participants(&self) -> usize {
        6
    }

    fn core(&self) -> &ManoeuvreCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManoeuvreCore {
        &mut self.core
    }

    fn initiate(&mut self, ctx: &mut TeamCtx<'_>) -> Status {
        let staging = ctx.arena.attack_positions(ctx.team.opponent()).to_vec();
        if staging.is_empty() {
            self.core.set_active(false);
            return Status::Failure;
        }

        let groups = ctx.config.coordinated_attack_groups.min(staging.len());
        self.assembly_points = (0..groups).map(|g| staging[g % staging.len()]).collect();
        self.phase = Phase::Assemble;
        self.arrived.clear();
        self.wait_timer = ctx.config.wait_for_participants_interval;

        // group assignment is round-robin in insertion order
        let participants = self.core.participants().to_vec();
        for (index, entity) in participants.into_iter().enumerate() {
            let point = self.assembly_points[index % self.assembly_points.len()];
            let order = Order::move_to(ctx.new_order_id(), entity, point, OrderPriority::Medium);
            if self.core.issue_order(ctx, order).is_err() {
                self.core.set_failed();
                return Status::Failure;
            }
        }
        Status::Running
    }

    fn update(&mut self, ctx: &mut TeamCtx<'_>, dt: f32) -> Status {
        if self.core.is_active() && self.phase == Phase::Assemble {
            self.wait_timer -= dt;
            // stragglers forfeit their place once the timer runs out
            if self.wait_timer <= 0.0 || self.quorum_reached() {
                self.start_attack(ctx);
            }
        }
        self.core.evaluate(self.min_participants())
    }

    fn process_message(&mut self, ctx: &mut TeamCtx<'_>, message: &Message) {
        if self.core.handle_common_message(ctx, message) {
            // a released straggler shrinks the quorum
            if let Message::EntityKilled { entity, .. }
            | Message::UpdateOrderState { entity, .. } = message
            {
                self.arrived.remove(entity);
            }
            if self.phase == Phase::Assemble && self.quorum_reached() {
                self.start_attack(ctx);
            }
            return;
        }

        match message {
            Message::UpdateOrderState {
                entity,
                order_id,
                state: OrderState::Succeeded,
            } if self.core.order_for(*entity).map(|o| o.id) == Some(*order_id) => {
                if self.phase == Phase::Assemble {
                    self.arrived.insert(*entity);
                    if self.quorum_reached() {
                        self.start_attack(ctx);
                    }
                }
            }
            Message::FlagPickedUp { flag_owner, .. } if *flag_owner != ctx.team => {
                self.core.set_succeeded();
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.core.reset();
        self.phase = Phase::Assemble;
        self.assembly_points.clear();
        self.arrived.clear();
        self.wait_timer = 0.0;
    }
}
