//! Capture the enemy flag behind an escort

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
    Capture,
}

/// The cautious capture: the squad rallies at the staging point nearest
/// the enemy flag, then one designated runner goes in while the guards
/// hold the rally point covering the retreat path. If the runner falls,
/// a guard is promoted and the run continues.
pub struct GuardedFlagCapture {
    core: ManoeuvreCore,
    phase: Phase,
    rally: GridPos,
    runner: Option<EntityId>,
    arrived: AHashSet<EntityId>,
    wait_timer: f32,
}

impl GuardedFlagCapture {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
            phase: Phase::Assemble,
            rally: GridPos::default(),
            runner: None,
            arrived: AHashSet::new(),
            wait_timer: 0.0,
        }
    }

    fn quorum_reached(&self) -> bool {
        !self.core.participants().is_empty()
            && self
                .core
                .participants()
                .iter()
                .all(|entity| self.arrived.contains(entity))
    }

    /// Send the runner in and post the guards; phase-guarded
    fn start_capture(&mut self, ctx: &mut TeamCtx<'_>) {
        if self.phase == Phase::Capture {
            return;
        }
        self.phase = Phase::Capture;
        self.dispatch_runner(ctx);

        let guards: Vec<EntityId> = self
            .core
            .participants()
            .iter()
            .copied()
            .filter(|e| Some(*e) != self.runner)
            .collect();
        for entity in guards {
            let order = Order::defend(ctx.new_order_id(), entity, self.rally, OrderPriority::Medium);
            if self.core.issue_order(ctx, order).is_err() {
                self.core.set_failed();
                return;
            }
        }
    }

    /// Order the current runner onto the flag, promoting a guard first if
    /// the slot is empty
    fn dispatch_runner(&mut self, ctx: &mut TeamCtx<'_>) {
        if self
            .runner
            .map_or(true, |r| !self.core.is_participant(r))
        {
            self.runner = self.core.participants().first().copied();
        }
        let Some(runner) = self.runner else {
            return;
        };
        let target = ctx.knowledge.enemy_flag.position;
        let order = Order::move_to(ctx.new_order_id(), runner, target, OrderPriority::High);
        if self.core.issue_order(ctx, order).is_err() {
            self.core.set_failed();
        }
    }
}

impl Default for GuardedFlagCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for GuardedFlagCapture {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::GuardedFlagCapture
    }

    fn min_participants(&self) -> usize {
        2
    }

    fn max_participants(&self) -> usize {
        4
    }

    fn core(&self) -> &ManoeuvreCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManoeuvreCore {
        &mut self.core
    }

    fn initiate(&mut self, ctx: &mut TeamCtx<'_>) -> Status {
        let enemy = ctx.team.opponent();
        let staging = ctx.arena.attack_positions(enemy).to_vec();
        if staging.is_empty() {
            self.core.set_active(false);
            return Status::Failure;
        }

        let flag = ctx.knowledge.enemy_flag.position;
        self.rally = staging
            .iter()
            .copied()
            .min_by_key(|p| ordered_float::OrderedFloat(p.distance(&flag)))
            .unwrap_or(staging[0]);
        self.phase = Phase::Assemble;
        self.arrived.clear();
        self.wait_timer = ctx.config.wait_for_participants_interval;

        // the participant starting closest to the flag makes the run
        self.runner = self
            .core
            .participants()
            .iter()
            .copied()
            .min_by_key(|e| {
                ctx.soldier(*e)
                    .map(|s| ordered_float::OrderedFloat(s.position.distance(&flag)))
                    .unwrap_or(ordered_float::OrderedFloat(f32::MAX))
            });

        let participants = self.core.participants().to_vec();
        for entity in participants {
            let order = Order::move_to(ctx.new_order_id(), entity, self.rally, OrderPriority::Medium);
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
            if self.wait_timer <= 0.0 || self.quorum_reached() {
                self.start_capture(ctx);
            }
        }
        self.core.evaluate(self.min_participants())
    }

    fn process_message(&mut self, ctx: &mut TeamCtx<'_>, message: &Message) {
        if self.core.handle_common_message(ctx, message) {
            if let Message::EntityKilled { entity, .. }
            | Message::UpdateOrderState { entity, .. } = message
            {
                self.arrived.remove(entity);
                // losing the runner promotes a guard mid-capture
                if self.phase == Phase::Capture && Some(*entity) == self.runner {
                    self.runner = None;
                    self.dispatch_runner(ctx);
                }
            }
            if self.phase == Phase::Assemble && self.quorum_reached() {
                self.start_capture(ctx);
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
                        self.start_capture(ctx);
                    }
                } else if Some(*entity) == self.runner {
                    // reached the stand without the pickup firing; go again
                    self.dispatch_runner(ctx);
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
        self.runner = None;
        self.arrived.clear();
        self.wait_timer = 0.0;
    }
}
