//! Throw everyone straight at the enemy flag

use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority, OrderState};
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

/// No assembly, no finesse: every participant runs for the enemy flag at
/// once. Succeeds the moment the flag is picked up.
pub struct RushBaseAttack {
    core: ManoeuvreCore,
}

impl RushBaseAttack {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
        }
    }
}

impl Default for RushBaseAttack {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for RushBaseAttack {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::RushBaseAttack
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
        let target = ctx.knowledge.enemy_flag.position;
        let participants = self.core.participants().to_vec();
        for entity in participants {
            let order = Order::move_to(ctx.new_order_id(), entity, target, OrderPriority::High);
            if self.core.issue_order(ctx, order).is_err() {
                self.core.set_failed();
                return Status::Failure;
            }
        }
        Status::Running
    }

    fn update(&mut self, _ctx: &mut TeamCtx<'_>, _dt: f32) -> Status {
        self.core.evaluate(self.min_participants())
    }

    fn process_message(&mut self, ctx: &mut TeamCtx<'_>, message: &Message) {
        if self.core.handle_common_message(ctx, message) {
            return;
        }
        match message {
            Message::FlagPickedUp { flag_owner, .. } if *flag_owner != ctx.team => {
                self.core.set_succeeded();
            }
            // arrived at the stand without tripping the pickup: keep
            // pressure on the area until something changes
            Message::UpdateOrderState {
                entity,
                order_id,
                state: OrderState::Succeeded,
            } if self.core.order_for(*entity).map(|o| o.id) == Some(*order_id) => {
                let entity = *entity;
                let centre = ctx.knowledge.enemy_flag.position;
                if let Some(target) =
                    ctx.arena
                        .random_unblocked_target_in_area(ctx.rng, centre, 3.0)
                {
                    let order =
                        Order::move_to(ctx.new_order_id(), entity, target, OrderPriority::Medium);
                    if self.core.issue_order(ctx, order).is_err() {
                        self.core.set_failed();
                    }
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
