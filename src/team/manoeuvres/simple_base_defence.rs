//! Hold the defensive posts around the own flag

use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority};
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

/// The no-frills defence: participants take the base field positions and
/// stay there. Fails when the own flag is taken anyway.
pub struct SimpleBaseDefence {
    core: ManoeuvreCore,
}

impl SimpleBaseDefence {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
        }
    }
}

impl Default for SimpleBaseDefence {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for SimpleBaseDefence {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::SimpleBaseDefence
    }

    fn min_participants(&self) -> usize {
        1
    }

    fn max_participants(&self) -> usize {
        2
    }

    fn core(&self) -> &ManoeuvreCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManoeuvreCore {
        &mut self.core
    }

    fn initiate(&mut self, ctx: &mut TeamCtx<'_>) -> Status {
        let posts = ctx.arena.base_field_positions(ctx.team).to_vec();
        if posts.is_empty() {
            self.core.set_active(false);
            return Status::Failure;
        }

        let participants = self.core.participants().to_vec();
        for (index, entity) in participants.into_iter().enumerate() {
            let order = Order::defend(
                ctx.new_order_id(),
                entity,
                posts[index % posts.len()],
                OrderPriority::Low,
            );
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
        if let Message::FlagPickedUp { flag_owner, .. } = message {
            if *flag_owner == ctx.team {
                self.core.set_failed();
            }
        }
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
