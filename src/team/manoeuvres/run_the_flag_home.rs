//! Escort nothing, carry everything: the flag carrier runs for home

use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority};
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

/// Bound to exactly the soldier carrying the enemy flag, bypassing the
/// general participant pool. Succeeds on the capture score; losing the
/// carrier (and with it the flag) fails it.
pub struct RunTheFlagHome {
    core: ManoeuvreCore,
}

impl RunTheFlagHome {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
        }
    }
}

impl Default for RunTheFlagHome {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for RunTheFlagHome {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::RunTheFlagHome
    }

    fn min_participants(&self) -> usize {
        1
    }

    fn max_participants(&self) -> usize {
        1
    }

    fn core(&self) -> &ManoeuvreCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManoeuvreCore {
        &mut self.core
    }

    fn initiate(&mut self, ctx: &mut TeamCtx<'_>) -> Status {
        // the team AI binds the carrier as the sole participant
        let carrier = ctx.knowledge.enemy_flag.carrier();
        let Some(carrier) = carrier.filter(|c| self.core.is_participant(*c)) else {
            self.core.set_active(false);
            return Status::Failure;
        };

        let home = ctx.knowledge.own_flag.base_position;
        let order = Order::move_to(ctx.new_order_id(), carrier, home, OrderPriority::High);
        if self.core.issue_order(ctx, order).is_err() {
            self.core.set_failed();
            return Status::Failure;
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
            Message::ScoreUpdate { team, .. } if *team == ctx.team => {
                self.core.set_succeeded();
            }
            Message::FlagDropped { flag_owner, .. } if *flag_owner != ctx.team => {
                // the run ended on the ground
                self.core.set_failed();
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
