//! Send a lone runner after the enemy flag

use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority, OrderState};
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

/// The fallback attack when the team cannot spare a squad: one soldier
/// makes the run alone.
pub struct SimpleBaseAttack {
    core: ManoeuvreCore,
}

impl SimpleBaseAttack {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
        }
    }
}

impl Default for SimpleBaseAttack {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for SimpleBaseAttack {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::SimpleBaseAttack
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
        let target = ctx.knowledge.enemy_flag.position;
        let participants = self.core.participants().to_vec();
        for entity in participants {
            let order = Order::move_to(ctx.new_order_id(), entity, target, OrderPriority::Medium);
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
            Message::UpdateOrderState {
                entity,
                order_id,
                state: OrderState::Succeeded,
            } if self.core.order_for(*entity).map(|o| o.id) == Some(*order_id) => {
                // arrived without the pickup firing; retry towards the
                // latest believed flag position
                let entity = *entity;
                let target = ctx.knowledge.enemy_flag.position;
                let order =
                    Order::move_to(ctx.new_order_id(), entity, target, OrderPriority::Medium);
                if self.core.issue_order(ctx, order).is_err() {
                    self.core.set_failed();
                }
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comms::order::OrderKind;
    use crate::core::types::Team;
    use crate::team::manoeuvres::testkit::CtxFixture;

    #[test]
    fn test_single_runner_targets_the_flag() {
        let mut fixture = CtxFixture::new(1);
        let mut manoeuvre = SimpleBaseAttack::new();
        let runner = fixture.own_ids()[0];
        manoeuvre.core_mut().add_participant(runner);
        manoeuvre.core_mut().set_active(true);

        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Running);
        assert_eq!(
            manoeuvre.core().order_for(runner).map(|o| o.kind),
            Some(OrderKind::MoveToPosition {
                destination: fixture.arena.flag_stand(Team::Blue)
            })
        );
    }

    #[test]
    fn test_succeeds_on_flag_pickup() {
        let mut fixture = CtxFixture::new(1);
        let mut manoeuvre = SimpleBaseAttack::new();
        let runner = fixture.own_ids()[0];
        manoeuvre.core_mut().add_participant(runner);
        manoeuvre.core_mut().set_active(true);
        manoeuvre.initiate(&mut fixture.ctx());

        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::FlagPickedUp {
                flag_owner: Team::Blue,
                carrier: runner,
            },
        );

        assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Success);
    }
}
