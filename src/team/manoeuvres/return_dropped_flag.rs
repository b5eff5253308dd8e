//! Recover the own dropped flag

use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority};
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

/// The own flag is lying on the field: touch it before the enemy carries
/// it off. Succeeds when the flag is home, fails if it is stolen again.
pub struct ReturnDroppedFlag {
    core: ManoeuvreCore,
}

impl ReturnDroppedFlag {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
        }
    }
}

impl Default for ReturnDroppedFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for ReturnDroppedFlag {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::ReturnDroppedFlag
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
        if !ctx.knowledge.own_flag.is_dropped() {
            self.core.set_active(false);
            return Status::Failure;
        }
        let target = ctx.knowledge.own_flag.position;

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
            Message::FlagReturned { flag_owner } if *flag_owner == ctx.team => {
                self.core.set_succeeded();
            }
            Message::FlagPickedUp { flag_owner, .. } if *flag_owner == ctx.team => {
                // stolen off the ground before anyone reached it
                self.core.set_failed();
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
    use crate::arena::grid::GridPos;
    use crate::core::types::{EntityId, Team};
    use crate::team::manoeuvres::testkit::CtxFixture;

    fn started(fixture: &mut CtxFixture) -> ReturnDroppedFlag {
        fixture.knowledge.apply(&Message::FlagDropped {
            flag_owner: Team::Red,
            position: GridPos::new(12, 9),
        });
        let mut manoeuvre = ReturnDroppedFlag::new();
        manoeuvre.core_mut().add_participant(fixture.own_ids()[0]);
        manoeuvre.core_mut().set_active(true);
        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Running);
        manoeuvre
    }

    #[test]
    fn test_succeeds_when_flag_comes_home() {
        let mut fixture = CtxFixture::new(1);
        let mut manoeuvre = started(&mut fixture);

        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::FlagReturned {
                flag_owner: Team::Red,
            },
        );
        assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Success);
    }

    #[test]
    fn test_fails_if_flag_stolen_from_the_ground() {
        let mut fixture = CtxFixture::new(1);
        let mut manoeuvre = started(&mut fixture);

        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::FlagPickedUp {
                flag_owner: Team::Red,
                carrier: EntityId::new(),
            },
        );
        assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Failure);
    }

    #[test]
    fn test_inactive_without_a_dropped_flag() {
        let mut fixture = CtxFixture::new(1);
        let mut manoeuvre = ReturnDroppedFlag::new();
        manoeuvre.core_mut().add_participant(fixture.own_ids()[0]);
        manoeuvre.core_mut().set_active(true);

        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Failure);
        assert!(!manoeuvre.is_active());
    }
}
