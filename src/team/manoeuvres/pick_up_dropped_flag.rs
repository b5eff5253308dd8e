//! Race to a dropped enemy flag

use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority};
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

/// The enemy flag is loose on the field: the closest soldiers sprint for
/// it. Succeeds on pickup, fails if the enemy recovers it first.
pub struct PickUpDroppedFlag {
    core: ManoeuvreCore,
}

impl PickUpDroppedFlag {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
        }
    }
}

impl Default for PickUpDroppedFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for PickUpDroppedFlag {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::PickUpDroppedFlag
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
        if !ctx.knowledge.enemy_flag.is_dropped() {
            self.core.set_active(false);
            return Status::Failure;
        }
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
            Message::FlagReturned { flag_owner } if *flag_owner != ctx.team => {
                // the enemy got to it first
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
    use crate::comms::order::OrderKind;
    use crate::core::types::Team;
    use crate::team::manoeuvres::testkit::CtxFixture;

    fn with_dropped_flag(fixture: &mut CtxFixture, position: GridPos) {
        fixture.knowledge.apply(&Message::FlagDropped {
            flag_owner: Team::Blue,
            position,
        });
    }

    #[test]
    fn test_requires_a_dropped_flag() {
        let mut fixture = CtxFixture::new(1);
        let mut manoeuvre = PickUpDroppedFlag::new();
        manoeuvre.core_mut().add_participant(fixture.own_ids()[0]);
        manoeuvre.core_mut().set_active(true);

        // enemy flag is still in base
        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Failure);
        assert!(!manoeuvre.is_active());
    }

    #[test]
    fn test_runners_sent_to_the_drop_position() {
        let mut fixture = CtxFixture::new(2);
        let drop = GridPos::new(15, 6);
        with_dropped_flag(&mut fixture, drop);

        let mut manoeuvre = PickUpDroppedFlag::new();
        for id in fixture.own_ids() {
            manoeuvre.core_mut().add_participant(id);
        }
        manoeuvre.core_mut().set_active(true);

        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Running);
        for id in fixture.own_ids() {
            assert_eq!(
                manoeuvre.core().order_for(id).map(|o| o.kind),
                Some(OrderKind::MoveToPosition { destination: drop })
            );
        }
    }

    #[test]
    fn test_enemy_recovery_fails_the_race() {
        let mut fixture = CtxFixture::new(1);
        with_dropped_flag(&mut fixture, GridPos::new(15, 6));
        let mut manoeuvre = PickUpDroppedFlag::new();
        manoeuvre.core_mut().add_participant(fixture.own_ids()[0]);
        manoeuvre.core_mut().set_active(true);
        manoeuvre.initiate(&mut fixture.ctx());

        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::FlagReturned {
                flag_owner: Team::Blue,
            },
        );

        assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Failure);
    }
}
