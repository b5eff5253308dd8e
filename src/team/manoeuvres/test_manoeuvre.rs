//! Minimal manoeuvre exercising the shared machinery

use ahash::AHashSet;

use crate::arena::grid::GridPos;
use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority, OrderState};
use crate::core::types::EntityId;
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

/// Sends every participant to the middle of the arena and succeeds when
/// all of them report arrival. Uncategorised, so it never competes with
/// the real tactics; scenario setups use it to drive the order loop
/// without tactical side effects.
pub struct TestManoeuvre {
    core: ManoeuvreCore,
    target: GridPos,
    arrived: AHashSet<EntityId>,
}

impl TestManoeuvre {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
            target: GridPos::default(),
            arrived: AHashSet::new(),
        }
    }
}

impl Default for TestManoeuvre {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for TestManoeuvre {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::TestManoeuvre
    }

    fn min_participants(&self) -> usize {
        1
    }

    fn max_participants(&self) -> usize {
        8
    }

    fn core(&self) -> &ManoeuvreCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManoeuvreCore {
        &mut self.core
    }

    fn initiate(&mut self, ctx: &mut TeamCtx<'_>) -> Status {
        self.target = GridPos::new(ctx.arena.width() / 2, 0);
        self.arrived.clear();

        let participants = self.core.participants().to_vec();
        for entity in participants {
            let order = Order::move_to(ctx.new_order_id(), entity, self.target, OrderPriority::Low);
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
            if let Message::EntityKilled { entity, .. }
            | Message::UpdateOrderState { entity, .. } = message
            {
                self.arrived.remove(entity);
            }
            return;
        }

        if let Message::UpdateOrderState {
            entity,
            order_id,
            state: OrderState::Succeeded,
        } = message
        {
            if self.core.order_for(*entity).map(|o| o.id) == Some(*order_id) {
                self.arrived.insert(*entity);
                if self
                    .core
                    .participants()
                    .iter()
                    .all(|p| self.arrived.contains(p))
                {
                    self.core.set_succeeded();
                }
            }
        }
    }

    fn reset(&mut self) {
        self.core.reset();
        self.arrived.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::manoeuvres::testkit::CtxFixture;

    #[test]
    fn test_succeeds_once_everyone_arrives() {
        let mut fixture = CtxFixture::new(2);
        let mut manoeuvre = TestManoeuvre::new();
        for id in fixture.own_ids() {
            manoeuvre.core_mut().add_participant(id);
        }
        manoeuvre.core_mut().set_active(true);
        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Running);

        for id in fixture.own_ids() {
            let order_id = manoeuvre
                .core()
                .order_for(id)
                .map(|o| o.id)
                .expect("move order issued");
            assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Running);
            manoeuvre.process_message(
                &mut fixture.ctx(),
                &Message::UpdateOrderState {
                    entity: id,
                    order_id,
                    state: OrderState::Succeeded,
                },
            );
        }

        assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Success);
    }
}
