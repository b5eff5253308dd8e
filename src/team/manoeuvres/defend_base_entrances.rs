//! Post a defender at each entrance of the own base

use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority};
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

/// Participants take defend positions at the base entrances, round-robin
/// in assignment order. The manoeuvre holds until the own flag leaves the
/// base or the defenders are wiped out.
pub struct DefendBaseEntrances {
    core: ManoeuvreCore,
}

impl DefendBaseEntrances {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
        }
    }
}

impl Default for DefendBaseEntrances {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for DefendBaseEntrances {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::DefendBaseEntrances
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
        let entrances = ctx.arena.base_entrances(ctx.team).to_vec();
        if entrances.is_empty() {
            // nothing to defend from; stand down before issuing anything
            self.core.set_active(false);
            return Status::Failure;
        }

        let participants = self.core.participants().to_vec();
        for (index, entity) in participants.into_iter().enumerate() {
            let order = Order::defend(
                ctx.new_order_id(),
                entity,
                entrances[index % entrances.len()],
                OrderPriority::Medium,
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
            // the thing being guarded is gone
            if *flag_owner == ctx.team {
                self.core.set_failed();
            }
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
    use crate::arena::map::{Arena, BaseLayout};
    use crate::comms::order::OrderKind;
    use crate::core::types::{EntityId, Team};
    use crate::team::manoeuvres::testkit::CtxFixture;

    fn initiate_with(fixture: &mut CtxFixture, manoeuvre: &mut DefendBaseEntrances, count: usize) {
        let ids = fixture.own_ids();
        for id in ids.into_iter().take(count) {
            manoeuvre.core_mut().add_participant(id);
        }
        manoeuvre.core_mut().set_active(true);
    }

    #[test]
    fn test_initiate_posts_defenders_at_entrances() {
        let mut fixture = CtxFixture::new(2);
        let mut manoeuvre = DefendBaseEntrances::new();
        initiate_with(&mut fixture, &mut manoeuvre, 2);

        let status = manoeuvre.initiate(&mut fixture.ctx());
        assert_eq!(status, Status::Running);

        let entrances = fixture.arena.base_entrances(Team::Red).to_vec();
        let ids = fixture.own_ids();
        for (index, id) in ids.iter().enumerate() {
            let messages = fixture.inbox(*id);
            let order = messages
                .iter()
                .find_map(|m| match m {
                    Message::FollowOrder { order } => Some(*order),
                    _ => None,
                })
                .expect("defender received an order");
            assert_eq!(
                order.kind,
                OrderKind::DefendPosition {
                    position: entrances[index % entrances.len()]
                }
            );
        }
    }

    #[test]
    fn test_no_entrances_deactivates_and_fails() {
        let mut fixture = CtxFixture::new(2);
        // rebuild the arena with no entrances on the red base
        let mut red_base = fixture.arena.base(Team::Red).clone();
        red_base.entrances.clear();
        let blue_base = fixture.arena.base(Team::Blue).clone();
        fixture.arena = Arena::custom(
            fixture.config.arena_width,
            fixture.config.arena_height,
            Vec::<GridPos>::new(),
            red_base,
            blue_base,
        );

        let mut manoeuvre = DefendBaseEntrances::new();
        initiate_with(&mut fixture, &mut manoeuvre, 2);

        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Failure);
        assert!(!manoeuvre.is_active());
        // the next update must report the failure as well
        assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Failure);
    }

    #[test]
    fn test_losing_all_defenders_fails() {
        let mut fixture = CtxFixture::new(1);
        let mut manoeuvre = DefendBaseEntrances::new();
        initiate_with(&mut fixture, &mut manoeuvre, 1);
        manoeuvre.initiate(&mut fixture.ctx());

        let defender = fixture.own_ids()[0];
        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::EntityKilled {
                team: Team::Red,
                entity: defender,
            },
        );

        assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Failure);
    }

    #[test]
    fn test_own_flag_stolen_fails_the_defence() {
        let mut fixture = CtxFixture::new(2);
        let mut manoeuvre = DefendBaseEntrances::new();
        initiate_with(&mut fixture, &mut manoeuvre, 2);
        manoeuvre.initiate(&mut fixture.ctx());

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
    fn test_terminate_twice_is_idempotent() {
        let mut fixture = CtxFixture::new(2);
        let mut manoeuvre = DefendBaseEntrances::new();
        initiate_with(&mut fixture, &mut manoeuvre, 2);
        manoeuvre.initiate(&mut fixture.ctx());

        manoeuvre.terminate(&mut fixture.ctx());
        manoeuvre.terminate(&mut fixture.ctx());

        assert!(manoeuvre.core().participants().is_empty());
        assert!(!manoeuvre.is_active());
    }

    #[test]
    fn test_terminate_cancels_outstanding_orders() {
        let mut fixture = CtxFixture::new(2);
        let mut manoeuvre = DefendBaseEntrances::new();
        initiate_with(&mut fixture, &mut manoeuvre, 2);
        manoeuvre.initiate(&mut fixture.ctx());

        // swallow the FollowOrder traffic first
        let ids = fixture.own_ids();
        for id in &ids {
            fixture.inbox(*id);
        }

        manoeuvre.terminate(&mut fixture.ctx());

        for id in &ids {
            let messages = fixture.inbox(*id);
            assert!(
                messages
                    .iter()
                    .any(|m| matches!(m, Message::CancelOrder { .. })),
                "every defender must be told its order is withdrawn"
            );
        }
    }
}
