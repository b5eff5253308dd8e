//! Hunt down the enemy carrying the own flag

use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority};
use crate::core::types::EntityId;
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Converging on the carrier's last known position
    Hunt,
    /// A hunter has visual contact; individual combat takes it from here
    Engage,
}

/// The own flag is on an enemy's back: everyone assigned converges on the
/// carrier. Succeeds when the carrier goes down or the flag is otherwise
/// recovered; an enemy capture ends the hunt in failure.
pub struct InterceptFlagCarrier {
    core: ManoeuvreCore,
    phase: Phase,
    carrier: Option<EntityId>,
}

impl InterceptFlagCarrier {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
            phase: Phase::Hunt,
            carrier: None,
        }
    }

    /// Point every hunter at the carrier's freshest known position
    fn direct_hunt(&mut self, ctx: &mut TeamCtx<'_>) {
        let Some(carrier) = self.carrier else {
            return;
        };
        let position = ctx
            .knowledge
            .enemies
            .get(&carrier)
            .map(|record| record.last_position)
            // no sighting yet: cut off the route to the enemy base
            .unwrap_or_else(|| ctx.arena.flag_stand(ctx.team.opponent()));

        let hunters = self.core.participants().to_vec();
        for entity in hunters {
            let order = Order::attack(
                ctx.new_order_id(),
                entity,
                carrier,
                position,
                OrderPriority::High,
            );
            if self.core.issue_order(ctx, order).is_err() {
                self.core.set_failed();
                return;
            }
        }
    }
}

impl Default for InterceptFlagCarrier {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for InterceptFlagCarrier {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::InterceptFlagCarrier
    }

    fn min_participants(&self) -> usize {
        1
    }

    fn max_participants(&self) -> usize {
        3
    }

    fn core(&self) -> &ManoeuvreCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManoeuvreCore {
        &mut self.core
    }

    fn initiate(&mut self, ctx: &mut TeamCtx<'_>) -> Status {
        let Some(carrier) = ctx.knowledge.own_flag.carrier() else {
            self.core.set_active(false);
            return Status::Failure;
        };
        self.carrier = Some(carrier);
        self.phase = Phase::Hunt;

        self.direct_hunt(ctx);
        if self.core.evaluate(self.min_participants()) == Status::Failure {
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
            Message::UpdateEnemyPosition { enemy, .. } if Some(*enemy) == self.carrier => {
                // only re-vector while still hunting blind
                if self.phase == Phase::Hunt {
                    self.direct_hunt(ctx);
                }
            }
            Message::EnemySpotted { enemy, .. } if Some(*enemy) == self.carrier => {
                self.phase = Phase::Engage;
            }
            Message::EntityKilled { team, entity }
                if *team != ctx.team && Some(*entity) == self.carrier =>
            {
                self.core.set_succeeded();
            }
            Message::FlagReturned { flag_owner } if *flag_owner == ctx.team => {
                self.core.set_succeeded();
            }
            Message::ScoreUpdate { team, .. } if *team != ctx.team => {
                // the carrier made it home
                self.core.set_failed();
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.core.reset();
        self.phase = Phase::Hunt;
        self.carrier = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::grid::GridPos;
    use crate::comms::order::OrderKind;
    use crate::core::types::Team;
    use crate::team::manoeuvres::testkit::CtxFixture;

    fn hunting(fixture: &mut CtxFixture) -> (InterceptFlagCarrier, EntityId) {
        let carrier = fixture.enemy_ids()[0];
        fixture.knowledge.apply(&Message::FlagPickedUp {
            flag_owner: Team::Red,
            carrier,
        });
        let mut manoeuvre = InterceptFlagCarrier::new();
        for id in fixture.own_ids().into_iter().take(2) {
            manoeuvre.core_mut().add_participant(id);
        }
        manoeuvre.core_mut().set_active(true);
        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Running);
        (manoeuvre, carrier)
    }

    #[test]
    fn test_hunters_receive_attack_orders_on_carrier() {
        let mut fixture = CtxFixture::new(3);
        let (manoeuvre, carrier) = hunting(&mut fixture);

        for id in manoeuvre.core().participants() {
            assert!(matches!(
                manoeuvre.core().order_for(*id).map(|o| o.kind),
                Some(OrderKind::AttackEnemy { target, .. }) if target == carrier
            ));
        }
    }

    #[test]
    fn test_position_update_revectors_the_hunt() {
        let mut fixture = CtxFixture::new(3);
        let (mut manoeuvre, carrier) = hunting(&mut fixture);
        let fresh = GridPos::new(18, 12);

        fixture.knowledge.apply(&Message::EnemySpotted {
            spotter: fixture.own_ids()[0],
            enemy: carrier,
            position: fresh,
        });
        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::UpdateEnemyPosition {
                enemy: carrier,
                position: fresh,
            },
        );

        let hunter = manoeuvre.core().participants()[0];
        assert!(matches!(
            manoeuvre.core().order_for(hunter).map(|o| o.kind),
            Some(OrderKind::AttackEnemy { last_known_position, .. })
                if last_known_position == fresh
        ));
    }

    #[test]
    fn test_sighting_moves_to_engage_phase() {
        let mut fixture = CtxFixture::new(3);
        let (mut manoeuvre, carrier) = hunting(&mut fixture);

        let spotter = fixture.own_ids()[0];
        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::EnemySpotted {
                spotter,
                enemy: carrier,
                position: GridPos::new(10, 10),
            },
        );
        assert_eq!(manoeuvre.phase, Phase::Engage);

        // further position updates must not re-issue hunt orders
        let hunter = manoeuvre.core().participants()[0];
        let order_before = manoeuvre.core().order_for(hunter).map(|o| o.id);
        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::UpdateEnemyPosition {
                enemy: carrier,
                position: GridPos::new(11, 10),
            },
        );
        assert_eq!(
            manoeuvre.core().order_for(hunter).map(|o| o.id),
            order_before
        );
    }

    #[test]
    fn test_killing_the_carrier_succeeds() {
        let mut fixture = CtxFixture::new(3);
        let (mut manoeuvre, carrier) = hunting(&mut fixture);

        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::EntityKilled {
                team: Team::Blue,
                entity: carrier,
            },
        );
        assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Success);
    }

    #[test]
    fn test_enemy_capture_fails_the_hunt() {
        let mut fixture = CtxFixture::new(3);
        let (mut manoeuvre, _) = hunting(&mut fixture);

        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::ScoreUpdate {
                team: Team::Blue,
                score: 1,
            },
        );
        assert_eq!(manoeuvre.update(&mut fixture.ctx(), 0.1), Status::Failure);
    }
}
