//! Patrol the base perimeter and hunt intruders

use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderKind, OrderPriority, OrderState};
use crate::core::types::EntityId;
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

/// Defence on the move: participants roam random positions around the
/// own flag stand and are redirected onto any enemy the team knows about
/// near the base.
pub struct ActiveBaseDefence {
    core: ManoeuvreCore,
}

impl ActiveBaseDefence {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
        }
    }

    /// A fresh patrol leg around the flag stand
    fn patrol_order(&mut self, ctx: &mut TeamCtx<'_>, entity: EntityId) -> Option<Order> {
        let centre = ctx.arena.flag_stand(ctx.team);
        let radius = ctx.config.base_alert_radius;
        let target = ctx
            .arena
            .random_unblocked_target_in_area(ctx.rng, centre, radius)?;
        Some(Order::move_to(
            ctx.new_order_id(),
            entity,
            target,
            OrderPriority::Medium,
        ))
    }

    /// Redirect everyone not already attacking onto the intruder
    fn intercept_intruder(&mut self, ctx: &mut TeamCtx<'_>) {
        let Some((enemy, position)) = ctx
            .knowledge
            .enemy_near(ctx.arena.flag_stand(ctx.team), ctx.config.base_alert_radius)
        else {
            return;
        };

        let idle: Vec<EntityId> = self
            .core
            .participants()
            .iter()
            .copied()
            .filter(|entity| {
                !matches!(
                    self.core.order_for(*entity).map(|o| o.kind),
                    Some(OrderKind::AttackEnemy { .. })
                )
            })
            .collect();
        for entity in idle {
            let order = Order::attack(
                ctx.new_order_id(),
                entity,
                enemy,
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

impl Default for ActiveBaseDefence {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for ActiveBaseDefence {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::ActiveBaseDefence
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
        let participants = self.core.participants().to_vec();
        for entity in participants {
            let Some(order) = self.patrol_order(ctx, entity) else {
                self.core.set_active(false);
                return Status::Failure;
            };
            if self.core.issue_order(ctx, order).is_err() {
                self.core.set_failed();
                return Status::Failure;
            }
        }
        // engage immediately if an intruder is already known
        self.intercept_intruder(ctx);
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
            // a finished leg (patrol or chase) flows into the next one
            Message::UpdateOrderState {
                entity,
                order_id,
                state: OrderState::Succeeded,
            } if self.core.order_for(*entity).map(|o| o.id) == Some(*order_id) => {
                let entity = *entity;
                if let Some(order) = self.patrol_order(ctx, entity) {
                    if self.core.issue_order(ctx, order).is_err() {
                        self.core.set_failed();
                    }
                }
                self.intercept_intruder(ctx);
            }
            Message::EnemySpotted { .. } | Message::UpdateEnemyPosition { .. } => {
                self.intercept_intruder(ctx);
            }
            Message::FlagPickedUp { flag_owner, .. } if *flag_owner == ctx.team => {
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
    use crate::core::types::Team;
    use crate::team::manoeuvres::testkit::CtxFixture;

    fn started(fixture: &mut CtxFixture) -> ActiveBaseDefence {
        let mut manoeuvre = ActiveBaseDefence::new();
        for id in fixture.own_ids() {
            manoeuvre.core_mut().add_participant(id);
        }
        manoeuvre.core_mut().set_active(true);
        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Running);
        manoeuvre
    }

    #[test]
    fn test_initiate_issues_patrol_moves() {
        let mut fixture = CtxFixture::new(2);
        let mut manoeuvre = started(&mut fixture);

        for id in fixture.own_ids() {
            assert!(matches!(
                manoeuvre.core_mut().order_for(id).map(|o| o.kind),
                Some(OrderKind::MoveToPosition { .. })
            ));
        }
    }

    #[test]
    fn test_known_intruder_draws_attack_orders() {
        let mut fixture = CtxFixture::new(2);
        let mut manoeuvre = started(&mut fixture);

        let intruder = fixture.enemy_ids()[0];
        let near_base = {
            let stand = fixture.arena.flag_stand(Team::Red);
            GridPos::new(stand.x + 2, stand.y)
        };
        fixture.knowledge.apply(&Message::EnemySpotted {
            spotter: fixture.own_ids()[0],
            enemy: intruder,
            position: near_base,
        });

        let spotter = fixture.own_ids()[0];
        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::EnemySpotted {
                spotter,
                enemy: intruder,
                position: near_base,
            },
        );

        for id in fixture.own_ids() {
            assert!(
                matches!(
                    manoeuvre.core_mut().order_for(id).map(|o| o.kind),
                    Some(OrderKind::AttackEnemy { target, .. }) if target == intruder
                ),
                "patrollers must be redirected onto the intruder"
            );
        }
    }

    #[test]
    fn test_patrol_continues_after_each_leg() {
        let mut fixture = CtxFixture::new(1);
        let mut manoeuvre = started(&mut fixture);
        let id = fixture.own_ids()[0];
        let first = manoeuvre.core_mut().order_for(id).map(|o| o.id).expect("order issued");

        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::UpdateOrderState {
                entity: id,
                order_id: first,
                state: OrderState::Succeeded,
            },
        );

        let second = manoeuvre.core_mut().order_for(id).map(|o| o.id).expect("follow-up issued");
        assert_ne!(first, second, "a fresh patrol leg replaces the finished one");
    }
}
