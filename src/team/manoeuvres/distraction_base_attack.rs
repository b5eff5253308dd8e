//! Draw the defence to one entrance while a capture group slips in

use ahash::AHashSet;

use crate::arena::grid::GridPos;
use crate::bt::status::Status;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderPriority, OrderState};
use crate::core::types::EntityId;
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreCore, ManoeuvreKind, TeamCtx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Assemble,
    Attack,
}

/// The larger half of the squad makes noise at the first enemy entrance;
/// the rest assemble at the staging point farthest from it and go for the
/// flag once assembled (or once the wait timer gives up on stragglers).
pub struct DistractionBaseAttack {
    core: ManoeuvreCore,
    phase: Phase,
    distraction_group: Vec<EntityId>,
    capture_group: Vec<EntityId>,
    distraction_point: GridPos,
    capture_staging: GridPos,
    arrived: AHashSet<EntityId>,
    wait_timer: f32,
}

impl DistractionBaseAttack {
    pub fn new() -> Self {
        Self {
            core: ManoeuvreCore::new(),
            phase: Phase::Assemble,
            distraction_group: Vec::new(),
            capture_group: Vec::new(),
            distraction_point: GridPos::default(),
            capture_staging: GridPos::default(),
            arrived: AHashSet::new(),
            wait_timer: 0.0,
        }
    }

    fn start_attack(&mut self, ctx: &mut TeamCtx<'_>) {
        if self.phase == Phase::Attack {
            return;
        }
        self.phase = Phase::Attack;
        tracing::debug!(team = %ctx.team, "capture group committed");

        let target = ctx.knowledge.enemy_flag.position;
        let capture = self.capture_group.clone();
        for entity in capture {
            if !self.core.is_participant(entity) {
                continue;
            }
            let order = Order::move_to(ctx.new_order_id(), entity, target, OrderPriority::High);
            if self.core.issue_order(ctx, order).is_err() {
                self.core.set_failed();
                return;
            }
        }
    }

    /// All surviving capture-group members are in position
    fn capture_group_assembled(&self) -> bool {
        let live: Vec<&EntityId> = self
            .capture_group
            .iter()
            .filter(|e| self.core.is_participant(**e))
            .collect();
        !live.is_empty() && live.iter().all(|e| self.arrived.contains(e))
    }
}

impl Default for DistractionBaseAttack {
    fn default() -> Self {
        Self::new()
    }
}

impl Manoeuvre for DistractionBaseAttack {
    fn kind(&self) -> ManoeuvreKind {
        ManoeuvreKind::DistractionBaseAttack
    }

    fn min_participants(&self) -> usize {
        3
    }

    fn max_participants(&self) -> usize {
        5
    }

    fn core(&self) -> &ManoeuvreCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ManoeuvreCore {
        &mut self.core
    }

    fn initiate(&mut self, ctx: &mut TeamCtx<'_>) -> Status {
        let enemy = ctx.team.opponent();
        let entrances = ctx.arena.base_entrances(enemy).to_vec();
        let staging = ctx.arena.attack_positions(enemy).to_vec();
        if entrances.is_empty() || staging.is_empty() {
            self.core.set_active(false);
            return Status::Failure;
        }

        self.distraction_point = entrances[0];
        // stage the capture group as far from the noise as possible
        self.capture_staging = staging
            .iter()
            .copied()
            .max_by_key(|p| ordered_float::OrderedFloat(p.distance(&self.distraction_point)))
            .unwrap_or(staging[0]);

        let participants = self.core.participants().to_vec();
        let split = participants.len() / 2 + participants.len() % 2;
        self.distraction_group = participants[..split].to_vec();
        self.capture_group = participants[split..].to_vec();
        self.phase = Phase::Assemble;
        self.arrived.clear();
        self.wait_timer = ctx.config.wait_for_participants_interval;

        for entity in self.distraction_group.clone() {
            let order = Order::move_to(
                ctx.new_order_id(),
                entity,
                self.distraction_point,
                OrderPriority::Medium,
            );
            if self.core.issue_order(ctx, order).is_err() {
                self.core.set_failed();
                return Status::Failure;
            }
        }
        for entity in self.capture_group.clone() {
            let order = Order::move_to(
                ctx.new_order_id(),
                entity,
                self.capture_staging,
                OrderPriority::Medium,
            );
            if self.core.issue_order(ctx, order).is_err() {
                self.core.set_failed();
                return Status::Failure;
            }
        }
        Status::Running
    }

    fn update(&mut self, ctx: &mut TeamCtx<'_>, dt: f32) -> Status {
        if self.core.is_active() && self.phase == Phase::Assemble {
            self.wait_timer -= dt;
            if self.wait_timer <= 0.0 || self.capture_group_assembled() {
                self.start_attack(ctx);
            }
        }
        self.core.evaluate(self.min_participants())
    }

    fn process_message(&mut self, ctx: &mut TeamCtx<'_>, message: &Message) {
        if self.core.handle_common_message(ctx, message) {
            if let Message::EntityKilled { entity, .. }
            | Message::UpdateOrderState { entity, .. } = message
            {
                self.arrived.remove(entity);
            }
            if self.phase == Phase::Assemble && self.capture_group_assembled() {
                self.start_attack(ctx);
            }
            return;
        }

        match message {
            Message::UpdateOrderState {
                entity,
                order_id,
                state: OrderState::Succeeded,
            } if self.core.order_for(*entity).map(|o| o.id) == Some(*order_id) => {
                let entity = *entity;
                if self.distraction_group.contains(&entity) {
                    // in position: hold the entrance and soak attention
                    let position = self
                        .core
                        .order_for(entity)
                        .map(|o| o.target_position())
                        .unwrap_or(self.distraction_point);
                    let order = Order::defend(
                        ctx.new_order_id(),
                        entity,
                        position,
                        OrderPriority::Medium,
                    );
                    if self.core.issue_order(ctx, order).is_err() {
                        self.core.set_failed();
                    }
                } else if self.phase == Phase::Assemble {
                    self.arrived.insert(entity);
                    if self.capture_group_assembled() {
                        self.start_attack(ctx);
                    }
                }
            }
            Message::FlagPickedUp { flag_owner, .. } if *flag_owner != ctx.team => {
                self.core.set_succeeded();
            }
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.core.reset();
        self.phase = Phase::Assemble;
        self.distraction_group.clear();
        self.capture_group.clear();
        self.arrived.clear();
        self.wait_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comms::order::OrderKind;
    use crate::core::types::Team;
    use crate::team::manoeuvres::testkit::CtxFixture;

    fn started(fixture: &mut CtxFixture, count: usize) -> DistractionBaseAttack {
        let mut manoeuvre = DistractionBaseAttack::new();
        for id in fixture.own_ids().into_iter().take(count) {
            manoeuvre.core_mut().add_participant(id);
        }
        manoeuvre.core_mut().set_active(true);
        assert_eq!(manoeuvre.initiate(&mut fixture.ctx()), Status::Running);
        manoeuvre
    }

    #[test]
    fn test_split_majority_distracts() {
        let mut fixture = CtxFixture::new(5);
        let manoeuvre = started(&mut fixture, 5);

        assert_eq!(manoeuvre.distraction_group.len(), 3);
        assert_eq!(manoeuvre.capture_group.len(), 2);

        // the two groups head to different places
        let distraction_dest = manoeuvre
            .core()
            .order_for(manoeuvre.distraction_group[0])
            .map(|o| o.target_position());
        let capture_dest = manoeuvre
            .core()
            .order_for(manoeuvre.capture_group[0])
            .map(|o| o.target_position());
        assert_ne!(distraction_dest, capture_dest);
    }

    #[test]
    fn test_capture_group_assembly_launches_attack() {
        let mut fixture = CtxFixture::new(4);
        let mut manoeuvre = started(&mut fixture, 4);
        let capture = manoeuvre.capture_group.clone();

        for entity in capture.clone() {
            let order_id = manoeuvre
                .core()
                .order_for(entity)
                .map(|o| o.id)
                .expect("staging order");
            manoeuvre.process_message(
                &mut fixture.ctx(),
                &Message::UpdateOrderState {
                    entity,
                    order_id,
                    state: OrderState::Succeeded,
                },
            );
        }

        let flag = fixture.arena.flag_stand(Team::Blue);
        for entity in capture {
            assert_eq!(
                manoeuvre.core().order_for(entity).map(|o| o.target_position()),
                Some(flag),
                "assembled capture group must commit to the flag"
            );
        }
    }

    #[test]
    fn test_distraction_arrival_turns_into_holding() {
        let mut fixture = CtxFixture::new(4);
        let mut manoeuvre = started(&mut fixture, 4);
        let noisy = manoeuvre.distraction_group[0];

        let order_id = manoeuvre
            .core()
            .order_for(noisy)
            .map(|o| o.id)
            .expect("distraction move order");
        manoeuvre.process_message(
            &mut fixture.ctx(),
            &Message::UpdateOrderState {
                entity: noisy,
                order_id,
                state: OrderState::Succeeded,
            },
        );

        assert!(matches!(
            manoeuvre.core().order_for(noisy).map(|o| o.kind),
            Some(OrderKind::DefendPosition { .. })
        ));
    }

    #[test]
    fn test_timer_commits_capture_group() {
        let mut fixture = CtxFixture::new(4);
        let mut manoeuvre = started(&mut fixture, 4);
        let interval = fixture.config.wait_for_participants_interval;

        let steps = (interval / 0.5).ceil() as usize + 1;
        for _ in 0..steps {
            manoeuvre.update(&mut fixture.ctx(), 0.5);
        }

        let flag = fixture.arena.flag_stand(Team::Blue);
        for entity in manoeuvre.capture_group.clone() {
            assert_eq!(
                manoeuvre.core().order_for(entity).map(|o| o.target_position()),
                Some(flag)
            );
        }
    }
}
