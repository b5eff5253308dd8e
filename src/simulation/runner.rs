//! The frame loop

use crate::bt::behaviour::Node;
use crate::comms::hub::ActorId;
use crate::comms::message::Message;
use crate::comms::order::{Order, OrderState};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{EntityId, Team};
use crate::simulation::context;
use crate::simulation::events::SimulationEvent;
use crate::simulation::perception;
use crate::simulation::world::World;
use crate::soldier::state::ActiveOrder;
use crate::soldier::tree::build_soldier_tree;
use crate::team::tree::build_team_tree;

/// A complete match: the world plus every actor's behaviour tree
///
/// Frame order is fixed and host-controlled (single-threaded,
/// cooperative): clock, perception, respawns, soldier inboxes, soldier
/// trees, flag resolution, team trees, outbox cleanup.
pub struct Simulation {
    world: World,
    soldier_brains: Vec<(EntityId, Node<World>)>,
    team_brains: Vec<(Team, Node<World>)>,
}

impl Simulation {
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let world = World::new(config, seed);

        let soldier_brains = world
            .soldiers
            .iter()
            .map(|s| (s.id, build_soldier_tree()))
            .collect();
        let team_brains = Team::both()
            .into_iter()
            .map(|team| (team, build_team_tree()))
            .collect();

        Ok(Self {
            world,
            soldier_brains,
            team_brains,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn events(&self) -> &[SimulationEvent] {
        &self.world.events
    }

    pub fn is_finished(&self) -> bool {
        self.world.match_state.finished
    }

    pub fn score(&self, team: Team) -> u32 {
        self.world.match_state.score(team)
    }

    /// Advance the match one frame
    pub fn step(&mut self) {
        if self.is_finished() {
            return;
        }
        let dt = self.world.config.frame_delta;
        self.world.tick += 1;

        for soldier in &mut self.world.soldiers {
            if soldier.fire_cooldown > 0.0 {
                soldier.fire_cooldown -= dt;
            }
        }

        context::update_clock(&mut self.world, dt);
        perception::update_perception(&mut self.world);
        context::process_respawns(&mut self.world, dt);
        self.process_soldier_inboxes();

        // every entity tree ticks exactly once per frame, in spawn order
        for (id, tree) in &mut self.soldier_brains {
            if tree.status().is_terminal() {
                tree.reset();
            }
            self.world.active_entity = Some(*id);
            tree.tick(&mut self.world, dt);
        }
        self.world.active_entity = None;

        context::resolve_flags(&mut self.world);

        // then every team AI, red first
        for (team, tree) in &mut self.team_brains {
            if tree.status().is_terminal() {
                tree.reset();
            }
            self.world.active_team = Some(*team);
            tree.tick(&mut self.world, dt);
        }
        self.world.active_team = None;

        // reclaim fully-processed envelopes
        let ids: Vec<EntityId> = self.world.soldiers.iter().map(|s| s.id).collect();
        for id in ids {
            self.world.hub.sort_out_processed(ActorId::Soldier(id));
        }
        self.world.hub.sort_out_processed(ActorId::Context);
    }

    /// Run at most `frames` frames, stopping early when the match ends
    pub fn run(&mut self, frames: u64) {
        for _ in 0..frames {
            if self.is_finished() {
                break;
            }
            self.step();
        }
    }

    /// Soldiers consume their queued order traffic before their trees run
    fn process_soldier_inboxes(&mut self) {
        let ids: Vec<EntityId> = self.world.soldiers.iter().map(|s| s.id).collect();
        for id in ids {
            let messages = self.world.hub.drain_inbox(ActorId::Soldier(id));
            for message in messages {
                match message {
                    Message::FollowOrder { order } => {
                        self.handle_follow_order(id, order);
                    }
                    Message::CancelOrder { order_id } => {
                        if let Some(soldier) = self.world.soldier_mut(id) {
                            if soldier
                                .current_order
                                .map(|active| active.order.id == order_id)
                                .unwrap_or(false)
                            {
                                soldier.current_order = None;
                                soldier.path = None;
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    /// At most one order per soldier: a newcomer wins only on strictly
    /// higher priority, and every rejected or displaced order is
    /// reported Failed so its issuer can clean up
    fn handle_follow_order(&mut self, id: EntityId, order: Order) {
        let Some((team, alive, current)) = self
            .world
            .soldier(id)
            .map(|s| (s.team, s.alive, s.current_order))
        else {
            return;
        };

        if !alive {
            self.world.report_to_team_ai(
                id,
                team,
                Message::UpdateOrderState {
                    entity: id,
                    order_id: order.id,
                    state: OrderState::Failed,
                },
            );
            return;
        }

        match current {
            Some(active) if order.priority <= active.order.priority => {
                // the incumbent stands; bounce the newcomer
                self.world.report_to_team_ai(
                    id,
                    team,
                    Message::UpdateOrderState {
                        entity: id,
                        order_id: order.id,
                        state: OrderState::Failed,
                    },
                );
            }
            current => {
                if let Some(active) = current {
                    self.world.report_to_team_ai(
                        id,
                        team,
                        Message::UpdateOrderState {
                            entity: id,
                            order_id: active.order.id,
                            state: OrderState::Failed,
                        },
                    );
                }
                if let Some(soldier) = self.world.soldier_mut(id) {
                    soldier.current_order = Some(ActiveOrder::new(order));
                    soldier.path = None;
                }
            }
        }
    }
}
