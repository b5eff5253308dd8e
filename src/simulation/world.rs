//! The shared simulation state every behaviour tree ticks against
//!
//! One concrete context type serves both tree levels: soldier trees read
//! `active_entity`, team trees read `active_team`, both set by the runner
//! just before the tick. Manoeuvres never see the world directly - they
//! run against the borrowed [`TeamCtx`] view built here.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arena::grid::GridPos;
use crate::arena::map::Arena;
use crate::comms::hub::{ActorId, MessageHub};
use crate::comms::message::Message;
use crate::core::config::SimulationConfig;
use crate::core::types::{EntityId, Team, Tick};
use crate::simulation::context::{FlagState, MatchState};
use crate::simulation::events::SimulationEvent;
use crate::soldier::state::Soldier;
use crate::team::manoeuvre::{Manoeuvre, ManoeuvreKind, TeamCtx};
use crate::team::team_ai::TeamState;

pub struct World {
    pub config: SimulationConfig,
    pub arena: Arena,
    pub soldiers: Vec<Soldier>,
    pub hub: MessageHub,
    pub rng: ChaCha8Rng,
    pub match_state: MatchState,
    pub teams: Vec<TeamState>,
    pub events: Vec<SimulationEvent>,
    pub tick: Tick,
    /// The soldier whose tree is being ticked right now
    pub active_entity: Option<EntityId>,
    /// The team whose tree is being ticked right now
    pub active_team: Option<Team>,
}

impl World {
    /// Assemble a fresh match: arena, spawned soldiers, registered
    /// mailboxes, team states
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        let arena = Arena::standard(config.arena_width, config.arena_height);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut hub = MessageHub::new();
        hub.register(ActorId::Context);

        let mut soldiers = Vec::new();
        for team in Team::both() {
            let spawns = arena.spawn_points(team).to_vec();
            for slot in 0..config.team_size {
                let spawn = spawns[slot % spawns.len()];
                let mut soldier = Soldier::new(team, spawn, config.max_health);
                // rng-derived ids keep same-seed runs byte-for-byte alike
                soldier.id = EntityId::from_rng(&mut rng);
                hub.register(ActorId::Soldier(soldier.id));
                soldiers.push(soldier);
            }
            hub.register(ActorId::TeamAi(team));
        }

        let match_state = MatchState::new(
            arena.flag_stand(Team::Red),
            arena.flag_stand(Team::Blue),
            config.match_duration,
        );

        let teams = Team::both()
            .into_iter()
            .map(|team| TeamState::new(team, &arena, &config))
            .collect();

        Self {
            config,
            arena,
            soldiers,
            hub,
            rng,
            match_state,
            teams,
            events: Vec::new(),
            tick: 0,
            active_entity: None,
            active_team: None,
        }
    }

    // --- soldier access ---

    pub fn soldier(&self, id: EntityId) -> Option<&Soldier> {
        self.soldiers.iter().find(|s| s.id == id)
    }

    pub fn soldier_mut(&mut self, id: EntityId) -> Option<&mut Soldier> {
        self.soldiers.iter_mut().find(|s| s.id == id)
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.soldier(id).is_some_and(|s| s.alive)
    }

    /// The soldier whose tree is currently ticking
    pub fn active_soldier(&self) -> Option<&Soldier> {
        self.active_entity.and_then(|id| self.soldier(id))
    }

    pub fn active_soldier_mut(&mut self) -> Option<&mut Soldier> {
        let id = self.active_entity?;
        self.soldier_mut(id)
    }

    // --- team access ---

    pub fn team_state(&self, team: Team) -> &TeamState {
        self.teams
            .iter()
            .find(|t| t.team == team)
            .expect("both teams created at world construction")
    }

    pub fn team_state_mut(&mut self, team: Team) -> &mut TeamState {
        self.teams
            .iter_mut()
            .find(|t| t.team == team)
            .expect("both teams created at world construction")
    }

    /// Run a closure against one manoeuvre and a team context built from
    /// split borrows of this world
    ///
    /// The manoeuvre is taken out of its roster slot for the duration so
    /// the context can borrow the rest of the team state.
    pub fn with_manoeuvre<R>(
        &mut self,
        team: Team,
        kind: ManoeuvreKind,
        f: impl FnOnce(&mut Box<dyn Manoeuvre>, &mut TeamCtx<'_>) -> R,
    ) -> Option<R> {
        let index = self.teams.iter().position(|t| t.team == team)?;
        let mut manoeuvre = self.teams[index].roster.take(kind)?;

        let result = {
            let state = &mut self.teams[index];
            let mut ctx = TeamCtx {
                team,
                config: &self.config,
                arena: &self.arena,
                knowledge: &state.knowledge,
                hub: &mut self.hub,
                order_ids: &mut state.order_ids,
                soldiers: &self.soldiers,
                rng: &mut self.rng,
            };
            f(&mut manoeuvre, &mut ctx)
        };

        self.teams[index].roster.put_back(manoeuvre);
        Some(result)
    }

    // --- combat ---

    /// Apply one shot; handles death, flag dropping and the resulting
    /// notifications
    pub fn apply_shot(&mut self, attacker: EntityId, target: EntityId) {
        let damage = self.config.shot_damage;
        let respawn_delay = self.config.respawn_delay;

        let Some(attacker_position) = self.soldier(attacker).map(|s| s.position) else {
            return;
        };

        let (victim_team, victim_position, carrying, died) = {
            let Some(victim) = self.soldier_mut(target) else {
                return;
            };
            if !victim.alive {
                return;
            }
            victim.health -= damage;
            let died = victim.health <= 0.0;
            let team = victim.team;
            let position = victim.position;
            let carrying = victim.carrying_flag;
            if died {
                victim.kill(respawn_delay);
            }
            (team, position, carrying, died)
        };

        let tick = self.tick;
        self.events.push(SimulationEvent::ShotFired {
            tick,
            attacker,
            target,
        });

        // the victim reports taking fire to its own team AI
        let report = Message::AttackedByEnemy {
            victim: target,
            attacker,
            attacker_position: Some(attacker_position),
        };
        if self
            .hub
            .send(ActorId::Soldier(target), ActorId::TeamAi(victim_team), report)
            .is_err()
        {
            tracing::warn!("attack report undeliverable");
        }

        if died {
            self.events.push(SimulationEvent::SoldierKilled {
                tick,
                team: victim_team,
                entity: target,
            });
            tracing::debug!(team = %victim_team, entity = %target.0, "soldier killed");

            if let Some(flag_owner) = carrying {
                self.match_state.flag_mut(flag_owner).state = FlagState::Dropped {
                    position: victim_position,
                };
                self.events.push(SimulationEvent::FlagDropped {
                    tick,
                    flag_owner,
                    position: victim_position,
                });
                self.broadcast_from_context(Message::FlagDropped {
                    flag_owner,
                    position: victim_position,
                });
            }

            self.broadcast_from_context(Message::EntityKilled {
                team: victim_team,
                entity: target,
            });
        }
    }

    // --- messaging helpers ---

    /// Broadcast a game-context notification to every team AI
    pub fn broadcast_from_context(&mut self, message: Message) {
        if self
            .hub
            .broadcast_to_teams(ActorId::Context, message)
            .is_err()
        {
            tracing::warn!("context broadcast undeliverable");
        }
    }

    /// A soldier reports something to its own team AI
    pub fn report_to_team_ai(&mut self, soldier: EntityId, team: Team, message: Message) {
        if self
            .hub
            .send(ActorId::Soldier(soldier), ActorId::TeamAi(team), message)
            .is_err()
        {
            tracing::warn!(soldier = %soldier.0, "report undeliverable");
        }
    }

    /// Current physical position of a flag (base, drop spot, or carrier)
    pub fn flag_position(&self, owner: Team) -> GridPos {
        crate::simulation::context::flag_position(self, owner)
    }
}
