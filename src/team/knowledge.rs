//! Team belief store, fed exclusively by inbound messages
//!
//! Knowledge is what the team has been told, not ground truth: a record's
//! last known position can be stale, and a flag belief lags the real flag
//! by however long the message sat in the inbox.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::arena::grid::GridPos;
use crate::comms::message::Message;
use crate::core::types::{EntityId, Team};

/// What the team knows about one enemy soldier
///
/// Created on the first sighting, kept (with a stale position) after all
/// spotters lose contact, removed only when the enemy is reported killed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyRecord {
    pub last_position: GridPos,
    pub spotters: AHashSet<EntityId>,
}

/// Believed state of one flag
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FlagBelief {
    InBase,
    Stolen { carrier: EntityId },
    Dropped { position: GridPos },
}

/// Belief about one flag plus the positions that go with it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlagKnowledge {
    pub owner: Team,
    pub belief: FlagBelief,
    /// Best known current position of the flag
    pub position: GridPos,
    /// Where the flag rests when home
    pub base_position: GridPos,
}

impl FlagKnowledge {
    pub fn at_base(owner: Team, base_position: GridPos) -> Self {
        Self {
            owner,
            belief: FlagBelief::InBase,
            position: base_position,
            base_position,
        }
    }

    pub fn is_in_base(&self) -> bool {
        matches!(self.belief, FlagBelief::InBase)
    }

    pub fn is_stolen(&self) -> bool {
        matches!(self.belief, FlagBelief::Stolen { .. })
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self.belief, FlagBelief::Dropped { .. })
    }

    pub fn carrier(&self) -> Option<EntityId> {
        match self.belief {
            FlagBelief::Stolen { carrier } => Some(carrier),
            _ => None,
        }
    }
}

/// Everything one team AI believes about the match
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamKnowledge {
    pub team: Team,
    pub enemies: AHashMap<EntityId, EnemyRecord>,
    pub own_flag: FlagKnowledge,
    pub enemy_flag: FlagKnowledge,
    pub own_score: u32,
    pub enemy_score: u32,
    pub time_remaining: f32,
}

impl TeamKnowledge {
    pub fn new(
        team: Team,
        own_flag_base: GridPos,
        enemy_flag_base: GridPos,
        match_duration: f32,
    ) -> Self {
        Self {
            team,
            enemies: AHashMap::new(),
            own_flag: FlagKnowledge::at_base(team, own_flag_base),
            enemy_flag: FlagKnowledge::at_base(team.opponent(), enemy_flag_base),
            own_score: 0,
            enemy_score: 0,
            time_remaining: match_duration,
        }
    }

    fn flag_mut(&mut self, owner: Team) -> &mut FlagKnowledge {
        if owner == self.team {
            &mut self.own_flag
        } else {
            &mut self.enemy_flag
        }
    }

    /// Fold one inbound message into the belief store
    pub fn apply(&mut self, message: &Message) {
        match message {
            Message::EnemySpotted {
                spotter,
                enemy,
                position,
            } => {
                let record = self.enemies.entry(*enemy).or_insert_with(|| EnemyRecord {
                    last_position: *position,
                    spotters: AHashSet::new(),
                });
                record.last_position = *position;
                record.spotters.insert(*spotter);
            }
            Message::UpdateEnemyPosition { enemy, position } => {
                if let Some(record) = self.enemies.get_mut(enemy) {
                    record.last_position = *position;
                }
            }
            Message::LostSightOfEnemy { spotter, enemy } => {
                if let Some(record) = self.enemies.get_mut(enemy) {
                    record.spotters.remove(spotter);
                }
            }
            Message::AttackedByEnemy {
                attacker,
                attacker_position: Some(position),
                ..
            } => {
                let record = self.enemies.entry(*attacker).or_insert_with(|| EnemyRecord {
                    last_position: *position,
                    spotters: AHashSet::new(),
                });
                record.last_position = *position;
            }
            Message::EntityKilled { team, entity } => {
                if *team != self.team {
                    self.enemies.remove(entity);
                }
            }
            Message::FlagPickedUp { flag_owner, carrier } => {
                let flag = self.flag_mut(*flag_owner);
                flag.belief = FlagBelief::Stolen { carrier: *carrier };
            }
            Message::FlagDropped { flag_owner, position } => {
                let flag = self.flag_mut(*flag_owner);
                flag.belief = FlagBelief::Dropped {
                    position: *position,
                };
                flag.position = *position;
            }
            Message::FlagReturned { flag_owner } => {
                let flag = self.flag_mut(*flag_owner);
                flag.belief = FlagBelief::InBase;
                flag.position = flag.base_position;
            }
            Message::ScoreUpdate { team, score } => {
                if *team == self.team {
                    self.own_score = *score;
                } else {
                    self.enemy_score = *score;
                }
            }
            Message::TimeUpdate { remaining } => {
                self.time_remaining = *remaining;
            }
            _ => {}
        }
    }

    /// The known enemy closest to `pos` within `radius`, if any;
    /// distance ties break on id so the answer is stable
    pub fn enemy_near(&self, pos: GridPos, radius: f32) -> Option<(EntityId, GridPos)> {
        self.enemies
            .iter()
            .filter(|(_, record)| pos.distance(&record.last_position) <= radius)
            .min_by_key(|(id, record)| {
                (
                    ordered_float::OrderedFloat(pos.distance(&record.last_position)),
                    **id,
                )
            })
            .map(|(id, record)| (*id, record.last_position))
    }
}
