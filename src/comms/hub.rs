//! Mailbox bookkeeping for every addressable actor
//!
//! The hub owns one mailbox per registered actor. Sending places a shared
//! envelope in the sender's outbox and the receiver's inbox queue; the
//! receiver drains its inbox FIFO once per frame, and the sender's cleanup
//! pass reclaims envelopes every receiver has processed. This is the
//! reference-counted lifetime the protocol needs, nothing more.

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use ahash::AHashMap;

use crate::comms::message::Message;
use crate::core::error::{FlagstormError, Result};
use crate::core::types::{EntityId, Team};

/// Address of anything that can hold a mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActorId {
    Soldier(EntityId),
    TeamAi(Team),
    Context,
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorId::Soldier(id) => write!(f, "soldier:{}", id.0),
            ActorId::TeamAi(team) => write!(f, "team_ai:{team}"),
            ActorId::Context => write!(f, "context"),
        }
    }
}

/// A message plus its delivery bookkeeping
///
/// `receivers` is fixed at send time; each receiver's drain bumps the
/// processed counter. Once the two are equal the sender may reclaim the
/// envelope.
#[derive(Debug)]
pub struct Envelope {
    pub sender: ActorId,
    pub message: Message,
    receivers: usize,
    processed: Cell<usize>,
}

impl Envelope {
    fn new(sender: ActorId, message: Message, receivers: usize) -> Self {
        Self {
            sender,
            message,
            receivers,
            processed: Cell::new(0),
        }
    }

    pub fn mark_processed(&self) {
        self.processed.set(self.processed.get() + 1);
    }

    /// Every receiver has consumed this envelope
    pub fn is_processed(&self) -> bool {
        self.processed.get() >= self.receivers
    }
}

#[derive(Debug, Default)]
struct Mailbox {
    inbox: VecDeque<Rc<Envelope>>,
    outbox: Vec<Rc<Envelope>>,
}

/// Registry of mailboxes, shared by the whole simulation
#[derive(Debug, Default)]
pub struct MessageHub {
    boxes: AHashMap<ActorId, Mailbox>,
}

impl MessageHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, actor: ActorId) {
        self.boxes.entry(actor).or_default();
    }

    pub fn unregister(&mut self, actor: ActorId) {
        self.boxes.remove(&actor);
    }

    pub fn is_registered(&self, actor: ActorId) -> bool {
        self.boxes.contains_key(&actor)
    }

    /// Queue a message for one receiver
    ///
    /// Fails when either endpoint has no mailbox; callers treat that as a
    /// fatal protocol error at initiation sites.
    pub fn send(&mut self, from: ActorId, to: ActorId, message: Message) -> Result<()> {
        if !self.boxes.contains_key(&from) {
            return Err(FlagstormError::UnknownReceiver(from.to_string()));
        }
        if !self.boxes.contains_key(&to) {
            return Err(FlagstormError::UnknownReceiver(to.to_string()));
        }

        tracing::trace!(%from, %to, kind = message.kind(), "message sent");
        let envelope = Rc::new(Envelope::new(from, message, 1));
        self.boxes
            .get_mut(&from)
            .expect("checked above")
            .outbox
            .push(envelope.clone());
        self.boxes
            .get_mut(&to)
            .expect("checked above")
            .inbox
            .push_back(envelope);
        Ok(())
    }

    /// Queue a message for every registered team AI
    ///
    /// One shared envelope serves all receivers; it is reclaimed only once
    /// each of them has drained it.
    pub fn broadcast_to_teams(&mut self, from: ActorId, message: Message) -> Result<()> {
        if !self.boxes.contains_key(&from) {
            return Err(FlagstormError::UnknownReceiver(from.to_string()));
        }

        let teams: Vec<ActorId> = self
            .boxes
            .keys()
            .filter(|actor| matches!(actor, ActorId::TeamAi(_)))
            .copied()
            .collect();
        if teams.is_empty() {
            return Ok(());
        }

        tracing::trace!(%from, kind = message.kind(), receivers = teams.len(), "broadcast");
        let envelope = Rc::new(Envelope::new(from, message, teams.len()));
        self.boxes
            .get_mut(&from)
            .expect("checked above")
            .outbox
            .push(envelope.clone());
        for team in teams {
            self.boxes
                .get_mut(&team)
                .expect("key collected from map")
                .inbox
                .push_back(envelope.clone());
        }
        Ok(())
    }

    /// Synchronous same-frame delivery: the event jumps the queue so the
    /// receiver sees it on its very next drain this frame
    pub fn send_event(&mut self, from: ActorId, to: ActorId, message: Message) -> Result<()> {
        if !self.boxes.contains_key(&from) {
            return Err(FlagstormError::UnknownReceiver(from.to_string()));
        }
        if !self.boxes.contains_key(&to) {
            return Err(FlagstormError::UnknownReceiver(to.to_string()));
        }

        let envelope = Rc::new(Envelope::new(from, message, 1));
        self.boxes
            .get_mut(&from)
            .expect("checked above")
            .outbox
            .push(envelope.clone());
        self.boxes
            .get_mut(&to)
            .expect("checked above")
            .inbox
            .push_front(envelope);
        Ok(())
    }

    /// Drain the actor's inbox fully, FIFO, marking every envelope
    /// processed; the returned messages are the actor's to handle
    pub fn drain_inbox(&mut self, actor: ActorId) -> Vec<Message> {
        let Some(mailbox) = self.boxes.get_mut(&actor) else {
            return Vec::new();
        };
        let mut drained = Vec::with_capacity(mailbox.inbox.len());
        while let Some(envelope) = mailbox.inbox.pop_front() {
            envelope.mark_processed();
            drained.push(envelope.message.clone());
        }
        drained
    }

    /// Reclaim this actor's fully-processed outbox envelopes
    pub fn sort_out_processed(&mut self, actor: ActorId) {
        if let Some(mailbox) = self.boxes.get_mut(&actor) {
            mailbox.outbox.retain(|envelope| !envelope.is_processed());
        }
    }

    /// Messages waiting in an actor's inbox
    pub fn pending(&self, actor: ActorId) -> usize {
        self.boxes.get(&actor).map_or(0, |b| b.inbox.len())
    }

    /// Envelopes the actor has sent and not yet reclaimed
    pub fn outstanding(&self, actor: ActorId) -> usize {
        self.boxes.get(&actor).map_or(0, |b| b.outbox.len())
    }
}
