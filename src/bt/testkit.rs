//! Shared scripted leaves for engine unit tests

use std::cell::RefCell;
use std::rc::Rc;

use crate::bt::behaviour::{Behaviour, Node};
use crate::bt::status::Status;

pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Leaf that replays a scripted status sequence and records its lifecycle
///
/// The final scripted status repeats once the script is exhausted; a reset
/// (via `on_initialise`) rewinds the script.
pub struct Scripted {
    results: Vec<Status>,
    cursor: usize,
    persistent: bool,
    log: EventLog,
    tag: &'static str,
}

impl Scripted {
    pub fn new(tag: &'static str, results: Vec<Status>, log: EventLog) -> Self {
        assert!(!results.is_empty(), "scripted leaf needs at least one status");
        Self {
            results,
            cursor: 0,
            persistent: false,
            log,
            tag,
        }
    }

    pub fn node(tag: &'static str, results: Vec<Status>, log: &EventLog) -> Node<()> {
        Node::new(Box::new(Self::new(tag, results, log.clone())))
    }

    /// Like [`Scripted::node`], but the script survives resets - the leaf
    /// behaves like a condition reading external state that changes over
    /// the course of the test.
    pub fn persistent_node(tag: &'static str, results: Vec<Status>, log: &EventLog) -> Node<()> {
        let mut scripted = Self::new(tag, results, log.clone());
        scripted.persistent = true;
        Node::new(Box::new(scripted))
    }
}

impl Behaviour<()> for Scripted {
    fn name(&self) -> &str {
        self.tag
    }

    fn on_initialise(&mut self, _ctx: &mut ()) {
        if !self.persistent {
            self.cursor = 0;
        }
        self.log.borrow_mut().push(format!("{}:init", self.tag));
    }

    fn update(&mut self, _ctx: &mut (), _dt: f32) -> Status {
        let status = self.results[self.cursor.min(self.results.len() - 1)];
        self.cursor += 1;
        self.log.borrow_mut().push(format!("{}:update", self.tag));
        status
    }

    fn on_terminate(&mut self, _ctx: &mut (), status: Status) {
        self.log
            .borrow_mut()
            .push(format!("{}:terminate:{:?}", self.tag, status));
    }
}

/// Count how many times a tag's update ran
pub fn updates(log: &EventLog, tag: &str) -> usize {
    log.borrow()
        .iter()
        .filter(|e| *e == &format!("{tag}:update"))
        .count()
}

/// Whether a tag's on_terminate ran at all
pub fn terminated(log: &EventLog, tag: &str) -> bool {
    log.borrow()
        .iter()
        .any(|e| e.starts_with(&format!("{tag}:terminate")))
}
