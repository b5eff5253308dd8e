//! Composite behaviour nodes
//!
//! Composites control the execution flow of multiple child behaviours:
//! [`Sequence`] (AND logic), [`Selector`] (OR logic) and [`ActiveSelector`]
//! (OR logic with priority interruption). Children run in the fixed order
//! given at assembly time; a composite ticks its active child exactly once
//! per frame.

use crate::bt::behaviour::{Behaviour, Node};
use crate::bt::status::Status;

/// Runs children in order until one fails or yields
///
/// A child Success advances the cursor; Failure or Running is immediately
/// the sequence's own status. Reaching the end with all Successes yields
/// Success. The cursor rewinds to the first child when a new cycle starts.
pub struct Sequence<C> {
    children: Vec<Node<C>>,
    current: usize,
}

impl<C> Sequence<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self {
            children,
            current: 0,
        }
    }
}

impl<C> Behaviour<C> for Sequence<C> {
    fn name(&self) -> &str {
        "sequence"
    }

    fn on_initialise(&mut self, _ctx: &mut C) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Status {
        if self.children.is_empty() {
            return Status::Invalid;
        }

        while self.current < self.children.len() {
            match self.children[self.current].tick(ctx, dt) {
                Status::Success => self.current += 1,
                other => return other,
            }
        }
        Status::Success
    }

    fn abort_children(&mut self, ctx: &mut C) {
        if let Some(child) = self.children.get_mut(self.current) {
            child.abort(ctx);
        }
    }

    fn reset_children(&mut self) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }
}

/// Runs children in order until one succeeds or yields
///
/// Mirror image of [`Sequence`]: a child Success or Running is immediately
/// returned; Failure advances to the next child; exhausting all children
/// yields Failure.
pub struct Selector<C> {
    children: Vec<Node<C>>,
    current: usize,
}

impl<C> Selector<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self {
            children,
            current: 0,
        }
    }
}

impl<C> Behaviour<C> for Selector<C> {
    fn name(&self) -> &str {
        "selector"
    }

    fn on_initialise(&mut self, _ctx: &mut C) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Status {
        if self.children.is_empty() {
            return Status::Invalid;
        }

        while self.current < self.children.len() {
            match self.children[self.current].tick(ctx, dt) {
                Status::Failure => self.current += 1,
                other => return other,
            }
        }
        Status::Failure
    }

    fn abort_children(&mut self, ctx: &mut C) {
        if let Some(child) = self.children.get_mut(self.current) {
            child.abort(ctx);
        }
    }

    fn reset_children(&mut self) {
        self.current = 0;
        for child in &mut self.children {
            child.reset();
        }
    }
}

/// Selector that re-evaluates its children from the front every tick
///
/// Children earlier in the list are higher priority. If re-evaluation
/// picks a different child than the one left running last frame, the
/// displaced child is aborted, so in-progress low-priority work is
/// preempted cleanly instead of silently abandoned.
pub struct ActiveSelector<C> {
    children: Vec<Node<C>>,
    running: Option<usize>,
}

impl<C> ActiveSelector<C> {
    pub fn new(children: Vec<Node<C>>) -> Self {
        Self {
            children,
            running: None,
        }
    }
}

impl<C> Behaviour<C> for ActiveSelector<C> {
    fn name(&self) -> &str {
        "active_selector"
    }

    fn on_initialise(&mut self, _ctx: &mut C) {
        self.running = None;
        for child in &mut self.children {
            child.reset();
        }
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Status {
        if self.children.is_empty() {
            return Status::Invalid;
        }

        let previous = self.running;
        let mut chosen = None;
        let mut result = Status::Failure;

        for index in 0..self.children.len() {
            // Everything except the child left running last frame starts a
            // fresh cycle, giving every-tick re-evaluation semantics.
            if previous != Some(index) {
                self.children[index].reset();
            }
            let status = self.children[index].tick(ctx, dt);
            if status != Status::Failure {
                chosen = Some(index);
                result = status;
                break;
            }
        }

        // Preempt the displaced lower-priority child.
        if let Some(prev) = previous {
            if chosen != Some(prev) && self.children[prev].is_running() {
                self.children[prev].abort(ctx);
            }
        }

        self.running = if result.is_running() { chosen } else { None };
        result
    }

    fn abort_children(&mut self, ctx: &mut C) {
        if let Some(index) = self.running.take() {
            self.children[index].abort(ctx);
        }
    }

    fn reset_children(&mut self) {
        self.running = None;
        for child in &mut self.children {
            child.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bt::testkit::{event_log, terminated, updates, Scripted};

    #[test]
    fn test_empty_composites_report_invalid() {
        let mut sequence: Node<()> = Node::new(Box::new(Sequence::new(vec![])));
        let mut selector: Node<()> = Node::new(Box::new(Selector::new(vec![])));
        let mut active: Node<()> = Node::new(Box::new(ActiveSelector::new(vec![])));

        assert_eq!(sequence.tick(&mut (), 0.1), Status::Invalid);
        assert_eq!(selector.tick(&mut (), 0.1), Status::Invalid);
        assert_eq!(active.tick(&mut (), 0.1), Status::Invalid);
    }

    #[test]
    fn test_sequence_stops_at_first_failure() {
        let events = event_log();
        let mut sequence = Node::new(Box::new(Sequence::new(vec![
            Scripted::node("a", vec![Status::Success], &events),
            Scripted::node("b", vec![Status::Success], &events),
            Scripted::node("c", vec![Status::Failure], &events),
            Scripted::node("d", vec![Status::Success], &events),
        ])));

        assert_eq!(sequence.tick(&mut (), 0.1), Status::Failure);
        assert_eq!(updates(&events, "a"), 1);
        assert_eq!(updates(&events, "b"), 1);
        assert_eq!(updates(&events, "c"), 1);
        assert_eq!(updates(&events, "d"), 0, "children after the failure never run");
    }

    #[test]
    fn test_sequence_yields_on_running_child_and_resumes() {
        let events = event_log();
        let mut sequence = Node::new(Box::new(Sequence::new(vec![
            Scripted::node("a", vec![Status::Success], &events),
            Scripted::node("b", vec![Status::Running, Status::Success], &events),
            Scripted::node("c", vec![Status::Success], &events),
        ])));

        assert_eq!(sequence.tick(&mut (), 0.1), Status::Running);
        assert_eq!(sequence.tick(&mut (), 0.1), Status::Success);
        // the resumed tick must not re-run the already-succeeded first child
        assert_eq!(updates(&events, "a"), 1);
        assert_eq!(updates(&events, "b"), 2);
        assert_eq!(updates(&events, "c"), 1);
    }

    #[test]
    fn test_selector_returns_first_success() {
        let events = event_log();
        let mut selector = Node::new(Box::new(Selector::new(vec![
            Scripted::node("a", vec![Status::Failure], &events),
            Scripted::node("b", vec![Status::Success], &events),
            Scripted::node("c", vec![Status::Failure], &events),
        ])));

        assert_eq!(selector.tick(&mut (), 0.1), Status::Success);
        assert_eq!(updates(&events, "a"), 1);
        assert_eq!(updates(&events, "b"), 1);
        assert_eq!(updates(&events, "c"), 0, "selection short-circuits");
    }

    #[test]
    fn test_selector_fails_when_all_children_fail() {
        let events = event_log();
        let mut selector = Node::new(Box::new(Selector::new(vec![
            Scripted::node("a", vec![Status::Failure], &events),
            Scripted::node("b", vec![Status::Failure], &events),
        ])));

        assert_eq!(selector.tick(&mut (), 0.1), Status::Failure);
    }

    #[test]
    fn test_active_selector_aborts_displaced_child() {
        let events = event_log();
        // b (low priority) runs first because a starts out failing; on the
        // second tick a becomes executable and must preempt b.
        let mut active = Node::new(Box::new(ActiveSelector::new(vec![
            Scripted::persistent_node("a", vec![Status::Failure, Status::Running], &events),
            Scripted::node("b", vec![Status::Running], &events),
        ])));

        assert_eq!(active.tick(&mut (), 0.1), Status::Running);
        assert!(!terminated(&events, "b"));

        assert_eq!(active.tick(&mut (), 0.1), Status::Running);
        assert!(
            events.borrow().iter().any(|e| e == "b:terminate:Failure"),
            "displaced low-priority child must be aborted"
        );
    }

    #[test]
    fn test_active_selector_reevaluates_higher_priority_every_tick() {
        let events = event_log();
        let mut active = Node::new(Box::new(ActiveSelector::new(vec![
            Scripted::node("a", vec![Status::Failure], &events),
            Scripted::node("b", vec![Status::Running], &events),
        ])));

        active.tick(&mut (), 0.1);
        active.tick(&mut (), 0.1);
        active.tick(&mut (), 0.1);

        assert_eq!(updates(&events, "a"), 3, "guard is re-checked every tick");
        assert_eq!(updates(&events, "b"), 3);
    }

    #[test]
    fn test_active_selector_keeps_running_child_without_reinit() {
        let events = event_log();
        let mut active = Node::new(Box::new(ActiveSelector::new(vec![Scripted::node(
            "a",
            vec![Status::Running, Status::Running, Status::Success],
            &events,
        )])));

        active.tick(&mut (), 0.1);
        active.tick(&mut (), 0.1);
        assert_eq!(active.tick(&mut (), 0.1), Status::Success);

        assert_eq!(
            events
                .borrow()
                .iter()
                .filter(|e| *e == "a:init")
                .count(),
            1,
            "the running child continues its cycle across ticks"
        );
    }
}
