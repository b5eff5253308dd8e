//! Parallel execution of child behaviours within one cooperative tick
//!
//! [`Parallel`] ticks every non-terminated child each frame and combines
//! their results through two independent policies. [`Monitor`] is the
//! conditions-guard-actions preset built on top of it.

use crate::bt::behaviour::{Behaviour, Node};
use crate::bt::status::Status;

/// How many children must reach a status before the parallel adopts it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// A single child reaching the status completes the parallel
    RequireOne,
    /// Every child must reach the status
    RequireAll,
}

/// Ticks all non-terminated children every frame, in child order
///
/// Success and failure are judged by independent policies. When the
/// parallel terminates, any children still running are aborted so no
/// orphaned work survives the node.
pub struct Parallel<C> {
    children: Vec<Node<C>>,
    success_policy: Policy,
    failure_policy: Policy,
}

impl<C> Parallel<C> {
    pub fn new(success_policy: Policy, failure_policy: Policy, children: Vec<Node<C>>) -> Self {
        Self {
            children,
            success_policy,
            failure_policy,
        }
    }

    pub(crate) fn push_front(&mut self, child: Node<C>) {
        self.children.insert(0, child);
    }

    pub(crate) fn push_back(&mut self, child: Node<C>) {
        self.children.push(child);
    }

    /// Abort every still-running child before reporting a terminal status
    fn finish(&mut self, ctx: &mut C, status: Status) -> Status {
        for child in &mut self.children {
            child.abort(ctx);
        }
        status
    }
}

impl<C> Behaviour<C> for Parallel<C> {
    fn name(&self) -> &str {
        "parallel"
    }

    fn on_initialise(&mut self, _ctx: &mut C) {
        for child in &mut self.children {
            child.reset();
        }
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Status {
        if self.children.is_empty() {
            return Status::Invalid;
        }

        let mut successes = 0;
        let mut failures = 0;

        for index in 0..self.children.len() {
            match self.children[index].status() {
                // Failure latches so RequireAll can count it across frames
                Status::Failure => {}
                // Success is re-evaluated every frame; this is what makes
                // monitor conditions live guards rather than one-shot checks
                Status::Success => {
                    self.children[index].reset();
                    self.children[index].tick(ctx, dt);
                }
                _ => {
                    self.children[index].tick(ctx, dt);
                }
            }

            match self.children[index].status() {
                Status::Success => {
                    successes += 1;
                    if self.success_policy == Policy::RequireOne {
                        return self.finish(ctx, Status::Success);
                    }
                }
                Status::Failure => {
                    failures += 1;
                    if self.failure_policy == Policy::RequireOne {
                        return self.finish(ctx, Status::Failure);
                    }
                }
                _ => {}
            }
        }

        if self.success_policy == Policy::RequireAll && successes == self.children.len() {
            return Status::Success;
        }
        if self.failure_policy == Policy::RequireAll && failures == self.children.len() {
            return Status::Failure;
        }
        Status::Running
    }

    fn abort_children(&mut self, ctx: &mut C) {
        for child in &mut self.children {
            child.abort(ctx);
        }
    }

    fn reset_children(&mut self) {
        for child in &mut self.children {
            child.reset();
        }
    }
}

/// Conditions-guard-actions parallel
///
/// A parallel preset with `success = RequireAll`, `failure = RequireOne`.
/// Conditions are inserted at the front of the child list so they are
/// re-checked first every tick; actions are appended at the back. Any
/// condition failing fails the whole monitor immediately, aborting the
/// in-progress action.
pub struct Monitor<C> {
    inner: Parallel<C>,
}

impl<C> Monitor<C> {
    pub fn new() -> Self {
        Self {
            inner: Parallel::new(Policy::RequireAll, Policy::RequireOne, Vec::new()),
        }
    }

    /// Guard re-checked before the actions every tick
    pub fn add_condition(&mut self, condition: Node<C>) {
        self.inner.push_front(condition);
    }

    /// Work protected by the conditions
    pub fn add_action(&mut self, action: Node<C>) {
        self.inner.push_back(action);
    }

    pub fn with_condition(mut self, condition: Node<C>) -> Self {
        self.add_condition(condition);
        self
    }

    pub fn with_action(mut self, action: Node<C>) -> Self {
        self.add_action(action);
        self
    }
}

impl<C> Default for Monitor<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Behaviour<C> for Monitor<C> {
    fn name(&self) -> &str {
        "monitor"
    }

    fn on_initialise(&mut self, ctx: &mut C) {
        self.inner.on_initialise(ctx);
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Status {
        self.inner.update(ctx, dt)
    }

    fn abort_children(&mut self, ctx: &mut C) {
        self.inner.abort_children(ctx);
    }

    fn reset_children(&mut self) {
        self.inner.reset_children();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bt::testkit::{event_log, terminated, updates, Scripted};

    #[test]
    fn test_empty_parallel_reports_invalid() {
        let mut parallel: Node<()> = Node::new(Box::new(Parallel::new(
            Policy::RequireOne,
            Policy::RequireAll,
            vec![],
        )));
        assert_eq!(parallel.tick(&mut (), 0.1), Status::Invalid);
    }

    #[test]
    fn test_require_one_success_completes_same_tick() {
        let events = event_log();
        let mut parallel = Node::new(Box::new(Parallel::new(
            Policy::RequireOne,
            Policy::RequireAll,
            vec![
                Scripted::node("a", vec![Status::Success], &events),
                Scripted::node("b", vec![Status::Running], &events),
            ],
        )));

        assert_eq!(parallel.tick(&mut (), 0.1), Status::Success);
    }

    #[test]
    fn test_require_one_success_aborts_running_siblings() {
        let events = event_log();
        let mut parallel = Node::new(Box::new(Parallel::new(
            Policy::RequireOne,
            Policy::RequireAll,
            vec![
                Scripted::node("slow", vec![Status::Running, Status::Success], &events),
                Scripted::node("fast", vec![Status::Running, Status::Success], &events),
            ],
        )));

        assert_eq!(parallel.tick(&mut (), 0.1), Status::Running);
        assert_eq!(parallel.tick(&mut (), 0.1), Status::Success);
        // "slow" succeeded first by child order; "fast" was still running
        // at that moment and must have been aborted
        assert!(terminated(&events, "fast"));
    }

    #[test]
    fn test_require_all_failure_waits_for_every_child() {
        let events = event_log();
        let mut parallel = Node::new(Box::new(Parallel::new(
            Policy::RequireOne,
            Policy::RequireAll,
            vec![
                Scripted::node("a", vec![Status::Failure], &events),
                Scripted::node("b", vec![Status::Running, Status::Running, Status::Failure], &events),
            ],
        )));

        assert_eq!(parallel.tick(&mut (), 0.1), Status::Running);
        assert_eq!(parallel.tick(&mut (), 0.1), Status::Running);
        assert_eq!(parallel.tick(&mut (), 0.1), Status::Failure);
        // the already-failed child is not re-ticked while the rest finish
        assert_eq!(updates(&events, "a"), 1);
    }

    #[test]
    fn test_monitor_condition_failure_preempts_action() {
        let events = event_log();
        let mut monitor = Monitor::new();
        monitor.add_action(Scripted::node("act", vec![Status::Running], &events));
        monitor.add_condition(Scripted::persistent_node(
            "cond",
            vec![Status::Success, Status::Failure],
            &events,
        ));
        let mut monitor = Node::new(Box::new(monitor));

        assert_eq!(monitor.tick(&mut (), 0.1), Status::Running);
        assert_eq!(monitor.tick(&mut (), 0.1), Status::Failure);
        assert!(
            terminated(&events, "act"),
            "failing guard must abort the in-progress action"
        );
    }

    #[test]
    fn test_monitor_checks_conditions_before_actions() {
        let events = event_log();
        let mut monitor = Monitor::new();
        monitor.add_action(Scripted::node("act", vec![Status::Running], &events));
        monitor.add_condition(Scripted::node("cond", vec![Status::Failure], &events));
        let mut monitor = Node::new(Box::new(monitor));

        assert_eq!(monitor.tick(&mut (), 0.1), Status::Failure);
        assert_eq!(
            updates(&events, "act"),
            0,
            "the action never starts under a failing guard"
        );
    }
}
