//! Core behaviour trait and the node wrapper driving the tick protocol
//!
//! [`Behaviour`] is the unit of work; [`Node`] owns a boxed behaviour plus
//! its cached status and enforces the lifecycle: `on_initialise` on the
//! first tick, `update` every tick, `on_terminate` when the result is
//! terminal. The engine is generic over its tick context `C`; the game
//! instantiates it with the simulation world for both tree levels.

use crate::bt::status::Status;

/// A behaviour tree node body, generic over its tick context
///
/// `update` is the only required method; the lifecycle hooks default to
/// no-ops. Composite behaviours additionally override the two recursion
/// hooks so aborts and resets reach their children.
pub trait Behaviour<C> {
    /// Identity used in trace logging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Called once before the first `update` of a cycle
    fn on_initialise(&mut self, _ctx: &mut C) {}

    /// Compute this frame's status
    fn update(&mut self, ctx: &mut C, dt: f32) -> Status;

    /// Called when `update` returns a terminal status, or on abort
    fn on_terminate(&mut self, _ctx: &mut C, _status: Status) {}

    /// Abort any still-running children (composites only)
    fn abort_children(&mut self, _ctx: &mut C) {}

    /// Return any child state to pristine (composites only)
    fn reset_children(&mut self) {}
}

/// An owned behaviour plus its cached status
///
/// Trees are assembled from `Node`s; each composite exclusively owns its
/// child nodes, so the tree is a plain ownership hierarchy with no sharing.
pub struct Node<C> {
    behaviour: Box<dyn Behaviour<C>>,
    status: Status,
}

impl<C> Node<C> {
    pub fn new(behaviour: Box<dyn Behaviour<C>>) -> Self {
        Self {
            behaviour,
            status: Status::Invalid,
        }
    }

    /// Status cached from the most recent tick (Invalid before the first)
    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    pub fn name(&self) -> &str {
        self.behaviour.name()
    }

    /// Advance the behaviour one frame
    ///
    /// On the first tick of a cycle (status Invalid) `on_initialise` runs
    /// first; `update` always runs; a terminal result triggers
    /// `on_terminate`. The returned status is cached on the node.
    pub fn tick(&mut self, ctx: &mut C, dt: f32) -> Status {
        if self.status == Status::Invalid {
            self.behaviour.on_initialise(ctx);
        }

        let status = self.behaviour.update(ctx, dt);

        if status.is_terminal() {
            self.behaviour.on_terminate(ctx, status);
        }

        if status != self.status {
            tracing::trace!(node = self.behaviour.name(), ?status, "node transition");
        }
        self.status = status;
        status
    }

    /// Force immediate termination of a running subtree
    ///
    /// Running children are aborted depth-first, then this behaviour's
    /// `on_terminate` runs with Failure. A node that is not running is
    /// left untouched.
    pub fn abort(&mut self, ctx: &mut C) {
        if self.status != Status::Running {
            return;
        }
        self.behaviour.abort_children(ctx);
        self.behaviour.on_terminate(ctx, Status::Failure);
        self.status = Status::Failure;
        tracing::trace!(node = self.behaviour.name(), "node aborted");
    }

    /// Return the whole subtree to Invalid so the next tick starts a
    /// fresh cycle
    pub fn reset(&mut self) {
        self.behaviour.reset_children();
        self.status = Status::Invalid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bt::testkit::{event_log, Scripted};

    #[test]
    fn test_initialise_runs_only_on_first_tick() {
        let events = event_log();
        let mut node = Scripted::node(
            "a",
            vec![Status::Running, Status::Running, Status::Success],
            &events,
        );

        node.tick(&mut (), 0.1);
        node.tick(&mut (), 0.1);
        node.tick(&mut (), 0.1);

        let events = events.borrow();
        assert_eq!(
            events.iter().filter(|e| e.ends_with(":init")).count(),
            1,
            "on_initialise must not re-run mid-cycle"
        );
    }

    #[test]
    fn test_terminate_runs_on_terminal_status() {
        let events = event_log();
        let mut node = Scripted::node("a", vec![Status::Running, Status::Failure], &events);

        assert_eq!(node.tick(&mut (), 0.1), Status::Running);
        assert!(!events.borrow().iter().any(|e| e.contains("terminate")));

        assert_eq!(node.tick(&mut (), 0.1), Status::Failure);
        assert!(events.borrow().iter().any(|e| e == "a:terminate:Failure"));
    }

    #[test]
    fn test_status_starts_invalid_until_first_tick() {
        let events = event_log();
        let mut node = Scripted::node("a", vec![Status::Success], &events);

        assert_eq!(node.status(), Status::Invalid);
        node.tick(&mut (), 0.1);
        assert_eq!(node.status(), Status::Success);
    }

    #[test]
    fn test_abort_terminates_running_node() {
        let events = event_log();
        let mut node = Scripted::node("a", vec![Status::Running], &events);

        node.tick(&mut (), 0.1);
        node.abort(&mut ());

        assert_eq!(node.status(), Status::Failure);
        assert!(events.borrow().iter().any(|e| e == "a:terminate:Failure"));
    }

    #[test]
    fn test_abort_is_a_no_op_when_not_running() {
        let events = event_log();
        let mut node = Scripted::node("a", vec![Status::Success], &events);

        node.tick(&mut (), 0.1);
        events.borrow_mut().clear();
        node.abort(&mut ());

        assert!(events.borrow().is_empty());
        assert_eq!(node.status(), Status::Success);
    }

    #[test]
    fn test_reset_allows_a_fresh_cycle() {
        let events = event_log();
        let mut node = Scripted::node("a", vec![Status::Success], &events);

        node.tick(&mut (), 0.1);
        node.reset();
        assert_eq!(node.status(), Status::Invalid);

        node.tick(&mut (), 0.1);
        assert_eq!(
            events
                .borrow()
                .iter()
                .filter(|e| e.ends_with(":init"))
                .count(),
            2,
            "reset must re-arm on_initialise"
        );
    }
}
