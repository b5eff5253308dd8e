//! Decorator behaviour nodes
//!
//! Decorators wrap a single child and modify its result or execution:
//! [`Repeat`] re-runs a child, [`ReturnSpecificStatus`] masks a child's
//! real outcome, [`Inverter`] negates it.

use crate::bt::behaviour::{Behaviour, Node};
use crate::bt::status::Status;

/// Re-runs the child until it fails or has succeeded `limit` times
///
/// The child is reset between iterations. A single Failure before the
/// limit propagates immediately as the repeat's own Failure.
pub struct Repeat<C> {
    child: Node<C>,
    limit: u32,
    completed: u32,
}

impl<C> Repeat<C> {
    pub fn new(child: Node<C>, limit: u32) -> Self {
        Self {
            child,
            limit,
            completed: 0,
        }
    }
}

impl<C> Behaviour<C> for Repeat<C> {
    fn name(&self) -> &str {
        "repeat"
    }

    fn on_initialise(&mut self, _ctx: &mut C) {
        self.completed = 0;
        self.child.reset();
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Status {
        if self.limit == 0 {
            return Status::Success;
        }

        loop {
            match self.child.tick(ctx, dt) {
                Status::Success => {
                    self.completed += 1;
                    if self.completed >= self.limit {
                        return Status::Success;
                    }
                    self.child.reset();
                }
                other => return other,
            }
        }
    }

    fn abort_children(&mut self, ctx: &mut C) {
        self.child.abort(ctx);
    }

    fn reset_children(&mut self) {
        self.completed = 0;
        self.child.reset();
    }
}

/// Always ticks the child but always reports a fixed status to the parent
///
/// Used to mask a branch's true outcome - for instance forcing a branch to
/// "fail" so a selector falls through to a default behaviour after a
/// side-effecting action has executed unconditionally. A child left in a
/// terminal state is reset so it keeps executing on subsequent ticks.
pub struct ReturnSpecificStatus<C> {
    child: Node<C>,
    fixed: Status,
}

impl<C> ReturnSpecificStatus<C> {
    pub fn new(child: Node<C>, fixed: Status) -> Self {
        Self { child, fixed }
    }
}

impl<C> Behaviour<C> for ReturnSpecificStatus<C> {
    fn name(&self) -> &str {
        "return_specific_status"
    }

    fn on_initialise(&mut self, _ctx: &mut C) {
        self.child.reset();
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Status {
        if self.child.status().is_terminal() {
            self.child.reset();
        }
        self.child.tick(ctx, dt);
        self.fixed
    }

    fn abort_children(&mut self, ctx: &mut C) {
        self.child.abort(ctx);
    }

    fn reset_children(&mut self) {
        self.child.reset();
    }
}

/// Inverts the child's terminal result; Running passes through
pub struct Inverter<C> {
    child: Node<C>,
}

impl<C> Inverter<C> {
    pub fn new(child: Node<C>) -> Self {
        Self { child }
    }
}

impl<C> Behaviour<C> for Inverter<C> {
    fn name(&self) -> &str {
        "inverter"
    }

    fn on_initialise(&mut self, _ctx: &mut C) {
        self.child.reset();
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Status {
        self.child.tick(ctx, dt).invert()
    }

    fn abort_children(&mut self, ctx: &mut C) {
        self.child.abort(ctx);
    }

    fn reset_children(&mut self) {
        self.child.reset();
    }
}
