//! Builder helpers for ergonomic tree construction
//!
//! Free functions replace the enum-tag factory of a classic engine: each
//! node kind has a typed constructor, so malformed trees fail to compile
//! instead of failing at lookup time. Instead of writing
//! `Node::new(Box::new(Sequence::new(vec![...])))` you write
//! `sequence(vec![...])`.

use crate::bt::behaviour::{Behaviour, Node};
use crate::bt::composite::{ActiveSelector, Selector, Sequence};
use crate::bt::decorator::{Inverter, Repeat, ReturnSpecificStatus};
use crate::bt::parallel::{Monitor, Parallel, Policy};
use crate::bt::status::Status;

/// Wrap any behaviour into a tree node
pub fn node<C: 'static, B: Behaviour<C> + 'static>(behaviour: B) -> Node<C> {
    Node::new(Box::new(behaviour))
}

pub fn sequence<C: 'static>(children: Vec<Node<C>>) -> Node<C> {
    node(Sequence::new(children))
}

pub fn selector<C: 'static>(children: Vec<Node<C>>) -> Node<C> {
    node(Selector::new(children))
}

pub fn active_selector<C: 'static>(children: Vec<Node<C>>) -> Node<C> {
    node(ActiveSelector::new(children))
}

pub fn parallel<C: 'static>(
    success_policy: Policy,
    failure_policy: Policy,
    children: Vec<Node<C>>,
) -> Node<C> {
    node(Parallel::new(success_policy, failure_policy, children))
}

/// Conditions guard the actions; any failing condition preempts them
pub fn monitor<C: 'static>(
    conditions: Vec<Node<C>>,
    actions: Vec<Node<C>>,
) -> Node<C> {
    let mut built = Monitor::new();
    // add_condition prepends, so insert in reverse to preserve order
    for condition in conditions.into_iter().rev() {
        built.add_condition(condition);
    }
    for action in actions {
        built.add_action(action);
    }
    node(built)
}

pub fn repeat<C: 'static>(child: Node<C>, limit: u32) -> Node<C> {
    node(Repeat::new(child, limit))
}

pub fn inverter<C: 'static>(child: Node<C>) -> Node<C> {
    node(Inverter::new(child))
}

/// Mask the child's real outcome with a fixed status
pub fn with_status<C: 'static>(child: Node<C>, fixed: Status) -> Node<C> {
    node(ReturnSpecificStatus::new(child, fixed))
}

/// Named predicate leaf: Success when the closure holds, Failure otherwise
pub fn condition<C, F>(name: &'static str, predicate: F) -> Node<C>
where
    C: 'static,
    F: FnMut(&mut C) -> bool + 'static,
{
    node(ConditionFn {
        name,
        predicate,
        _marker: std::marker::PhantomData,
    })
}

/// Named action leaf driven by a closure returning a status
pub fn action<C, F>(name: &'static str, act: F) -> Node<C>
where
    C: 'static,
    F: FnMut(&mut C, f32) -> Status + 'static,
{
    node(ActionFn {
        name,
        act,
        _marker: std::marker::PhantomData,
    })
}

struct ConditionFn<C, F> {
    name: &'static str,
    predicate: F,
    _marker: std::marker::PhantomData<fn(&mut C)>,
}

impl<C, F> Behaviour<C> for ConditionFn<C, F>
where
    F: FnMut(&mut C) -> bool + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn update(&mut self, ctx: &mut C, _dt: f32) -> Status {
        if (self.predicate)(ctx) {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

struct ActionFn<C, F> {
    name: &'static str,
    act: F,
    _marker: std::marker::PhantomData<fn(&mut C)>,
}

impl<C, F> Behaviour<C> for ActionFn<C, F>
where
    F: FnMut(&mut C, f32) -> Status + 'static,
{
    fn name(&self) -> &str {
        self.name
    }

    fn update(&mut self, ctx: &mut C, dt: f32) -> Status {
        (self.act)(ctx, dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        value: i32,
    }

    #[test]
    fn test_condition_reads_context() {
        let mut positive = condition("is_positive", |ctx: &mut Counter| ctx.value > 0);

        let mut ctx = Counter { value: 1 };
        assert_eq!(positive.tick(&mut ctx, 0.1), Status::Success);

        positive.reset();
        ctx.value = -1;
        assert_eq!(positive.tick(&mut ctx, 0.1), Status::Failure);
    }

    #[test]
    fn test_action_mutates_context() {
        let mut tree = sequence(vec![
            action("increment", |ctx: &mut Counter, _dt| {
                ctx.value += 1;
                Status::Success
            }),
            action("increment", |ctx: &mut Counter, _dt| {
                ctx.value += 1;
                Status::Success
            }),
        ]);

        let mut ctx = Counter { value: 0 };
        assert_eq!(tree.tick(&mut ctx, 0.1), Status::Success);
        assert_eq!(ctx.value, 2);
    }

    #[test]
    fn test_masked_branch_lets_selector_fall_through() {
        // the side-effecting branch always runs, but the selector still
        // reaches the fallback because the branch reports Failure
        let mut tree = selector(vec![
            with_status(
                action("side_effect", |ctx: &mut Counter, _dt| {
                    ctx.value += 10;
                    Status::Success
                }),
                Status::Failure,
            ),
            action("fallback", |ctx: &mut Counter, _dt| {
                ctx.value += 1;
                Status::Success
            }),
        ]);

        let mut ctx = Counter { value: 0 };
        assert_eq!(tree.tick(&mut ctx, 0.1), Status::Success);
        assert_eq!(ctx.value, 11);
    }
}
