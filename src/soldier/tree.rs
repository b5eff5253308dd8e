//! Factory for the individual soldier behaviour tree
//!
//! Branch priority, highest first: dead gate, reactive combat, team
//! order execution, patrol. The active selector at the root re-evaluates
//! every frame, so a threat appearing mid-move preempts the move and a
//! cancelled order drops the soldier back to patrol.

use crate::bt::behaviour::Node;
use crate::bt::builder::{active_selector, monitor, node, sequence};
use crate::simulation::world::World;
use crate::soldier::behaviours::{
    AimAtTarget, DeterminePatrolTarget, ExecuteOrder, FireAtTarget, HasActiveOrder,
    HasVisibleThreat, IsDead, MoveToPatrolTarget, SelectGreatestThreat, TargetVisible,
    WaitForRespawn,
};

pub fn build_soldier_tree() -> Node<World> {
    active_selector(vec![
        // dead soldiers idle until the respawn pass revives them
        sequence(vec![node(IsDead), node(WaitForRespawn)]),
        // fight whatever is in sight; the monitor unwinds the attack the
        // moment the target is lost
        sequence(vec![
            node(HasVisibleThreat),
            node(SelectGreatestThreat),
            monitor(
                vec![node(TargetVisible)],
                vec![sequence(vec![node(AimAtTarget), node(FireAtTarget)])],
            ),
        ]),
        // execute the team's order
        sequence(vec![node(HasActiveOrder), node(ExecuteOrder)]),
        // nothing to do: wander
        sequence(vec![node(DeterminePatrolTarget), node(MoveToPatrolTarget)]),
    ])
}
