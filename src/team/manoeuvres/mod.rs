//! The concrete team manoeuvres
//!
//! Each file implements one named tactic as a [`Manoeuvre`] state
//! machine. Attack-phase manoeuvres share the assemble-then-commit
//! pattern: participants first gather at staging points, and the attack
//! launches when everyone has arrived or the wait timer runs out,
//! whichever comes first.

pub mod active_base_defence;
pub mod coordinated_base_attack;
pub mod defend_base_entrances;
pub mod distraction_base_attack;
pub mod guarded_flag_capture;
pub mod intercept_flag_carrier;
pub mod pick_up_dropped_flag;
pub mod return_dropped_flag;
pub mod run_the_flag_home;
pub mod rush_base_attack;
pub mod simple_base_attack;
pub mod simple_base_defence;
pub mod test_manoeuvre;

pub use active_base_defence::ActiveBaseDefence;
pub use coordinated_base_attack::CoordinatedBaseAttack;
pub use defend_base_entrances::DefendBaseEntrances;
pub use distraction_base_attack::DistractionBaseAttack;
pub use guarded_flag_capture::GuardedFlagCapture;
pub use intercept_flag_carrier::InterceptFlagCarrier;
pub use pick_up_dropped_flag::PickUpDroppedFlag;
pub use return_dropped_flag::ReturnDroppedFlag;
pub use run_the_flag_home::RunTheFlagHome;
pub use rush_base_attack::RushBaseAttack;
pub use simple_base_attack::SimpleBaseAttack;
pub use simple_base_defence::SimpleBaseDefence;
pub use test_manoeuvre::TestManoeuvre;

use crate::team::manoeuvre::{Manoeuvre, ManoeuvreRoster};

/// Every manoeuvre a team AI runs, created once at setup and reused
/// across rounds via reset
pub fn standard_roster() -> ManoeuvreRoster {
    let manoeuvres: Vec<Box<dyn Manoeuvre>> = vec![
        Box::new(DefendBaseEntrances::new()),
        Box::new(SimpleBaseDefence::new()),
        Box::new(ActiveBaseDefence::new()),
        Box::new(RushBaseAttack::new()),
        Box::new(CoordinatedBaseAttack::new()),
        Box::new(DistractionBaseAttack::new()),
        Box::new(SimpleBaseAttack::new()),
        Box::new(GuardedFlagCapture::new()),
        Box::new(PickUpDroppedFlag::new()),
        Box::new(RunTheFlagHome::new()),
        Box::new(InterceptFlagCarrier::new()),
        Box::new(ReturnDroppedFlag::new()),
        Box::new(TestManoeuvre::new()),
    ];
    ManoeuvreRoster::new(manoeuvres)
}
