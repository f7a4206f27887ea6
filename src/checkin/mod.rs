//! Kiosk check-in simulation: a timed scan, detect, process and result cycle
//! with randomized outcomes.

mod machine;
mod runner;
#[cfg(test)]
mod tests;

pub use machine::{
    advance, demo_pool, dwell, CheckInPhase, CheckInState, CheckInStudent, GuardianNotice,
};
pub use runner::{CheckInHandle, CheckInSimulation};
