mod interface;
mod mock;
mod seed;

pub use interface::{BackendCall, BackendOp, BackendResult, RosterBackend};
pub use mock::MockBackend;
pub use seed::{demo_classes, demo_students};
