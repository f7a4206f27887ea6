mod interface;
mod mock;
mod overlay;
mod session;

pub use interface::{CaptureConstraints, CaptureDevice, RawFrame};
pub use mock::MockCaptureDevice;
pub use session::{CameraSession, CameraState, PendingStill};
