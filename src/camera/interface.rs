use crate::error::CameraError;
use std::time::SystemTime;

/// Constraints passed to the device when a capture session starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub width: u32,
    pub height: u32,
    /// Prefer the user-facing lens
    pub front_facing: bool,
}

/// Uncompressed RGB24 still pulled from the device
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
    pub timestamp: SystemTime,
}

impl RawFrame {
    pub fn expected_size(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }

    pub fn validate_size(&self) -> bool {
        self.rgb.len() == self.expected_size()
    }
}

/// A video capture device that can be acquired, sampled and released
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Acquire the device; fails when permission is refused or no device exists
    async fn acquire(&self, constraints: &CaptureConstraints) -> Result<(), CameraError>;

    /// Current frame, or `None` when no stream is bound
    fn still_frame(&self) -> Option<RawFrame>;

    /// Release the device. Safe to call at any time.
    fn release(&self);
}
