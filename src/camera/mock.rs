use super::interface::{CaptureConstraints, CaptureDevice, RawFrame};
use crate::error::CameraError;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::SystemTime;
use tracing::debug;

/// Capture device that renders synthetic gradient frames
pub struct MockCaptureDevice {
    deny: AtomicBool,
    acquired: AtomicBool,
    resolution: Mutex<(u32, u32)>,
    frame_counter: AtomicU64,
    acquire_count: AtomicU32,
    release_count: AtomicU32,
}

impl MockCaptureDevice {
    pub fn new() -> Self {
        Self {
            deny: AtomicBool::new(false),
            acquired: AtomicBool::new(false),
            resolution: Mutex::new((0, 0)),
            frame_counter: AtomicU64::new(0),
            acquire_count: AtomicU32::new(0),
            release_count: AtomicU32::new(0),
        }
    }

    /// Device that refuses acquisition as if permission was denied
    pub fn denied() -> Self {
        let device = Self::new();
        device.set_denied(true);
        device
    }

    pub fn set_denied(&self, deny: bool) {
        self.deny.store(deny, Ordering::Relaxed);
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired.load(Ordering::Relaxed)
    }

    pub fn acquire_count(&self) -> u32 {
        self.acquire_count.load(Ordering::Relaxed)
    }

    pub fn release_count(&self) -> u32 {
        self.release_count.load(Ordering::Relaxed)
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_counter.load(Ordering::Relaxed)
    }
}

impl Default for MockCaptureDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CaptureDevice for MockCaptureDevice {
    async fn acquire(&self, constraints: &CaptureConstraints) -> Result<(), CameraError> {
        self.acquire_count.fetch_add(1, Ordering::Relaxed);

        if self.deny.load(Ordering::Relaxed) {
            return Err(CameraError::PermissionDenied);
        }

        *self.resolution.lock() = (constraints.width, constraints.height);
        self.acquired.store(true, Ordering::Relaxed);
        debug!(
            "Mock camera acquired at {}x{}",
            constraints.width, constraints.height
        );
        Ok(())
    }

    fn still_frame(&self) -> Option<RawFrame> {
        if !self.acquired.load(Ordering::Relaxed) {
            return None;
        }

        let (width, height) = *self.resolution.lock();
        let frame_id = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        let shift = (frame_id * 17 % 256) as u32;

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                rgb.push(((x * 255 / width.max(1) + shift) % 256) as u8);
                rgb.push(((y * 255 / height.max(1)) % 256) as u8);
                rgb.push(((x + y + shift) % 256) as u8);
            }
        }

        Some(RawFrame {
            width,
            height,
            rgb,
            timestamp: SystemTime::now(),
        })
    }

    fn release(&self) {
        self.release_count.fetch_add(1, Ordering::Relaxed);
        if self.acquired.swap(false, Ordering::Relaxed) {
            debug!("Mock camera released");
        }
    }
}
