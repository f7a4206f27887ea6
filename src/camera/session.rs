use super::interface::{CaptureConstraints, CaptureDevice, RawFrame};
use super::overlay::{load_watermark_font, watermark_and_encode};
use crate::config::CameraConfig;
use crate::error::{CameraError, Result};
use crate::model::CapturedImage;
use chrono::{DateTime, Utc};
use rusttype::Font;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Active,
}

/// Wraps a capture device for the registration screen. The device is
/// released on `stop_camera` and when the session is dropped while active.
pub struct CameraSession {
    config: CameraConfig,
    device: Arc<dyn CaptureDevice>,
    font: Option<Font<'static>>,
    state: CameraState,
}

impl CameraSession {
    pub fn new(config: CameraConfig, device: Arc<dyn CaptureDevice>) -> Self {
        let font = load_watermark_font(&config.watermark_font_path);
        Self {
            config,
            device,
            font,
            state: CameraState::Idle,
        }
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == CameraState::Active
    }

    /// Acquire the device. On failure the session stays idle.
    pub async fn start_camera(&mut self) -> Result<()> {
        if self.is_active() {
            debug!("Camera already active");
            return Ok(());
        }

        let constraints = CaptureConstraints {
            width: self.config.resolution.0,
            height: self.config.resolution.1,
            front_facing: true,
        };

        match self.device.acquire(&constraints).await {
            Ok(()) => {
                self.state = CameraState::Active;
                info!(
                    "Camera started ({}x{})",
                    constraints.width, constraints.height
                );
                Ok(())
            }
            Err(e) => {
                // Drop whatever a failed acquire left bound
                self.device.release();
                self.state = CameraState::Idle;
                warn!("Camera start failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Pull a raw still from the device without encoding it. Returns
    /// `Ok(None)` when no stream is bound.
    pub fn grab_still(&self) -> Result<Option<PendingStill>> {
        if !self.is_active() {
            debug!("Capture requested while camera idle");
            return Ok(None);
        }

        let frame = match self.device.still_frame() {
            Some(frame) => frame,
            None => {
                debug!("Device produced no frame");
                return Ok(None);
            }
        };

        if !frame.validate_size() {
            return Err(CameraError::Encode {
                details: format!(
                    "frame has {} bytes, expected {}",
                    frame.rgb.len(),
                    frame.expected_size()
                ),
            }
            .into());
        }

        Ok(Some(PendingStill {
            frame,
            config: self.config.clone(),
            font: self.font.clone(),
        }))
    }

    /// Take a watermarked still. Returns `Ok(None)` when no stream is bound.
    pub fn capture_photo(&self) -> Result<Option<CapturedImage>> {
        self.grab_still()?.map(PendingStill::encode).transpose()
    }

    /// Release the device. Idempotent.
    pub fn stop_camera(&mut self) {
        if self.state == CameraState::Active {
            info!("Camera stopped");
        }
        self.device.release();
        self.state = CameraState::Idle;
    }
}

/// A raw still that still needs its watermark and JPEG encoding. Owns
/// everything it needs so the encode can run on a blocking thread.
pub struct PendingStill {
    frame: RawFrame,
    config: CameraConfig,
    font: Option<Font<'static>>,
}

impl PendingStill {
    pub fn encode(self) -> Result<CapturedImage> {
        let (width, height) = (self.frame.width, self.frame.height);
        let captured_at = DateTime::<Utc>::from(self.frame.timestamp);
        let data = watermark_and_encode(self.frame, &self.config, self.font.as_ref())?;

        Ok(CapturedImage {
            position: 0,
            data: Arc::new(data),
            width,
            height,
            captured_at,
            watermark: self.config.watermark_text,
            encoding: None,
        })
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        if self.is_active() {
            self.stop_camera();
        }
    }
}
