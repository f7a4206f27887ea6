use super::screen::ScreenController;
use crate::error::{RosterError, Result};
use crate::form::FormField;
use crate::recognition::Recognition;
use crate::view::{FormMode, Screen};
use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};

/// Result of one capture attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// Accepted and appended; carries the new capture count
    Captured { count: usize },
    /// The recognizer refused the still; count unchanged
    Rejected { reason: String },
    LimitReached,
    CameraInactive,
    /// Not on the form, or another capture is still being validated
    Ignored,
}

impl ScreenController {
    /// Acquire the camera for the form screen
    pub async fn start_camera(&self) -> Result<()> {
        if !matches!(self.screen(), Screen::Form(_)) {
            warn!("Camera start requested outside the registration form");
            return Ok(());
        }

        let started = self.camera.lock().await.start_camera().await;
        match started {
            Ok(()) => {
                self.store.update(|s| s.camera_active = true)?;
                Ok(())
            }
            Err(e) => {
                self.store.update(|s| s.camera_active = false)?;
                Err(self.report(e, "Unable to start camera"))
            }
        }
    }

    /// Release the camera. Safe to call at any time.
    pub async fn stop_camera(&self) -> Result<()> {
        self.camera.lock().await.stop_camera();
        if self.store.read(|s| s.camera_active) {
            self.store.update(|s| s.camera_active = false)?;
        }
        Ok(())
    }

    /// Take a still, run it through the recognizer and append it when accepted
    pub async fn capture(&self) -> Result<CaptureOutcome> {
        if !matches!(self.screen(), Screen::Form(_)) {
            return Ok(CaptureOutcome::Ignored);
        }

        let max = self.config.registration.max_captures;
        if self.store.read(|s| s.captured_images.len()) >= max {
            self.notifications
                .warning(format!("Maximum of {} photos reached", max));
            return Ok(CaptureOutcome::LimitReached);
        }

        if self.capturing.swap(true, Ordering::SeqCst) {
            debug!("Capture already in progress");
            return Ok(CaptureOutcome::Ignored);
        }

        let outcome = self.capture_and_validate(max).await;
        self.capturing.store(false, Ordering::SeqCst);
        outcome
    }

    async fn capture_and_validate(&self, max: usize) -> Result<CaptureOutcome> {
        let token = self.current_token();

        let grabbed = self.camera.lock().await.grab_still();
        let pending = match grabbed {
            Ok(Some(pending)) => pending,
            Ok(None) => {
                self.notifications.warning("Please start the camera first");
                return Ok(CaptureOutcome::CameraInactive);
            }
            Err(e) => return Err(self.report(e, "Capture failed")),
        };

        let encoded = tokio::task::spawn_blocking(move || pending.encode())
            .await
            .map_err(|e| RosterError::component("camera".to_string(), e.to_string()))
            .and_then(|encoded| encoded);
        let mut image = match encoded {
            Ok(image) => image,
            Err(e) => return Err(self.report(e, "Capture failed")),
        };

        let recognition = self.recognizer.classify(&image).await;

        if token.is_cancelled() {
            debug!("Discarding capture validated after leaving the form");
            return Err(RosterError::cancelled("capture"));
        }

        match recognition {
            Recognition::Rejected { reason } => {
                warn!("Capture rejected: {}", reason);
                self.notifications.warning(reason.clone());
                Ok(CaptureOutcome::Rejected { reason })
            }
            Recognition::Accepted { encoding } => {
                image.encoding = Some(encoding);
                let count = self.store.update(move |s| {
                    if s.captured_images.len() >= max {
                        return None;
                    }
                    image.position = s.captured_images.len();
                    s.captured_images.push(image);
                    if s.screen == Screen::Form(FormMode::Edit) {
                        s.replace_saved_images = true;
                    }
                    s.form_errors.remove(FormField::Images);
                    Some(s.captured_images.len())
                })?;

                match count {
                    Some(count) => {
                        info!("Capture accepted ({}/{})", count, max);
                        self.notifications
                            .success(format!("Photo {} of {} captured", count, max));
                        Ok(CaptureOutcome::Captured { count })
                    }
                    None => {
                        self.notifications
                            .warning(format!("Maximum of {} photos reached", max));
                        Ok(CaptureOutcome::LimitReached)
                    }
                }
            }
        }
    }

    /// Drop the capture at `position`; later captures move up one place.
    /// Removing every new capture while editing shows the saved set again.
    pub fn remove_capture(&self, position: usize) -> Result<bool> {
        let removed = self.store.update(|s| {
            if position >= s.captured_images.len() {
                return false;
            }
            s.captured_images.remove(position);
            for (index, image) in s.captured_images.iter_mut().enumerate() {
                image.position = index;
            }
            if s.captured_images.is_empty() {
                s.replace_saved_images = false;
            }
            true
        })?;

        if removed {
            debug!("Removed capture at position {}", position);
        }
        Ok(removed)
    }
}
