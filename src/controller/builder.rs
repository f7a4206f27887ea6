use super::screen::ScreenController;
use crate::backend::{MockBackend, RosterBackend};
use crate::camera::{CaptureDevice, MockCaptureDevice};
use crate::config::RosterConfig;
use crate::error::{RosterError, Result};
use crate::notify::NotificationCenter;
use crate::recognition::{FaceRecognizer, RandomRecognizer};
use std::sync::Arc;

/// Builder for the screen controller. Collaborators that are not supplied
/// fall back to the in-memory mocks.
pub struct ScreenControllerBuilder {
    config: Option<RosterConfig>,
    backend: Option<Arc<dyn RosterBackend>>,
    device: Option<Arc<dyn CaptureDevice>>,
    recognizer: Option<Arc<dyn FaceRecognizer>>,
    notifications: Option<Arc<NotificationCenter>>,
}

impl ScreenControllerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            backend: None,
            device: None,
            recognizer: None,
            notifications: None,
        }
    }

    pub fn config(mut self, config: RosterConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn RosterBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn capture_device(mut self, device: Arc<dyn CaptureDevice>) -> Self {
        self.device = Some(device);
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn FaceRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn notifications(mut self, notifications: Arc<NotificationCenter>) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn build(self) -> Result<ScreenController> {
        let config = self
            .config
            .ok_or_else(|| RosterError::system("Controller configuration must be specified"))?;
        config.validate()?;

        let backend = self.backend.unwrap_or_else(|| {
            Arc::new(MockBackend::new(
                &config.backend,
                &config.system.organization_id,
            ))
        });
        let device = self
            .device
            .unwrap_or_else(|| Arc::new(MockCaptureDevice::new()));
        let recognizer = self
            .recognizer
            .unwrap_or_else(|| Arc::new(RandomRecognizer::new(&config.recognition)));
        let notifications = self
            .notifications
            .unwrap_or_else(|| Arc::new(NotificationCenter::new(&config.notification)));

        Ok(ScreenController::new(
            config,
            backend,
            device,
            recognizer,
            notifications,
        ))
    }
}

impl Default for ScreenControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
