use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RosterConfig {
    pub backend: BackendConfig,
    pub camera: CameraConfig,
    pub recognition: RecognitionConfig,
    pub registration: RegistrationConfig,
    pub notification: NotificationConfig,
    pub checkin: CheckInConfig,
    pub system: SystemConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    /// Simulated round trip for read calls, in milliseconds
    #[serde(default = "default_read_latency_ms")]
    pub read_latency_ms: u64,

    /// Simulated round trip for write calls, in milliseconds
    #[serde(default = "default_write_latency_ms")]
    pub write_latency_ms: u64,

    /// Seed the in-memory store with demo classes and students
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Requested resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Text drawn onto every captured still
    #[serde(default = "default_watermark_text")]
    pub watermark_text: String,

    /// TrueType font for the watermark; band only when unreadable
    #[serde(default = "default_watermark_font_path")]
    pub watermark_font_path: String,

    /// Watermark font size
    #[serde(default = "default_watermark_font_size")]
    pub watermark_font_size: f32,

    /// JPEG quality for encoded stills (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RecognitionConfig {
    /// Simulated classification time in milliseconds
    #[serde(default = "default_recognition_delay_ms")]
    pub delay_ms: u64,

    /// Probability that a capture is accepted
    #[serde(default = "default_acceptance_rate")]
    pub acceptance_rate: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegistrationConfig {
    /// Maximum number of in-progress captures
    #[serde(default = "default_max_captures")]
    pub max_captures: usize,

    /// Minimum number of captures required to save a face set
    #[serde(default = "default_min_captures")]
    pub min_captures: usize,

    /// Minimum length for first and last name
    #[serde(default = "default_min_name_length")]
    pub min_name_length: usize,

    /// Minimum length for the guardian phone number
    #[serde(default = "default_min_phone_length")]
    pub min_phone_length: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct NotificationConfig {
    /// How long a notification stays visible, in milliseconds
    #[serde(default = "default_notification_duration_ms")]
    pub duration_ms: u64,

    /// Notification channel capacity
    #[serde(default = "default_notification_capacity")]
    pub capacity: usize,

    /// Most recent notifications kept in the history
    #[serde(default = "default_notification_history_limit")]
    pub history_limit: usize,
}

/// Delay windows for the check-in simulation, all in milliseconds
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CheckInConfig {
    #[serde(default = "default_scanning_window")]
    pub scanning_ms: (u64, u64),

    #[serde(default = "default_face_detected_window")]
    pub face_detected_ms: (u64, u64),

    #[serde(default = "default_processing_window")]
    pub processing_ms: (u64, u64),

    #[serde(default = "default_result_window")]
    pub result_ms: (u64, u64),

    #[serde(default = "default_success_weight")]
    pub success_weight: f64,

    #[serde(default = "default_failure_weight")]
    pub failure_weight: f64,

    #[serde(default = "default_no_face_weight")]
    pub no_face_weight: f64,

    /// Most recent guardian notices kept in the outbox
    #[serde(default = "default_outbox_limit")]
    pub outbox_limit: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SystemConfig {
    /// Organization all backend calls are scoped to
    #[serde(default = "default_organization_id")]
    pub organization_id: String,

    /// Timezone used when rendering dates
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl RosterConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("rostercam.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("backend.read_latency_ms", default_read_latency_ms())?
            .set_default("backend.write_latency_ms", default_write_latency_ms())?
            .set_default("backend.seed_demo_data", default_seed_demo_data())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("camera.watermark_text", default_watermark_text())?
            .set_default("camera.watermark_font_path", default_watermark_font_path())?
            .set_default(
                "camera.watermark_font_size",
                default_watermark_font_size() as f64,
            )?
            .set_default("camera.jpeg_quality", default_jpeg_quality() as i64)?
            .set_default("recognition.delay_ms", default_recognition_delay_ms())?
            .set_default("recognition.acceptance_rate", default_acceptance_rate())?
            .set_default("registration.max_captures", default_max_captures() as i64)?
            .set_default("registration.min_captures", default_min_captures() as i64)?
            .set_default(
                "registration.min_name_length",
                default_min_name_length() as i64,
            )?
            .set_default(
                "registration.min_phone_length",
                default_min_phone_length() as i64,
            )?
            .set_default(
                "notification.duration_ms",
                default_notification_duration_ms(),
            )?
            .set_default(
                "notification.capacity",
                default_notification_capacity() as i64,
            )?
            .set_default(
                "notification.history_limit",
                default_notification_history_limit() as i64,
            )?
            .set_default("checkin.scanning_ms", window(default_scanning_window()))?
            .set_default(
                "checkin.face_detected_ms",
                window(default_face_detected_window()),
            )?
            .set_default("checkin.processing_ms", window(default_processing_window()))?
            .set_default("checkin.result_ms", window(default_result_window()))?
            .set_default("checkin.success_weight", default_success_weight())?
            .set_default("checkin.failure_weight", default_failure_weight())?
            .set_default("checkin.no_face_weight", default_no_face_weight())?
            .set_default("checkin.outbox_limit", default_outbox_limit() as i64)?
            .set_default("system.organization_id", default_organization_id())?
            .set_default("system.timezone", default_timezone())?
            // Add configuration file (optional)
            .add_source(File::with_name(&path_str).required(false))
            // Add environment variables with ROSTERCAM_ prefix
            .add_source(Environment::with_prefix("ROSTERCAM").separator("__"))
            .build()?;

        let config: RosterConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.camera.jpeg_quality == 0 || self.camera.jpeg_quality > 100 {
            return Err(ConfigError::Message(
                "Camera jpeg_quality must be between 1 and 100".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.recognition.acceptance_rate) {
            return Err(ConfigError::Message(
                "Recognition acceptance_rate must be between 0 and 1".to_string(),
            ));
        }

        if self.registration.max_captures == 0 {
            return Err(ConfigError::Message(
                "Registration max_captures must be greater than 0".to_string(),
            ));
        }

        if self.registration.min_captures > self.registration.max_captures {
            return Err(ConfigError::Message(
                "Registration min_captures cannot exceed max_captures".to_string(),
            ));
        }

        if self.notification.capacity == 0 {
            return Err(ConfigError::Message(
                "Notification capacity must be greater than 0".to_string(),
            ));
        }

        if self.notification.history_limit == 0 || self.checkin.outbox_limit == 0 {
            return Err(ConfigError::Message(
                "Notification history_limit and check-in outbox_limit must be greater than 0"
                    .to_string(),
            ));
        }

        for (name, (low, high)) in [
            ("scanning_ms", self.checkin.scanning_ms),
            ("face_detected_ms", self.checkin.face_detected_ms),
            ("processing_ms", self.checkin.processing_ms),
            ("result_ms", self.checkin.result_ms),
        ] {
            if low > high {
                return Err(ConfigError::Message(format!(
                    "Check-in window {} has its lower bound above its upper bound",
                    name
                )));
            }
        }

        let weights = [
            self.checkin.success_weight,
            self.checkin.failure_weight,
            self.checkin.no_face_weight,
        ];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0)
            || weights.iter().sum::<f64>() <= 0.0
        {
            return Err(ConfigError::Message(
                "Check-in outcome weights must be finite, non-negative and not all zero"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                read_latency_ms: default_read_latency_ms(),
                write_latency_ms: default_write_latency_ms(),
                seed_demo_data: default_seed_demo_data(),
            },
            camera: CameraConfig {
                resolution: default_camera_resolution(),
                watermark_text: default_watermark_text(),
                watermark_font_path: default_watermark_font_path(),
                watermark_font_size: default_watermark_font_size(),
                jpeg_quality: default_jpeg_quality(),
            },
            recognition: RecognitionConfig {
                delay_ms: default_recognition_delay_ms(),
                acceptance_rate: default_acceptance_rate(),
            },
            registration: RegistrationConfig {
                max_captures: default_max_captures(),
                min_captures: default_min_captures(),
                min_name_length: default_min_name_length(),
                min_phone_length: default_min_phone_length(),
            },
            notification: NotificationConfig {
                duration_ms: default_notification_duration_ms(),
                capacity: default_notification_capacity(),
                history_limit: default_notification_history_limit(),
            },
            checkin: CheckInConfig {
                scanning_ms: default_scanning_window(),
                face_detected_ms: default_face_detected_window(),
                processing_ms: default_processing_window(),
                result_ms: default_result_window(),
                success_weight: default_success_weight(),
                failure_weight: default_failure_weight(),
                no_face_weight: default_no_face_weight(),
                outbox_limit: default_outbox_limit(),
            },
            system: SystemConfig {
                organization_id: default_organization_id(),
                timezone: default_timezone(),
            },
        }
    }
}

impl BackendConfig {
    pub fn read_latency(&self) -> Duration {
        Duration::from_millis(self.read_latency_ms)
    }

    pub fn write_latency(&self) -> Duration {
        Duration::from_millis(self.write_latency_ms)
    }
}

impl NotificationConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

fn window(bounds: (u64, u64)) -> Vec<u64> {
    vec![bounds.0, bounds.1]
}

// Default value functions
fn default_read_latency_ms() -> u64 {
    300
}
fn default_write_latency_ms() -> u64 {
    500
}
fn default_seed_demo_data() -> bool {
    true
}

fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}
fn default_watermark_text() -> String {
    "Mobile Mockup".to_string()
}
fn default_watermark_font_path() -> String {
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf".to_string()
}
fn default_watermark_font_size() -> f32 {
    20.0
}
fn default_jpeg_quality() -> u8 {
    80
}

fn default_recognition_delay_ms() -> u64 {
    1000
}
fn default_acceptance_rate() -> f64 {
    0.9
}

fn default_max_captures() -> usize {
    5
}
fn default_min_captures() -> usize {
    3
}
fn default_min_name_length() -> usize {
    2
}
fn default_min_phone_length() -> usize {
    10
}

fn default_notification_duration_ms() -> u64 {
    3000
}
fn default_notification_capacity() -> usize {
    32
}
fn default_notification_history_limit() -> usize {
    100
}

fn default_scanning_window() -> (u64, u64) {
    (2000, 4000)
}
fn default_face_detected_window() -> (u64, u64) {
    (800, 1500)
}
fn default_processing_window() -> (u64, u64) {
    (1000, 2000)
}
fn default_result_window() -> (u64, u64) {
    (3000, 4000)
}
fn default_success_weight() -> f64 {
    0.75
}
fn default_failure_weight() -> f64 {
    0.15
}
fn default_no_face_weight() -> f64 {
    0.10
}
fn default_outbox_limit() -> usize {
    50
}

fn default_organization_id() -> String {
    "demo-org".to_string()
}
fn default_timezone() -> String {
    "UTC".to_string()
}
