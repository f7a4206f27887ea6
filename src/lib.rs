pub mod backend;
pub mod camera;
pub mod checkin;
pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod model;
pub mod notify;
pub mod recognition;
pub mod store;
pub mod view;

pub use backend::{BackendOp, MockBackend, RosterBackend};
pub use camera::{CameraSession, CaptureDevice, MockCaptureDevice};
pub use checkin::{CheckInHandle, CheckInPhase, CheckInSimulation, CheckInState};
pub use config::RosterConfig;
pub use controller::{
    CaptureOutcome, DeleteOutcome, ScreenController, ScreenControllerBuilder, SubmitOutcome,
};
pub use error::{BackendError, CameraError, RosterError, Result};
pub use form::{FieldErrors, FormField, RegistrationForm};
pub use model::{CapturedImage, ClassInfo, FaceSample, Student, StudentStatus};
pub use notify::{Notification, NotificationCenter, NotificationKind};
pub use recognition::{FaceRecognizer, RandomRecognizer, Recognition, ScriptedRecognizer};
pub use store::{StateStore, Subscription};
pub use view::{FormMode, RenderedScreen, Screen, ViewState};
