use crate::form::FieldErrors;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    #[error("Operation already in progress: {operation}")]
    Busy { operation: String },

    #[error("Operation cancelled: {operation}")]
    Cancelled { operation: String },

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

/// Failures reported by the roster backend collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("backend unavailable during {operation}: {details}")]
    Unavailable { operation: String, details: String },
}

/// Failures of the capture device or the still-frame pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera device unavailable: {details}")]
    DeviceUnavailable { details: String },

    #[error("failed to encode still frame: {details}")]
    Encode { details: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("state update requested while subscribers were being notified")]
    Reentrant,
}

impl RosterError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn busy<S: Into<String>>(operation: S) -> Self {
        Self::Busy {
            operation: operation.into(),
        }
    }

    pub fn cancelled<S: Into<String>>(operation: S) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    /// Whether the UI can simply stay where it is after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            RosterError::Config(_) | RosterError::Io(_) | RosterError::Store(_)
        )
    }

    /// Single line shown to the user in a notification
    pub fn user_message(&self) -> String {
        match self {
            RosterError::Backend(BackendError::NotFound { entity, .. }) => {
                format!("The requested {} could not be found", entity)
            }
            RosterError::Backend(BackendError::Unavailable { .. }) => {
                "The server could not complete the request".to_string()
            }
            RosterError::Camera(CameraError::PermissionDenied) => {
                "Camera access was denied".to_string()
            }
            RosterError::Camera(CameraError::DeviceUnavailable { .. }) => {
                "No camera is available".to_string()
            }
            RosterError::Camera(CameraError::Encode { .. }) => {
                "The photo could not be captured".to_string()
            }
            RosterError::Validation(_) => "Please correct the highlighted fields".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
