mod builder;
mod capture;
mod screen;
mod navigation;
mod submit;

pub use builder::ScreenControllerBuilder;
pub use capture::CaptureOutcome;
pub use screen::ScreenController;
pub use submit::{DeleteOutcome, SubmitOutcome};
