mod filter;
mod render;
mod state;
#[cfg(test)]
mod tests;

pub use filter::filter_students;
pub use render::{render, resolve_timezone, RenderedScreen};
pub use state::{FormMode, Screen, ViewState};
