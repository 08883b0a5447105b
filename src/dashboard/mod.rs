mod cycle;
mod model;
mod render;
mod sink;
mod state;
mod view;

pub use sink::StdoutSink;
pub use state::DisplayState;
pub use view::{mount, poll_once, render_frame};

#[cfg(test)]
pub(crate) use sink::CaptureSink;

#[cfg(test)]
mod tests;
