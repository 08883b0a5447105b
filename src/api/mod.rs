mod client;
mod error;
mod source;

pub use client::ApiClient;
pub use error::ApiError;
pub use source::JsonSource;

#[cfg(test)]
pub(crate) use source::{MockReply, MockSource};
