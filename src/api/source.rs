use std::future::Future;

use serde_json::Value;

use super::error::ApiError;

/// Anything that can answer a GET with a JSON body.
pub trait JsonSource {
    fn get(&self, path: &str) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

#[cfg(test)]
pub(crate) use mock::{MockReply, MockSource};
