use thiserror::Error;

/// Failure of a single GET against the backend.
///
/// The first three variants are the transport classification every failed
/// request falls into; `Decode` covers a 2xx answer whose body is not JSON.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("server responded with status {status}: {body}")]
    Response { status: u16, body: String },
    #[error("no response for {method} {url}: {source}")]
    NoResponse {
        method: &'static str,
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to build request: {message}")]
    Request { message: String },
    #[error("response body from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Response { .. } => "response",
            ApiError::NoResponse { .. } => "no_response",
            ApiError::Request { .. } => "request",
            ApiError::Decode { .. } => "decode",
        }
    }

    pub(crate) fn log(&self) {
        match self {
            ApiError::Response { status, body } => {
                log::error!("api_error_response status={} body={}", status, body);
            }
            ApiError::NoResponse {
                method,
                url,
                source,
            } => {
                log::error!(
                    "api_no_response method={} url={} error={}",
                    method,
                    url,
                    source
                );
            }
            ApiError::Request { message } => {
                log::error!("api_request_error message={}", message);
            }
            ApiError::Decode { url, source } => {
                log::error!("api_decode_error url={} error={}", url, source);
            }
        }
    }
}
