use std::time::Duration;

use reqwest::{
    Client, Url,
    header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde_json::Value;

use crate::config::ApiConfig;

use super::{error::ApiError, source::JsonSource};

const JSON_MIME: &str = "application/json";

/// Thin GET-only wrapper over the backend REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(config.base_url.trim()).map_err(|error| {
            let error = ApiError::Request {
                message: format!("invalid base url {}: {}", config.base_url, error),
            };
            error.log();
            error
        })?;
        // Request paths are appended under the base path, never resolved against its root.
        if !base_url.path().ends_with('/') {
            let prefixed = format!("{}/", base_url.path());
            base_url.set_path(&prefixed);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_MIME));
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_MIME));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|error| {
                let error = ApiError::Request {
                    message: format!("http client build failed: {}", error),
                };
                error.log();
                error
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let result = self.send_get(path).await;
        if let Err(error) = &result {
            error.log();
        }
        result
    }

    async fn send_get(&self, path: &str) -> Result<Value, ApiError> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|error| ApiError::Request {
                message: format!("cannot join path {} onto {}: {}", path, self.base_url, error),
            })?;

        let response = self.http.get(url.clone()).send().await.map_err(|source| {
            if source.is_builder() {
                ApiError::Request {
                    message: source.to_string(),
                }
            } else {
                ApiError::NoResponse {
                    method: "GET",
                    url: url.to_string(),
                    source,
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|error| format!("<unreadable body: {}>", error));
            return Err(ApiError::Response {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::NoResponse {
                method: "GET",
                url: url.to_string(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

impl JsonSource for ApiClient {
    async fn get(&self, path: &str) -> Result<Value, ApiError> {
        ApiClient::get(self, path).await
    }
}
