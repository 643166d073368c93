//! HTTP client with retry logic for registry requests

use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use crate::error::RegistryError;

const MAX_RETRIES: u32 = 3;
const BASE_DELAY_MS: u64 = 100;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared HTTP client for registry requests.
///
/// Retries transient failures (5xx, network errors) with exponential
/// backoff. 404 maps to PackageNotFound immediately; 429 backs off and
/// becomes RateLimitExceeded once retries are exhausted.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("reqlint/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Performs a GET request and parses the response as JSON.
    pub async fn get_json(
        &self,
        url: &str,
        package: &str,
        registry: &str,
    ) -> Result<Value, RegistryError> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = BASE_DELAY_MS * 2u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            let response = match self.client.get(url).send().await {
                Ok(response) => response,
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(RegistryError::timeout(package, registry));
                    } else {
                        last_error =
                            Some(RegistryError::network_error(package, registry, e.to_string()));
                    }
                    continue;
                }
            };

            match response.status() {
                StatusCode::OK => {
                    return response.json::<Value>().await.map_err(|e| {
                        RegistryError::InvalidResponse {
                            package: package.to_string(),
                            registry: registry.to_string(),
                            message: e.to_string(),
                        }
                    });
                }
                StatusCode::NOT_FOUND => {
                    return Err(RegistryError::package_not_found(package, registry));
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    last_error = Some(RegistryError::rate_limit_exceeded(registry));
                }
                status if status.is_server_error() => {
                    last_error = Some(RegistryError::network_error(
                        package,
                        registry,
                        format!("server returned {}", status),
                    ));
                }
                status => {
                    return Err(RegistryError::network_error(
                        package,
                        registry,
                        format!("unexpected status {}", status),
                    ));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| RegistryError::network_error(package, registry, "request failed")))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}
