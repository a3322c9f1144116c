use anyhow::{anyhow, Result};
use bytes::Bytes;
use reqwest::{Body, Client, Method, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::models::Credential;
use super::config::{WebDAVConfig, RetryConfig};

/// Non-success HTTP status returned by the server. Kept typed so callers can
/// downcast and react to specific codes.
#[derive(Debug, thiserror::Error)]
#[error("{method} {url} failed with status {status}: {body}")]
pub struct HttpStatusError {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub body: String,
}

impl HttpStatusError {
    async fn from_response(method: &Method, url: &str, response: reqwest::Response) -> Self {
        let status = response.status();
        Self {
            method: method.clone(),
            url: url.to_string(),
            status,
            body: response.text().await.unwrap_or_default(),
        }
    }
}

/// Returns the HTTP status carried by a transport error, if any
pub fn error_status(error: &anyhow::Error) -> Option<StatusCode> {
    error.downcast_ref::<HttpStatusError>().map(|e| e.status)
}

#[derive(Clone)]
pub struct WebDAVConnection {
    client: Client,
    retry_config: RetryConfig,
}

impl WebDAVConnection {
    pub fn new(config: WebDAVConfig, retry_config: RetryConfig) -> Result<Self> {
        // Validate configuration first
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            retry_config,
        })
    }

    /// Performs authenticated request with retry logic
    pub async fn authenticated_request(
        &self,
        method: Method,
        url: &str,
        credential: &Credential,
        body: Option<Bytes>,
        headers: Option<Vec<(&str, &str)>>,
    ) -> Result<reqwest::Response> {
        let mut attempt = 0;
        let mut rate_limited = 0;
        let mut delay = self.retry_config.initial_delay_ms;

        loop {
            let mut request = self.client
                .request(method.clone(), url)
                .basic_auth(&credential.username, Some(&credential.password));

            if let Some(ref body_content) = body {
                request = request.body(body_content.clone());
            }

            if let Some(ref headers_list) = headers {
                for (key, value) in headers_list {
                    request = request.header(*key, *value);
                }
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() || status == StatusCode::MULTI_STATUS {
                        return Ok(response);
                    }

                    // Handle rate limiting
                    if status == StatusCode::TOO_MANY_REQUESTS
                        && rate_limited < self.retry_config.max_rate_limit_retries
                    {
                        warn!("Rate limited, backing off for {}ms", self.retry_config.rate_limit_backoff_ms);
                        sleep(Duration::from_millis(self.retry_config.rate_limit_backoff_ms)).await;
                        rate_limited += 1;
                        continue;
                    }

                    // Handle server errors (retry)
                    if status.is_server_error() && attempt < self.retry_config.max_retries {
                        warn!("Server error {}, retrying in {}ms (attempt {}/{})",
                            status, delay, attempt + 1, self.retry_config.max_retries);

                        sleep(Duration::from_millis(delay)).await;
                        delay = self.next_delay(delay);
                        attempt += 1;
                        continue;
                    }

                    // Client errors and exhausted retries are not retried
                    return Err(HttpStatusError::from_response(&method, url, response).await.into());
                }
                Err(e) => {
                    if attempt < self.retry_config.max_retries {
                        warn!("Request error: {}, retrying in {}ms (attempt {}/{})",
                            e, delay, attempt + 1, self.retry_config.max_retries);

                        sleep(Duration::from_millis(delay)).await;
                        delay = self.next_delay(delay);
                        attempt += 1;
                        continue;
                    }

                    return Err(anyhow!("{} {} failed after {} attempts: {}",
                        method, url, attempt + 1, e));
                }
            }
        }
    }

    /// Sends a request whose body can only be consumed once, so no retries are made
    pub async fn streaming_request(
        &self,
        method: Method,
        url: &str,
        credential: &Credential,
        body: Body,
        headers: Vec<(&str, &str)>,
    ) -> Result<reqwest::Response> {
        let mut request = self.client
            .request(method.clone(), url)
            .basic_auth(&credential.username, Some(&credential.password))
            .body(body);

        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| anyhow!("{} {} failed: {}", method, url, e))?;

        if response.status().is_success() {
            debug!("{} {} -> {}", method, url, response.status());
            Ok(response)
        } else {
            Err(HttpStatusError::from_response(&method, url, response).await.into())
        }
    }

    fn next_delay(&self, delay: u64) -> u64 {
        std::cmp::min(
            (delay as f64 * self.retry_config.backoff_multiplier) as u64,
            self.retry_config.max_delay_ms,
        )
    }
}
