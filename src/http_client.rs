//! Outbound HTTP client construction shared by the weather and LLM clients

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::{ForecastError, Result};

/// Build a client with a request timeout and exponential backoff on
/// transient failures (connect errors, 5xx, 429). With `max_retries` at zero
/// no retry middleware is installed and every request is sent exactly once.
pub fn build(
    service: &'static str,
    user_agent: &str,
    timeout_seconds: u32,
    max_retries: u32,
) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(user_agent)
        .build()
        .map_err(|e| ForecastError::config(format!("Failed to create {service} HTTP client: {e}")))?;

    if max_retries == 0 {
        return Ok(ClientBuilder::new(client).build());
    }

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);
    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}

/// Trim a base URL so paths can be appended with a leading slash
#[must_use]
pub fn join(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
