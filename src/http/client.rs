use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;

use crate::rate_limiter::RateLimiter;

/// HTTP client with built-in rate limiting.
pub struct RateLimitedClient {
    client: Client,
    rate_limiter: RateLimiter,
}

impl RateLimitedClient {
    pub fn new(user_agent: &str, timeout_secs: u64, rate_limit_ms: u64) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs)?;
        let rate_limiter = RateLimiter::new(rate_limit_ms);

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// Issue a GET with the given headers after the rate gate clears.
    ///
    /// Transport errors are left as `reqwest::Error` so callers can map
    /// timeouts and connection failures into their own taxonomy.
    pub async fn get(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> reqwest::Result<reqwest::Response> {
        self.rate_limiter.wait().await;

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        request.send().await
    }

    fn build_client(user_agent: &str, timeout_secs: u64) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }
}
