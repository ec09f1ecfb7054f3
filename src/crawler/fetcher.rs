//! Page fetcher
//!
//! This module loads pages through a [`Renderer`] and hands back parsed
//! [`Document`]s. It owns:
//! - The rendering session (one per crawl, reused for every fetch)
//! - The courtesy pause applied before every request
//! - The fixed-delay retry policy for transient failures

use crate::config::CrawlerConfig;
use crate::crawler::document::Document;
use crate::crawler::renderer::{RenderError, Renderer};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Fatal fetch outcome: every attempt failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Giving up on {url} after {attempts} attempts: {source}")]
    Exhausted {
        url: String,
        attempts: u32,
        source: RenderError,
    },
}

/// Bounded retry with a fixed cooldown
///
/// The cooldown does not depend on the kind of error and is not applied
/// after the final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub cooldown: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, cooldown: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            cooldown,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(10))
    }
}

/// Runs `operation` until it succeeds or the policy is exhausted
///
/// The closure receives the 1-based attempt number. On exhaustion the last
/// error is returned together with the number of attempts made.
pub async fn retry_fixed<T, E, F, Fut>(policy: RetryPolicy, mut operation: F) -> Result<T, (E, u32)>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= policy.max_attempts => return Err((err, attempt)),
            Err(err) => {
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    cooldown_ms = policy.cooldown.as_millis() as u64,
                    error = %err,
                    "Page load failed, retrying after cooldown"
                );
                tokio::time::sleep(policy.cooldown).await;
                attempt += 1;
            }
        }
    }
}

/// Loads pages through a single rendering session
pub struct Fetcher<R> {
    renderer: R,
    policy: RetryPolicy,
    pre_request_pause: Duration,
}

impl<R: Renderer> Fetcher<R> {
    pub fn new(renderer: R, policy: RetryPolicy, pre_request_pause: Duration) -> Self {
        Self {
            renderer,
            policy,
            pre_request_pause,
        }
    }

    /// Builds a fetcher with pacing taken from the crawler configuration
    pub fn from_config(renderer: R, config: &CrawlerConfig) -> Self {
        Self::new(
            renderer,
            RetryPolicy::new(
                config.retry_attempts,
                Duration::from_millis(config.retry_cooldown_ms),
            ),
            Duration::from_millis(config.pre_request_pause_ms),
        )
    }

    /// Loads `url` and parses it
    ///
    /// Every attempt waits the pre-request pause first. Fails only once the
    /// retry policy is exhausted.
    pub async fn fetch(&self, url: &str) -> Result<Document, FetchError> {
        let markup = retry_fixed(self.policy, |attempt| async move {
            tokio::time::sleep(self.pre_request_pause).await;
            tracing::debug!(attempt, "Loading {}", url);
            self.renderer.render(url).await
        })
        .await
        .map_err(|(source, attempts)| {
            tracing::error!("Failed to load {} after {} attempts", url, attempts);
            FetchError::Exhausted {
                url: url.to_string(),
                attempts,
                source,
            }
        })?;

        Ok(Document::parse(url, &markup))
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Consumes the fetcher and releases the rendering session
    pub async fn close(self) -> Result<(), RenderError> {
        self.renderer.close().await
    }
}
