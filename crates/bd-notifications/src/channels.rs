//! Notification delivery channels

use std::time::Duration;

use async_trait::async_trait;
use bd_core::config::NotificationConfig;
use thiserror::Error;

use crate::event::NotificationEvent;

/// Channel errors
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
    #[error("Delivery failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
    #[error("Channel disabled")]
    Disabled,
}

pub type ChannelResult<T> = Result<T, ChannelError>;

/// Outcome of a successful delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub channel: &'static str,
    /// Attempts used, including the successful one
    pub attempts: u32,
}

/// Channel handler trait
#[async_trait]
pub trait ChannelHandler: Send + Sync {
    fn name(&self) -> &'static str;

    /// Disabled channels are skipped by the pipeline
    fn is_available(&self) -> bool;

    /// Deliver an event, retrying per the channel's policy
    async fn deliver(&self, event: &NotificationEvent) -> ChannelResult<DeliveryResult>;
}

/// Fixed-backoff retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// POSTs each event as JSON to one endpoint
pub struct WebhookChannel {
    client: reqwest::Client,
    url: String,
    enabled: bool,
    retry: RetryPolicy,
}

impl WebhookChannel {
    pub fn new(url: impl Into<String>, timeout: Duration) -> ChannelResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            enabled: true,
            retry: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &NotificationConfig) -> ChannelResult<Self> {
        Ok(Self::new(&config.webhook_url, Duration::from_millis(config.timeout_ms))?
            .with_retry(RetryPolicy {
                max_attempts: config.max_attempts.max(1),
                backoff: Duration::from_millis(config.backoff_ms),
            })
            .with_enabled(config.external_enabled))
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Single POST, non-2xx counts as failure
    async fn try_send(&self, event: &NotificationEvent) -> ChannelResult<()> {
        let response = self.client.post(&self.url).json(event).send().await?;
        if !response.status().is_success() {
            return Err(ChannelError::HttpStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelHandler for WebhookChannel {
    fn name(&self) -> &'static str {
        "webhook"
    }

    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn deliver(&self, event: &NotificationEvent) -> ChannelResult<DeliveryResult> {
        if !self.enabled {
            return Err(ChannelError::Disabled);
        }

        let mut last_error = String::new();
        for attempt in 1..=self.retry.max_attempts {
            match self.try_send(event).await {
                Ok(()) => {
                    return Ok(DeliveryResult {
                        channel: self.name(),
                        attempts: attempt,
                    })
                }
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry.max_attempts,
                        event_type = %event.event_type,
                        url = %self.url,
                        error = %e,
                        "Webhook delivery attempt failed"
                    );
                    last_error = e.to_string();
                    if attempt < self.retry.max_attempts {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
            }
        }

        tracing::error!(
            event_type = %event.event_type,
            url = %self.url,
            error = %last_error,
            "Webhook delivery failed after all retries"
        );
        Err(ChannelError::Exhausted {
            attempts: self.retry.max_attempts,
            last_error,
        })
    }
}
