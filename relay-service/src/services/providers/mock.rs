//! Mock provider implementation for testing.

use super::{GenerationRequest, GenerativeProvider, ProviderError};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Mock provider that answers every call the same way and records the
/// requests it received.
pub struct MockProvider {
    reply: Result<String, String>,
    delay: Option<Duration>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockProvider {
    /// Succeeds with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Ok(text.into()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails with an API error carrying `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: Err(message.into()),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Simulate upstream latency before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl GenerativeProvider for MockProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ProviderError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.reply.clone().map_err(ProviderError::ApiError)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}
