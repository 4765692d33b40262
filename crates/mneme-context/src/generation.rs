// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded calls to the external generation service.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use mneme_config::model::GenerationConfig;
use mneme_core::types::GenerationRequest;
use mneme_core::{GenerationAdapter, MnemeError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Wraps a [`GenerationAdapter`] with a timeout and cooperative cancellation.
///
/// Nothing is written to the store here, so an abandoned call leaves no
/// partial state behind.
pub struct ReplyGenerator {
    adapter: Arc<dyn GenerationAdapter>,
    timeout: Duration,
}

impl ReplyGenerator {
    pub fn new(adapter: Arc<dyn GenerationAdapter>, config: &GenerationConfig) -> Self {
        Self::with_timeout(adapter, Duration::from_secs(config.timeout_secs))
    }

    pub fn with_timeout(adapter: Arc<dyn GenerationAdapter>, timeout: Duration) -> Self {
        Self { adapter, timeout }
    }

    /// Stream a reply and return the concatenated text.
    ///
    /// Returns [`MnemeError::Cancelled`] if `cancel` fires first and
    /// [`MnemeError::Timeout`] if the whole call exceeds the timeout.
    pub async fn generate_reply(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<String, MnemeError> {
        let call = async {
            let mut stream = self.adapter.stream(request).await?;
            let mut text = String::new();
            while let Some(chunk) = stream.next().await {
                text.push_str(&chunk?.text);
            }
            Ok::<String, MnemeError>(text)
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(adapter = self.adapter.name(), "generation cancelled");
                Err(MnemeError::Cancelled)
            }
            result = tokio::time::timeout(self.timeout, call) => match result {
                Ok(reply) => reply,
                Err(_elapsed) => {
                    warn!(
                        adapter = self.adapter.name(),
                        timeout_secs = self.timeout.as_secs_f64(),
                        "generation timed out"
                    );
                    Err(MnemeError::Timeout { duration: self.timeout })
                }
            },
        }
    }
}
