// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation adapter for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use mneme_core::traits::generation::GenerationStream;
use mneme_core::types::{AdapterType, GenerationChunk, GenerationRequest, HealthStatus};
use mneme_core::{GenerationAdapter, MnemeError, PluginAdapter};
use tokio::sync::Mutex;

/// Returns queued replies in order, then `"mock reply"`.
///
/// Every request is recorded so tests can inspect what was sent.
pub struct MockGenerator {
    replies: Arc<Mutex<VecDeque<String>>>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    delay: Option<Duration>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    pub fn with_replies(replies: Vec<String>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far.
    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self, request: GenerationRequest) -> String {
        self.requests.lock().await.push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "mock reply".to_string())
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemeError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationAdapter for MockGenerator {
    async fn complete(&self, request: GenerationRequest) -> Result<String, MnemeError> {
        Ok(self.next_reply(request).await)
    }

    async fn stream(&self, request: GenerationRequest) -> Result<GenerationStream, MnemeError> {
        let reply = self.next_reply(request).await;
        // Split into word-sized pieces so callers see more than one chunk.
        let chunks: Vec<Result<GenerationChunk, MnemeError>> = reply
            .split_inclusive(' ')
            .map(|piece| {
                Ok(GenerationChunk {
                    text: piece.to_string(),
                })
            })
            .collect();
        Ok(Box::pin(stream::iter(chunks)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn request() -> GenerationRequest {
        GenerationRequest {
            instructions: "be brief".to_string(),
            messages: vec![],
        }
    }

    #[tokio::test]
    async fn default_reply_when_queue_empty() {
        let generator = MockGenerator::new();
        assert_eq!(generator.complete(request()).await.unwrap(), "mock reply");
    }

    #[tokio::test]
    async fn queued_replies_returned_in_order() {
        let generator = MockGenerator::with_replies(vec!["first".into(), "second".into()]);
        assert_eq!(generator.complete(request()).await.unwrap(), "first");
        assert_eq!(generator.complete(request()).await.unwrap(), "second");
        assert_eq!(generator.requests().await.len(), 2);
    }

    #[tokio::test]
    async fn stream_reassembles_the_reply() {
        let generator = MockGenerator::with_replies(vec!["see you at noon".into()]);
        let mut stream = generator.stream(request()).await.unwrap();
        let mut text = String::new();
        let mut pieces = 0;
        while let Some(chunk) = stream.next().await {
            text.push_str(&chunk.unwrap().text);
            pieces += 1;
        }
        assert_eq!(text, "see you at noon");
        assert_eq!(pieces, 4);
    }
}
