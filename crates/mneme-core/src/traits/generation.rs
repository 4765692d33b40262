// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation adapter trait for the external text-generation service.

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::MnemeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GenerationChunk, GenerationRequest};

/// Stream of incremental generation output.
pub type GenerationStream =
    Pin<Box<dyn Stream<Item = Result<GenerationChunk, MnemeError>> + Send>>;

/// Adapter for the text-generation service that consumes rendered context.
///
/// The pipeline never inspects the service's internals; it supplies
/// instructions plus raw dialogue and consumes text.
#[async_trait]
pub trait GenerationAdapter: PluginAdapter {
    /// Sends a request and returns the full generated text.
    async fn complete(&self, request: GenerationRequest) -> Result<String, MnemeError>;

    /// Sends a request and returns a stream of generated text chunks.
    async fn stream(&self, request: GenerationRequest) -> Result<GenerationStream, MnemeError>;
}
