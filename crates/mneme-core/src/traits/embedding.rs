// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding adapter trait for vector embedding generation.

use async_trait::async_trait;

use crate::error::MnemeError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Adapter for generating vector embeddings from text.
///
/// Implementations must be deterministic (identical text and dimensions
/// always yield identical output) and must return L2-normalized vectors,
/// except for empty text which maps to the all-zero vector. Nothing else
/// about the vector layout may be relied upon by callers.
#[async_trait]
pub trait EmbeddingAdapter: PluginAdapter {
    /// Generates embeddings for the given input.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemeError>;

    /// Embeds one text at the given dimensionality.
    async fn embed_one(&self, text: &str, dimensions: usize) -> Result<Vec<f32>, MnemeError> {
        let output = self
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
                dimensions,
            })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MnemeError::Internal("embedding returned no results".to_string()))
    }
}
