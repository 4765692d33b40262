// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding and retrieval for the Mneme memory pipeline.
//!
//! ## Architecture
//!
//! - **HashingEmbedder**: deterministic character n-gram feature hashing
//!   behind the `EmbeddingAdapter` trait
//! - **HybridRetriever**: similarity + recency decay + source filter, with a
//!   recency fallback when nothing passes the score threshold

pub mod embedder;
pub mod retriever;

pub use embedder::HashingEmbedder;
pub use retriever::{HybridRetriever, RetrievalOptions};
