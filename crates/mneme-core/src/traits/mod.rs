// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the pipeline and its swappable collaborators: the store,
//! the embedding function and the external generation service.

pub mod adapter;
pub mod embedding;
pub mod generation;
pub mod storage;

pub use adapter::PluginAdapter;
pub use embedding::EmbeddingAdapter;
pub use generation::GenerationAdapter;
pub use storage::StorageAdapter;
