// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mneme memory pipeline.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the workspace: documents, chunks, vectors,
//! the persona data model, relationship profiles and dialogue turns.

pub mod error;
pub mod persona;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MnemeError;
pub use persona::PersonaVector;
pub use types::{AdapterType, HealthStatus, SourceTag};

// Re-export all adapter traits at crate root.
pub use traits::{EmbeddingAdapter, GenerationAdapter, PluginAdapter, StorageAdapter};
