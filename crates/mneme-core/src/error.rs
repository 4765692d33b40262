// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mneme memory pipeline.

use thiserror::Error;

/// The primary error type used across all Mneme adapter traits and core operations.
///
/// Several conditions that look like failures are deliberately *not* errors:
/// duplicate content on insert is reported through
/// [`InsertOutcome::Duplicate`](crate::types::InsertOutcome), and an empty
/// semantic match falls back to recent chunks inside the retriever.
#[derive(Debug, Error)]
pub enum MnemeError {
    /// Configuration errors (invalid TOML, out-of-range values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A single file could not be imported. Recoverable at the batch level.
    #[error("import failed for {path}: {message}")]
    Import { path: String, message: String },

    /// No persona has been initialized for this user yet.
    #[error("persona not initialized for user {user_id}")]
    PersonaNotFound { user_id: String },

    /// The referenced user does not exist.
    #[error("unknown user {user_id}")]
    UserNotFound { user_id: String },

    /// Caller supplied an argument outside its documented domain.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vectors of different dimensionality met in one similarity computation.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// External text-generation service failure.
    #[error("generation error: {message}")]
    Generation {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Operation was cancelled by the caller.
    #[error("operation cancelled")]
    Cancelled,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemeError {
    /// Wraps any error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        MnemeError::Storage {
            source: Box::new(err),
        }
    }
}
