// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed-size overlapping chunking over characters.
//!
//! A 3000-character text with `max_chars = 1200` and `overlap = 120` becomes:
//! ```text
//! [0-1200] [1080-2280] [2160-3000]
//! ```

use mneme_config::model::IngestConfig;
use mneme_core::MnemeError;

/// Chunk configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    /// Maximum chunk length in characters.
    pub max_chars: usize,
    /// Characters shared by consecutive chunks.
    pub overlap: usize,
}

impl ChunkConfig {
    /// Build a config, rejecting `max_chars == 0` and `overlap >= max_chars`.
    pub fn new(max_chars: usize, overlap: usize) -> Result<Self, MnemeError> {
        if max_chars == 0 {
            return Err(MnemeError::InvalidInput("max_chars must be positive".into()));
        }
        if overlap >= max_chars {
            return Err(MnemeError::InvalidInput(format!(
                "overlap ({overlap}) must be smaller than max_chars ({max_chars})"
            )));
        }
        Ok(Self { max_chars, overlap })
    }

    pub fn from_ingest(config: &IngestConfig) -> Result<Self, MnemeError> {
        Self::new(config.max_chars, config.overlap)
    }

    /// Distance between consecutive chunk starts.
    pub fn step(&self) -> usize {
        self.max_chars - self.overlap
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chars: 1200,
            overlap: 120,
        }
    }
}

/// Split `text` into chunks of at most `config.max_chars` characters.
///
/// Chunk `k` starts at character `k * step`; the last chunk ends at the end
/// of the text. Empty input yields no chunks and no chunk is ever empty.
/// Boundaries fall on `char` boundaries, never inside a UTF-8 sequence.
pub fn chunk(text: &str, config: ChunkConfig) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }
    if chars.len() <= config.max_chars {
        return vec![text.to_string()];
    }

    let step = config.step().max(1);
    let mut chunks = Vec::with_capacity(chars.len() / step + 1);
    let mut start = 0;
    loop {
        let end = (start + config.max_chars).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}
