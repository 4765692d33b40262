// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as chunk overlap bounds, score ranges, and positive multipliers.

use crate::diagnostic::ConfigError;
use crate::model::MnemeConfig;

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MnemeConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let level = config.general.log_level.trim().to_ascii_lowercase();
    if !VALID_LOG_LEVELS.contains(&level.as_str()) {
        fail(format!(
            "general.log_level `{}` must be one of {}",
            config.general.log_level,
            VALID_LOG_LEVELS.join(", ")
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    let embedding = &config.embedding;
    if embedding.dimensions == 0 {
        fail("embedding.dimensions must be greater than 0".to_string());
    }
    if embedding.ngram_min == 0 || embedding.ngram_min > embedding.ngram_max {
        fail(format!(
            "embedding n-gram range must satisfy 1 <= ngram_min <= ngram_max, got {}..={}",
            embedding.ngram_min, embedding.ngram_max
        ));
    }

    let ingest = &config.ingest;
    if ingest.max_chars == 0 {
        fail("ingest.max_chars must be greater than 0".to_string());
    }
    if ingest.overlap >= ingest.max_chars {
        fail(format!(
            "ingest.overlap ({}) must be smaller than ingest.max_chars ({})",
            ingest.overlap, ingest.max_chars
        ));
    }
    if ingest.max_file_bytes == 0 {
        fail("ingest.max_file_bytes must be greater than 0".to_string());
    }

    let retrieval = &config.retrieval;
    if !(1..=50).contains(&retrieval.top_k) {
        fail(format!(
            "retrieval.top_k must be between 1 and 50, got {}",
            retrieval.top_k
        ));
    }
    if !(-1.0..=1.0).contains(&retrieval.min_score) {
        fail(format!(
            "retrieval.min_score must be between -1.0 and 1.0, got {}",
            retrieval.min_score
        ));
    }
    if !(0.0..=1.0).contains(&retrieval.recency_boost) {
        fail(format!(
            "retrieval.recency_boost must be between 0.0 and 1.0, got {}",
            retrieval.recency_boost
        ));
    }
    if !(retrieval.recency_half_life_days > 0.0) {
        fail(format!(
            "retrieval.recency_half_life_days must be positive, got {}",
            retrieval.recency_half_life_days
        ));
    }
    if !(-1.0..=1.0).contains(&retrieval.fallback_score) {
        fail(format!(
            "retrieval.fallback_score must be between -1.0 and 1.0, got {}",
            retrieval.fallback_score
        ));
    }

    let persona = &config.persona;
    for (name, value) in persona.multipliers() {
        if !(value > 0.0) || !value.is_finite() {
            fail(format!("persona.{name} must be a positive number, got {value}"));
        }
    }
    if !(0.0..=1.0).contains(&persona.low_intimacy_threshold)
        || !(0.0..=1.0).contains(&persona.high_intimacy_threshold)
        || persona.low_intimacy_threshold > persona.high_intimacy_threshold
    {
        fail(format!(
            "persona intimacy thresholds must satisfy 0 <= low ({}) <= high ({}) <= 1",
            persona.low_intimacy_threshold, persona.high_intimacy_threshold
        ));
    }
    if !(0.0..=1.0).contains(&persona.emotion_threshold) {
        fail(format!(
            "persona.emotion_threshold must be between 0.0 and 1.0, got {}",
            persona.emotion_threshold
        ));
    }
    if persona.emotion_window == 0 {
        fail("persona.emotion_window must be at least 1".to_string());
    }

    if config.conversation.history_window == 0 {
        fail("conversation.history_window must be at least 1".to_string());
    }

    if config.generation.timeout_secs == 0 {
        fail("generation.timeout_secs must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
