// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid retriever combining semantic similarity, recency decay and a
//! source filter, with a recency fallback when nothing scores high enough.
//!
//! Scoring for each candidate chunk:
//! ```text
//! base  = similarity(query, chunk)
//! decay = 1 / (1 + age_days / half_life_days)
//! score = base * (1 - boost) + decay * boost * base   (base >= 0)
//! score = base                                          (base < 0)
//! ```
//! Candidates are sorted by score with a stable sort (ties keep scan order),
//! filtered by `min_score`, then truncated to `top_k`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mneme_config::model::RetrievalConfig;
use mneme_core::error::MnemeError;
use mneme_core::traits::{EmbeddingAdapter, StorageAdapter};
use mneme_core::types::{cosine_similarity, parse_timestamp, RetrievedMemory, SourceTag};
use tracing::debug;

/// Bounds applied to caller-supplied `top_k`.
pub const TOP_K_RANGE: (usize, usize) = (1, 50);

/// Per-query retrieval parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalOptions {
    pub top_k: usize,
    pub min_score: f32,
    /// Restrict candidates to documents from these sources.
    pub source_filter: Option<Vec<SourceTag>>,
    pub recency_boost: f32,
}

impl RetrievalOptions {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            top_k: config.top_k,
            min_score: config.min_score,
            source_filter: None,
            recency_boost: config.recency_boost,
        }
    }

    pub fn with_sources(mut self, sources: Vec<SourceTag>) -> Self {
        self.source_filter = Some(sources);
        self
    }

    /// Clamp `top_k` to [1, 50], `min_score` to [-1, 1] and `recency_boost`
    /// to [0, 1]. NaN thresholds become their neutral values.
    pub fn clamped(&self) -> Self {
        let min_score = if self.min_score.is_nan() {
            -1.0
        } else {
            self.min_score.clamp(-1.0, 1.0)
        };
        let recency_boost = if self.recency_boost.is_nan() {
            0.0
        } else {
            self.recency_boost.clamp(0.0, 1.0)
        };
        Self {
            top_k: self.top_k.clamp(TOP_K_RANGE.0, TOP_K_RANGE.1),
            min_score,
            source_filter: self.source_filter.clone(),
            recency_boost,
        }
    }
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

/// Recency decay for a document `age_days` old. Future dates count as age 0.
pub fn recency_decay(age_days: f64, half_life_days: f64) -> f64 {
    1.0 / (1.0 + age_days.max(0.0) / half_life_days)
}

/// Blend a similarity score with a recency decay. Negative similarity is
/// returned unboosted.
pub fn blend_score(base: f32, decay: f64, recency_boost: f32) -> f32 {
    if recency_boost <= 0.0 || base < 0.0 {
        return base;
    }
    base * (1.0 - recency_boost) + decay as f32 * recency_boost * base
}

/// Age in fractional days between `created_at` and `now`. Unparseable
/// timestamps count as brand new.
pub fn age_days(created_at: &str, now: DateTime<Utc>) -> f64 {
    parse_timestamp(created_at)
        .map(|ts| (now - ts).num_milliseconds() as f64 / 86_400_000.0)
        .unwrap_or(0.0)
}

/// Stable sort by score descending, drop scores below `min_score`, keep `top_k`.
pub fn rank<T>(mut scored: Vec<(T, f32)>, min_score: f32, top_k: usize) -> Vec<(T, f32)> {
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.retain(|(_, score)| *score >= min_score);
    scored.truncate(top_k);
    scored
}

/// Hybrid retriever over one user's stored vectors.
pub struct HybridRetriever {
    storage: Arc<dyn StorageAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    dimensions: usize,
    half_life_days: f64,
    fallback_score: f32,
}

impl HybridRetriever {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        dimensions: usize,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            storage,
            embedder,
            dimensions,
            half_life_days: config.recency_half_life_days,
            fallback_score: config.fallback_score,
        }
    }

    /// Retrieve memories relevant to `query` for `user_id`.
    ///
    /// Never fails for lack of a match: an empty ranked list is replaced by
    /// the most recent chunks, flagged `fallback`. Fails with
    /// [`MnemeError::UserNotFound`] for unknown users and
    /// [`MnemeError::DimensionMismatch`] when stored vectors do not match
    /// the query's dimensionality.
    pub async fn retrieve(
        &self,
        user_id: &str,
        query: &str,
        options: &RetrievalOptions,
    ) -> Result<Vec<RetrievedMemory>, MnemeError> {
        self.retrieve_at(user_id, query, options, Utc::now()).await
    }

    /// [`retrieve`](Self::retrieve) with an explicit clock.
    pub async fn retrieve_at(
        &self,
        user_id: &str,
        query: &str,
        options: &RetrievalOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<RetrievedMemory>, MnemeError> {
        if self.storage.get_user(user_id).await?.is_none() {
            return Err(MnemeError::UserNotFound {
                user_id: user_id.to_string(),
            });
        }
        let options = options.clamped();
        let query_vector = self.embedder.embed_one(query, self.dimensions).await?;

        let candidates = self
            .storage
            .get_vector_candidates(user_id, options.source_filter.as_deref())
            .await?;
        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let base = cosine_similarity(&query_vector, &candidate.values)?;
            let decay = recency_decay(age_days(&candidate.created_at, now), self.half_life_days);
            let score = blend_score(base, decay, options.recency_boost);
            scored.push(((candidate.chunk_id, candidate.source, candidate.created_at), score));
        }
        let candidate_count = scored.len();
        let ranked = rank(scored, options.min_score, options.top_k);

        if ranked.is_empty() {
            debug!(
                user_id,
                candidates = candidate_count,
                min_score = options.min_score,
                "no semantic match, returning recent chunks"
            );
            return self.recent_fallback(user_id, &options).await;
        }

        let mut memories = Vec::with_capacity(ranked.len());
        for ((chunk_id, source, created_at), score) in ranked {
            let Some(text) = self.storage.get_chunk_text(&chunk_id).await? else {
                continue;
            };
            memories.push(RetrievedMemory {
                chunk_id,
                score,
                text,
                source,
                created_at,
                fallback: false,
            });
        }
        if memories.is_empty() {
            debug!(user_id, "ranked chunks vanished, returning recent chunks");
            return self.recent_fallback(user_id, &options).await;
        }
        debug!(user_id, returned = memories.len(), "retrieval finished");
        Ok(memories)
    }

    async fn recent_fallback(
        &self,
        user_id: &str,
        options: &RetrievalOptions,
    ) -> Result<Vec<RetrievedMemory>, MnemeError> {
        let recent = self
            .storage
            .get_recent_chunks_by_user(user_id, options.top_k, options.source_filter.as_deref())
            .await?;
        Ok(recent
            .into_iter()
            .map(|chunk| RetrievedMemory {
                chunk_id: chunk.chunk_id,
                score: self.fallback_score,
                text: chunk.text,
                source: chunk.source,
                created_at: chunk.created_at,
                fallback: true,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decay_halves_at_the_half_life() {
        assert!((recency_decay(0.0, 30.0) - 1.0).abs() < 1e-12);
        assert!((recency_decay(30.0, 30.0) - 0.5).abs() < 1e-12);
        assert!((recency_decay(-5.0, 30.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_boost_keeps_base_score() {
        assert_eq!(blend_score(0.8, 0.1, 0.0), 0.8);
    }

    #[test]
    fn negative_similarity_is_not_boosted() {
        let newer = blend_score(-0.5, recency_decay(0.0, 30.0), 0.5);
        let older = blend_score(-0.5, recency_decay(30.0, 30.0), 0.5);
        assert_eq!(newer, -0.5);
        assert_eq!(older, -0.5);
    }

    #[test]
    fn full_boost_is_base_times_decay() {
        assert!((blend_score(0.8, 0.5, 1.0) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn age_is_measured_in_days() {
        let now = parse_timestamp("2024-01-31T00:00:00Z").unwrap();
        assert!((age_days("2024-01-01T00:00:00.000Z", now) - 30.0).abs() < 1e-9);
        assert_eq!(age_days("not a date", now), 0.0);
    }

    #[test]
    fn rank_is_stable_on_ties_and_applies_threshold_then_limit() {
        let scored = vec![("a", 0.5), ("b", 0.9), ("c", 0.5), ("d", 0.1), ("e", 0.5)];
        let ranked = rank(scored, 0.2, 3);
        let ids: Vec<_> = ranked.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn options_are_clamped() {
        let options = RetrievalOptions {
            top_k: 500,
            min_score: 3.0,
            source_filter: None,
            recency_boost: -1.0,
        }
        .clamped();
        assert_eq!(options.top_k, 50);
        assert_eq!(options.min_score, 1.0);
        assert_eq!(options.recency_boost, 0.0);

        let options = RetrievalOptions {
            top_k: 0,
            min_score: f32::NAN,
            source_filter: None,
            recency_boost: f32::NAN,
        }
        .clamped();
        assert_eq!(options.top_k, 1);
        assert_eq!(options.min_score, -1.0);
        assert_eq!(options.recency_boost, 0.0);
    }

    proptest! {
        #[test]
        fn ranked_scores_are_non_increasing(
            scores in proptest::collection::vec(-1.0f32..1.0, 0..60),
            min_score in -1.0f32..1.0,
            top_k in 1usize..50,
        ) {
            let scored: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();
            let ranked = rank(scored, min_score, top_k);
            prop_assert!(ranked.len() <= top_k);
            prop_assert!(ranked.windows(2).all(|w| w[0].1 >= w[1].1));
            prop_assert!(ranked.iter().all(|(_, s)| *s >= min_score));
        }

        #[test]
        fn newer_never_scores_below_older(
            base in -1.0f32..1.0,
            boost in 0.0f32..1.0,
            newer_age in 0.0f64..1000.0,
            extra_age in 0.0f64..1000.0,
        ) {
            let newer = blend_score(base, recency_decay(newer_age, 30.0), boost);
            let older = blend_score(base, recency_decay(newer_age + extra_age, 30.0), boost);
            prop_assert!(newer >= older);
        }
    }
}
