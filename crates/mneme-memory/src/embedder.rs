// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic feature-hashing embedder.
//!
//! Each lowercased character n-gram is hashed with SHA-256; the hash picks a
//! bucket and a sign, and the bucket counts are L2-normalized. This is a
//! lightweight stand-in for a learned model. Callers may rely only on the
//! [`EmbeddingAdapter`] contract, never on the bucket layout.

use async_trait::async_trait;
use mneme_config::model::EmbeddingConfig;
use mneme_core::error::MnemeError;
use mneme_core::traits::adapter::PluginAdapter;
use mneme_core::traits::EmbeddingAdapter;
use mneme_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use sha2::{Digest, Sha256};

/// Hashing embedder over character n-grams.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    ngram_min: usize,
    ngram_max: usize,
}

impl HashingEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, MnemeError> {
        Self::with_ngrams(config.ngram_min, config.ngram_max)
    }

    pub fn with_ngrams(ngram_min: usize, ngram_max: usize) -> Result<Self, MnemeError> {
        if ngram_min == 0 || ngram_min > ngram_max {
            return Err(MnemeError::InvalidInput(format!(
                "n-gram range {ngram_min}..={ngram_max} is empty"
            )));
        }
        Ok(Self {
            ngram_min,
            ngram_max,
        })
    }

    /// Embed one text. Empty text maps to the all-zero vector; anything else
    /// has unit length.
    pub fn embed_text(&self, text: &str, dimensions: usize) -> Vec<f32> {
        let mut vector = vec![0.0f32; dimensions];
        let chars: Vec<char> = text.to_lowercase().chars().collect();
        if chars.is_empty() || dimensions == 0 {
            return vector;
        }

        let mut gram = String::new();
        for n in self.ngram_min..=self.ngram_max.min(chars.len()) {
            for window in chars.windows(n) {
                gram.clear();
                gram.extend(window);
                add_feature(&mut vector, gram.as_bytes());
            }
        }
        // Texts shorter than the smallest n-gram hash as a whole.
        if chars.len() < self.ngram_min {
            let whole: String = chars.iter().collect();
            add_feature(&mut vector, whole.as_bytes());
        }

        let normalized = l2_normalize(&vector);
        if normalized.iter().all(|v| *v == 0.0) {
            // Every feature cancelled out; fall back to one bucket of the whole text.
            let whole: String = chars.iter().collect();
            let (bucket, _) = bucket_and_sign(whole.as_bytes(), dimensions);
            vector.fill(0.0);
            vector[bucket] = 1.0;
            return vector;
        }
        normalized
    }
}

fn bucket_and_sign(feature: &[u8], dimensions: usize) -> (usize, f32) {
    let digest = Sha256::digest(feature);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let bucket = (u64::from_le_bytes(head) % dimensions as u64) as usize;
    let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
    (bucket, sign)
}

fn add_feature(vector: &mut [f32], feature: &[u8]) {
    let (bucket, sign) = bucket_and_sign(feature, vector.len());
    vector[bucket] += sign;
}

/// L2-normalize a vector.
pub fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vec.iter().map(|v| v / norm).collect()
    } else {
        vec.to_vec()
    }
}

#[async_trait]
impl PluginAdapter for HashingEmbedder {
    fn name(&self) -> &str {
        "hashing-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemeError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemeError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for HashingEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemeError> {
        if input.dimensions == 0 {
            return Err(MnemeError::InvalidInput(
                "embedding dimensions must be positive".to_string(),
            ));
        }
        let embeddings = input
            .texts
            .iter()
            .map(|text| self.embed_text(text, input.dimensions))
            .collect();
        Ok(EmbeddingOutput {
            embeddings,
            dimensions: input.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mneme_core::types::cosine_similarity;
    use proptest::prelude::*;

    fn embedder() -> HashingEmbedder {
        HashingEmbedder::with_ngrams(3, 4).unwrap()
    }

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn l2_normalize_general_vector() {
        let n = l2_normalize(&[3.0, 4.0]);
        assert!((n[0] - 0.6).abs() < 0.001);
        assert!((n[1] - 0.8).abs() < 0.001);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        assert_eq!(l2_normalize(&[0.0, 0.0, 0.0]), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_text_is_the_zero_vector() {
        let v = embedder().embed_text("", 64);
        assert_eq!(v.len(), 64);
        assert!(v.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn embedding_is_deterministic_and_case_insensitive() {
        let e = embedder();
        assert_eq!(e.embed_text("Hello World", 128), e.embed_text("Hello World", 128));
        assert_eq!(e.embed_text("Hello World", 128), e.embed_text("hello world", 128));
    }

    #[test]
    fn short_text_still_has_unit_norm() {
        let v = embedder().embed_text("a", 32);
        assert!((norm(&v) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn related_texts_are_closer_than_unrelated() {
        let e = embedder();
        let a = e.embed_text("dinner reservation at the italian restaurant", 512);
        let b = e.embed_text("book a table at an italian restaurant for dinner", 512);
        let c = e.embed_text("quarterly tax filing deadline", 512);
        let ab = cosine_similarity(&a, &b).unwrap();
        let ac = cosine_similarity(&a, &c).unwrap();
        assert!(ab > ac, "ab={ab} ac={ac}");
    }

    #[test]
    fn invalid_ngram_range_is_rejected() {
        assert!(HashingEmbedder::with_ngrams(0, 3).is_err());
        assert!(HashingEmbedder::with_ngrams(4, 3).is_err());
    }

    #[tokio::test]
    async fn adapter_embeds_every_text() {
        let output = embedder()
            .embed(EmbeddingInput {
                texts: vec!["one".into(), "two".into(), String::new()],
                dimensions: 16,
            })
            .await
            .unwrap();
        assert_eq!(output.embeddings.len(), 3);
        assert_eq!(output.dimensions, 16);
        assert!(output.embeddings.iter().all(|v| v.len() == 16));
    }

    #[tokio::test]
    async fn zero_dimensions_is_invalid() {
        let result = embedder()
            .embed(EmbeddingInput {
                texts: vec!["x".into()],
                dimensions: 0,
            })
            .await;
        assert!(matches!(result, Err(MnemeError::InvalidInput(_))));
    }

    proptest! {
        #[test]
        fn non_empty_text_has_unit_norm(text in ".{1,120}", dims in 1usize..300) {
            let v = embedder().embed_text(&text, dims);
            prop_assert_eq!(v.len(), dims);
            prop_assert!((norm(&v) - 1.0).abs() < 1e-3);
        }
    }
}
