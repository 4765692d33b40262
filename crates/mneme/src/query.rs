// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mneme query` command implementation.

use mneme_core::types::SourceTag;
use mneme_core::MnemeError;
use mneme_memory::RetrievalOptions;

use crate::app::App;
use crate::output::{preview, print_json};

/// Command-line overrides of the configured retrieval options.
#[derive(Debug, Default)]
pub struct QueryOverrides {
    pub top_k: Option<usize>,
    pub min_score: Option<f32>,
    pub recency_boost: Option<f32>,
    pub sources: Vec<SourceTag>,
}

impl QueryOverrides {
    pub fn apply(self, mut options: RetrievalOptions) -> RetrievalOptions {
        if let Some(top_k) = self.top_k {
            options.top_k = top_k;
        }
        if let Some(min_score) = self.min_score {
            options.min_score = min_score;
        }
        if let Some(boost) = self.recency_boost {
            options.recency_boost = boost;
        }
        if !self.sources.is_empty() {
            options = options.with_sources(self.sources);
        }
        options
    }
}

pub async fn run_query(
    app: &App,
    user_id: &str,
    query: &str,
    overrides: QueryOverrides,
    json: bool,
) -> Result<(), MnemeError> {
    let options = overrides.apply(RetrievalOptions::from_config(&app.config.retrieval));
    let memories = app.retriever().retrieve(user_id, query, &options).await?;

    if json {
        return print_json(&memories);
    }
    if memories.is_empty() {
        println!("No memories stored for {user_id}.");
        return Ok(());
    }
    if memories.iter().all(|m| m.fallback) {
        println!("No close match; showing the most recent memories instead.");
    }
    for (rank, memory) in memories.iter().enumerate() {
        println!(
            "{:>2}. [{:.3}] {} {}  {}",
            rank + 1,
            memory.score,
            memory.source,
            memory.created_at,
            preview(&memory.text, 100)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_values() {
        let base = RetrievalOptions::default();
        let options = QueryOverrides {
            top_k: Some(3),
            sources: vec![SourceTag::Mail],
            ..Default::default()
        }
        .apply(base.clone());
        assert_eq!(options.top_k, 3);
        assert_eq!(options.min_score, base.min_score);
        assert_eq!(options.source_filter, Some(vec![SourceTag::Mail]));
    }
}
