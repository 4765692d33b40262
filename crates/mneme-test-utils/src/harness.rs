// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness: a temporary SQLite store, a hashing embedder and one seeded user.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mneme_config::model::MnemeConfig;
use mneme_core::types::{Chunk, Document, Metadata, SourceTag, VectorRecord};
use mneme_core::{EmbeddingAdapter, MnemeError, PersonaVector, StorageAdapter};
use mneme_memory::{HashingEmbedder, HybridRetriever};
use mneme_storage::SqliteStorage;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    user_id: String,
    dimensions: usize,
    with_persona: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            user_id: "u1".to_string(),
            dimensions: 256,
            with_persona: false,
        }
    }

    pub fn with_user(mut self, user_id: &str) -> Self {
        self.user_id = user_id.to_string();
        self
    }

    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Store a neutral persona for the user.
    pub fn with_persona(mut self) -> Self {
        self.with_persona = true;
        self
    }

    pub async fn build(self) -> Result<TestHarness, MnemeError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| MnemeError::Storage { source: e.into() })?;

        let mut config = MnemeConfig::default();
        config.storage.database_path = temp_dir.path().join("test.db").to_string_lossy().to_string();
        config.embedding.dimensions = self.dimensions;

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage = Arc::new(storage);
        let embedder = Arc::new(HashingEmbedder::new(&config.embedding)?);

        let user = storage.ensure_user(&self.user_id, None).await?;
        if self.with_persona {
            storage
                .save_persona(&PersonaVector::neutral(&self.user_id, &user.created_at))
                .await?;
        }

        Ok(TestHarness {
            config,
            storage,
            embedder,
            user_id: self.user_id,
            next_id: AtomicUsize::new(0),
            _temp_dir: temp_dir,
        })
    }
}

/// A self-contained store for integration tests. The database file is
/// removed when the harness is dropped.
pub struct TestHarness {
    pub config: MnemeConfig,
    pub storage: Arc<SqliteStorage>,
    pub embedder: Arc<HashingEmbedder>,
    pub user_id: String,
    next_id: AtomicUsize,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn dimensions(&self) -> usize {
        self.config.embedding.dimensions
    }

    pub fn storage(&self) -> Arc<dyn StorageAdapter> {
        self.storage.clone()
    }

    pub fn embedder(&self) -> Arc<dyn EmbeddingAdapter> {
        self.embedder.clone()
    }

    pub fn retriever(&self) -> HybridRetriever {
        HybridRetriever::new(
            self.storage(),
            self.embedder(),
            self.dimensions(),
            &self.config.retrieval,
        )
    }

    /// Store `text` as a one-chunk document of the harness user. Returns the chunk id.
    pub async fn add_memory(
        &self,
        source: SourceTag,
        text: &str,
        created_at: &str,
    ) -> Result<String, MnemeError> {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let document_id = format!("doc-{n}");
        let document = Document {
            id: document_id.clone(),
            user_id: self.user_id.clone(),
            source,
            content_type: "text/plain".to_string(),
            title: None,
            content: text.to_string(),
            metadata: Metadata::new(),
            created_at: created_at.to_string(),
        };
        self.storage.insert_document(&document).await?;

        let chunk_id = format!("{document_id}-0");
        let chunk = Chunk {
            id: chunk_id.clone(),
            document_id,
            user_id: self.user_id.clone(),
            seq_index: 0,
            text: text.to_string(),
            metadata: Metadata::new(),
        };
        let vector = VectorRecord {
            chunk_id: chunk_id.clone(),
            user_id: self.user_id.clone(),
            values: self.embedder.embed_text(text, self.dimensions()),
        };
        self.storage.insert_chunk_group(&[(chunk, vector)]).await?;
        Ok(chunk_id)
    }
}
