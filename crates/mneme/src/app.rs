// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring shared by every command: one store, one embedder, one config.

use std::path::Path;
use std::sync::Arc;

use mneme_config::model::MnemeConfig;
use mneme_context::ConversationMemoryAssembler;
use mneme_core::{EmbeddingAdapter, MnemeError, StorageAdapter};
use mneme_ingest::ImportCoordinator;
use mneme_memory::{HashingEmbedder, HybridRetriever, RetrievalOptions};
use mneme_persona::ContextualAdjuster;
use mneme_storage::SqliteStorage;
use tracing::debug;

pub struct App {
    pub config: MnemeConfig,
    storage: Arc<SqliteStorage>,
    embedder: Arc<HashingEmbedder>,
}

impl App {
    /// Open (and migrate) the configured database.
    pub async fn open(config: MnemeConfig) -> Result<Self, MnemeError> {
        if let Some(parent) = Path::new(&config.storage.database_path).parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(MnemeError::storage)?;
        }
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let embedder = HashingEmbedder::new(&config.embedding)?;
        debug!(database = %config.storage.database_path, "store opened");
        Ok(Self {
            config,
            storage: Arc::new(storage),
            embedder: Arc::new(embedder),
        })
    }

    pub fn storage(&self) -> Arc<dyn StorageAdapter> {
        self.storage.clone()
    }

    pub fn embedder(&self) -> Arc<dyn EmbeddingAdapter> {
        self.embedder.clone()
    }

    pub fn coordinator(&self) -> Result<ImportCoordinator, MnemeError> {
        ImportCoordinator::new(
            self.storage(),
            self.embedder(),
            &self.config.ingest,
            self.config.embedding.dimensions,
        )
    }

    pub fn retriever(&self) -> HybridRetriever {
        HybridRetriever::new(
            self.storage(),
            self.embedder(),
            self.config.embedding.dimensions,
            &self.config.retrieval,
        )
    }

    pub fn assembler(&self) -> ConversationMemoryAssembler {
        ConversationMemoryAssembler::new(
            self.storage(),
            self.retriever(),
            ContextualAdjuster::new(self.config.persona.clone()),
            RetrievalOptions::from_config(&self.config.retrieval),
            &self.config.conversation,
        )
    }

    /// Fail with `UserNotFound` unless the user exists.
    pub async fn require_user(&self, user_id: &str) -> Result<(), MnemeError> {
        match self.storage.get_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(MnemeError::UserNotFound {
                user_id: user_id.to_string(),
            }),
        }
    }

    pub async fn close(&self) -> Result<(), MnemeError> {
        self.storage.close().await
    }
}
