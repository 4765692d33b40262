// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`StorageAdapter`] over the SQLite [`Database`].

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use mneme_config::model::StorageConfig;
use mneme_core::types::{
    Chunk, ChunkContext, ConnectedSource, DeletionReport, DialogueTurn, Document, InsertOutcome,
    Metadata, RecentChunk, RelationshipProfile, SourceTag, User, VectorCandidate, VectorRecord,
};
use mneme_core::{
    AdapterType, HealthStatus, MnemeError, PersonaVector, PluginAdapter, StorageAdapter,
};

use crate::database::Database;
use crate::queries;

/// The memory store. Every operation delegates to a function in
/// [`queries`]; the connection is opened by
/// [`initialize`](StorageAdapter::initialize), not by the constructor.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Adopt a database that is already open, such as an in-memory one.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::from(db),
        }
    }

    fn db(&self) -> Result<&Database, MnemeError> {
        self.db.get().ok_or_else(|| MnemeError::Storage {
            source: format!("store at {} is not open", self.config.database_path).into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemeError> {
        self.db()?.ping().await?;
        Ok(HealthStatus::Healthy)
    }

    /// Checkpoints the WAL. A store that was never opened has nothing to flush.
    async fn shutdown(&self) -> Result<(), MnemeError> {
        match self.db.get() {
            Some(db) => db.checkpoint().await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), MnemeError> {
        if self.db.initialized() {
            return Err(MnemeError::Storage {
                source: format!("store at {} is already open", self.config.database_path).into(),
            });
        }
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        if self.db.set(db).is_err() {
            return Err(MnemeError::Storage {
                source: "store was opened concurrently".into(),
            });
        }
        debug!(path = %self.config.database_path, wal = self.config.wal_mode, "store opened");
        Ok(())
    }

    async fn close(&self) -> Result<(), MnemeError> {
        self.db()?.checkpoint().await
    }

    // --- Users ---

    async fn ensure_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
    ) -> Result<User, MnemeError> {
        queries::users::ensure_user(self.db()?, user_id, display_name).await
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, MnemeError> {
        queries::users::get_user(self.db()?, user_id).await
    }

    async fn delete_user_data(&self, user_id: &str) -> Result<DeletionReport, MnemeError> {
        let report = queries::users::delete_user_data(self.db()?, user_id).await?;
        info!(
            user_id,
            documents = report.documents,
            chunks = report.chunks,
            turns = report.turns,
            "user data deleted"
        );
        Ok(report)
    }

    // --- Documents, chunks, vectors ---

    async fn insert_document(&self, document: &Document) -> Result<InsertOutcome, MnemeError> {
        queries::documents::insert_document(self.db()?, document).await
    }

    async fn merge_document_metadata(
        &self,
        document_id: &str,
        patch: &Metadata,
    ) -> Result<(), MnemeError> {
        queries::documents::merge_document_metadata(self.db()?, document_id, patch).await
    }

    async fn insert_chunk(&self, chunk: &Chunk) -> Result<(), MnemeError> {
        queries::chunks::insert_chunk(self.db()?, chunk).await
    }

    async fn insert_vector(&self, vector: &VectorRecord) -> Result<(), MnemeError> {
        queries::chunks::insert_vector(self.db()?, vector).await
    }

    async fn insert_chunk_group(
        &self,
        group: &[(Chunk, VectorRecord)],
    ) -> Result<usize, MnemeError> {
        queries::chunks::insert_chunk_group(self.db()?, group).await
    }

    async fn get_vectors_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<(String, Vec<f32>)>, MnemeError> {
        queries::chunks::get_vectors_by_user(self.db()?, user_id).await
    }

    async fn get_vector_candidates(
        &self,
        user_id: &str,
        sources: Option<&[SourceTag]>,
    ) -> Result<Vec<VectorCandidate>, MnemeError> {
        queries::chunks::get_vector_candidates(self.db()?, user_id, sources).await
    }

    async fn get_chunk_text(&self, chunk_id: &str) -> Result<Option<String>, MnemeError> {
        queries::chunks::get_chunk_text(self.db()?, chunk_id).await
    }

    async fn get_chunk_with_document_metadata(
        &self,
        chunk_id: &str,
    ) -> Result<Option<ChunkContext>, MnemeError> {
        queries::chunks::get_chunk_with_document_metadata(self.db()?, chunk_id).await
    }

    async fn get_recent_chunks_by_user(
        &self,
        user_id: &str,
        limit: usize,
        sources: Option<&[SourceTag]>,
    ) -> Result<Vec<RecentChunk>, MnemeError> {
        queries::chunks::get_recent_chunks_by_user(self.db()?, user_id, limit, sources).await
    }

    async fn find_orphan_documents(&self, user_id: &str) -> Result<Vec<String>, MnemeError> {
        queries::documents::find_orphan_documents(self.db()?, user_id).await
    }

    async fn delete_documents(&self, document_ids: &[String]) -> Result<usize, MnemeError> {
        queries::documents::delete_documents(self.db()?, document_ids).await
    }

    async fn list_connected_sources(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConnectedSource>, MnemeError> {
        queries::documents::list_connected_sources(self.db()?, user_id).await
    }

    // --- Persona and relationships ---

    async fn get_persona(&self, user_id: &str) -> Result<Option<PersonaVector>, MnemeError> {
        queries::personas::get_persona(self.db()?, user_id).await
    }

    async fn save_persona(&self, persona: &PersonaVector) -> Result<(), MnemeError> {
        queries::personas::save_persona(self.db()?, persona).await
    }

    async fn get_relationship(
        &self,
        user_id: &str,
        counterpart_id: &str,
    ) -> Result<Option<RelationshipProfile>, MnemeError> {
        queries::relationships::get_relationship(self.db()?, user_id, counterpart_id).await
    }

    async fn upsert_relationship(&self, profile: &RelationshipProfile) -> Result<(), MnemeError> {
        queries::relationships::upsert_relationship(self.db()?, profile).await
    }

    // --- Conversation turns ---

    async fn record_turn(&self, turn: &DialogueTurn) -> Result<(), MnemeError> {
        queries::turns::record_turn(self.db()?, turn).await
    }

    async fn get_recent_turns(
        &self,
        user_id: &str,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<DialogueTurn>, MnemeError> {
        queries::turns::get_recent_turns(self.db()?, user_id, conversation_id, limit).await
    }

    async fn delete_turns_before(&self, user_id: &str, cutoff: &str) -> Result<usize, MnemeError> {
        queries::turns::delete_turns_before(self.db()?, user_id, cutoff).await
    }
}
