// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait: the memory store contract.
//!
//! Every key is partitioned by user id, so operations for different users
//! never contend on shared rows.

use async_trait::async_trait;

use crate::error::MnemeError;
use crate::persona::PersonaVector;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    Chunk, ChunkContext, ConnectedSource, DeletionReport, DialogueTurn, Document, InsertOutcome,
    Metadata, RecentChunk, RelationshipProfile, SourceTag, User, VectorCandidate, VectorRecord,
};

/// Adapter for the persistent memory store.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), MnemeError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), MnemeError>;

    // --- Users ---

    /// Returns the user, creating it if absent.
    async fn ensure_user(
        &self,
        user_id: &str,
        display_name: Option<&str>,
    ) -> Result<User, MnemeError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, MnemeError>;

    /// Deletes all documents (and by cascade chunks and vectors) and
    /// conversation turns of a user. The user row itself is kept.
    async fn delete_user_data(&self, user_id: &str) -> Result<DeletionReport, MnemeError>;

    // --- Documents, chunks, vectors ---

    /// Inserts a document unless the user already has one with
    /// byte-identical content. The row is committed before returning.
    async fn insert_document(&self, document: &Document) -> Result<InsertOutcome, MnemeError>;

    /// Shallow-merges `patch` into a document's metadata object.
    async fn merge_document_metadata(
        &self,
        document_id: &str,
        patch: &Metadata,
    ) -> Result<(), MnemeError>;

    async fn insert_chunk(&self, chunk: &Chunk) -> Result<(), MnemeError>;

    async fn insert_vector(&self, vector: &VectorRecord) -> Result<(), MnemeError>;

    /// Writes a document's chunks and vectors in one transaction.
    ///
    /// Either every pair is committed or none is.
    async fn insert_chunk_group(
        &self,
        group: &[(Chunk, VectorRecord)],
    ) -> Result<usize, MnemeError>;

    async fn get_vectors_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<(String, Vec<f32>)>, MnemeError>;

    /// Vectors joined with document source and creation time, restricted to
    /// `sources` when given. Returned in stable scan order.
    async fn get_vector_candidates(
        &self,
        user_id: &str,
        sources: Option<&[SourceTag]>,
    ) -> Result<Vec<VectorCandidate>, MnemeError>;

    async fn get_chunk_text(&self, chunk_id: &str) -> Result<Option<String>, MnemeError>;

    async fn get_chunk_with_document_metadata(
        &self,
        chunk_id: &str,
    ) -> Result<Option<ChunkContext>, MnemeError>;

    /// Most recently created chunks, newest first.
    async fn get_recent_chunks_by_user(
        &self,
        user_id: &str,
        limit: usize,
        sources: Option<&[SourceTag]>,
    ) -> Result<Vec<RecentChunk>, MnemeError>;

    /// Documents of the user that have no chunks.
    async fn find_orphan_documents(&self, user_id: &str) -> Result<Vec<String>, MnemeError>;

    async fn delete_documents(&self, document_ids: &[String]) -> Result<usize, MnemeError>;

    async fn list_connected_sources(
        &self,
        user_id: &str,
    ) -> Result<Vec<ConnectedSource>, MnemeError>;

    // --- Persona and relationships ---

    async fn get_persona(&self, user_id: &str) -> Result<Option<PersonaVector>, MnemeError>;

    async fn save_persona(&self, persona: &PersonaVector) -> Result<(), MnemeError>;

    async fn get_relationship(
        &self,
        user_id: &str,
        counterpart_id: &str,
    ) -> Result<Option<RelationshipProfile>, MnemeError>;

    async fn upsert_relationship(&self, profile: &RelationshipProfile) -> Result<(), MnemeError>;

    // --- Conversation turns ---

    async fn record_turn(&self, turn: &DialogueTurn) -> Result<(), MnemeError>;

    /// The most recent `limit` turns of a conversation, oldest first.
    async fn get_recent_turns(
        &self,
        user_id: &str,
        conversation_id: &str,
        limit: usize,
    ) -> Result<Vec<DialogueTurn>, MnemeError>;

    /// Deletes turns created before `cutoff` (ISO 8601). Returns rows removed.
    async fn delete_turns_before(&self, user_id: &str, cutoff: &str) -> Result<usize, MnemeError>;
}
