// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation memory assembler: gathers everything one reply needs into a
//! [`MemorySnapshot`].

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use mneme_config::model::ConversationConfig;
use mneme_core::types::{
    format_timestamp, now_timestamp, ConnectedSource, DialogueTurn, RelationshipProfile,
    RetrievedMemory, TurnRole,
};
use mneme_core::{MnemeError, PersonaVector, StorageAdapter};
use mneme_memory::{HybridRetriever, RetrievalOptions};
use mneme_persona::{ContextualAdjuster, EmotionalState, TimeBucket};
use serde::Serialize;
use tracing::{debug, info};

/// The incoming message a snapshot is built for.
#[derive(Debug, Clone)]
pub struct TurnContext {
    pub user_id: String,
    pub conversation_id: String,
    pub message: String,
    pub counterpart_id: Option<String>,
    /// Local time of the conversation; the offset selects the time-of-day bucket.
    pub at: DateTime<FixedOffset>,
}

impl TurnContext {
    pub fn new(user_id: &str, conversation_id: &str, message: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            conversation_id: conversation_id.to_string(),
            message: message.to_string(),
            counterpart_id: None,
            at: Utc::now().fixed_offset(),
        }
    }

    pub fn with_counterpart(mut self, counterpart_id: &str) -> Self {
        self.counterpart_id = Some(counterpart_id.to_string());
        self
    }

    pub fn at(mut self, at: DateTime<FixedOffset>) -> Self {
        self.at = at;
        self
    }
}

/// Everything known about the user for one reply. Built per request and
/// never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MemorySnapshot {
    pub user_id: String,
    pub conversation_id: String,
    pub message: String,
    /// Most recent turns, oldest first.
    pub history: Vec<DialogueTurn>,
    pub memories: Vec<RetrievedMemory>,
    pub relationship: Option<RelationshipProfile>,
    /// Persona after contextual adjustment.
    pub persona: PersonaVector,
    pub emotion: EmotionalState,
    pub time_bucket: TimeBucket,
    pub connected_sources: Vec<ConnectedSource>,
}

/// Builds snapshots and manages the dialogue log.
pub struct ConversationMemoryAssembler {
    storage: Arc<dyn StorageAdapter>,
    retriever: HybridRetriever,
    adjuster: ContextualAdjuster,
    retrieval: RetrievalOptions,
    history_window: usize,
}

impl ConversationMemoryAssembler {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        retriever: HybridRetriever,
        adjuster: ContextualAdjuster,
        retrieval: RetrievalOptions,
        config: &ConversationConfig,
    ) -> Self {
        Self {
            storage,
            retriever,
            adjuster,
            retrieval,
            history_window: config.history_window,
        }
    }

    /// Build the snapshot for `turn`.
    ///
    /// The incoming message should already be recorded with
    /// [`record_turn`](Self::record_turn) so that it counts towards the
    /// emotion estimate and appears in the dialogue tail.
    ///
    /// Fails with [`MnemeError::UserNotFound`] for unknown users and
    /// [`MnemeError::PersonaNotFound`] when no persona has been created yet.
    pub async fn build_snapshot(&self, turn: &TurnContext) -> Result<MemorySnapshot, MnemeError> {
        let user_id = turn.user_id.as_str();
        if self.storage.get_user(user_id).await?.is_none() {
            return Err(MnemeError::UserNotFound {
                user_id: user_id.to_string(),
            });
        }
        let persona = self
            .storage
            .get_persona(user_id)
            .await?
            .ok_or_else(|| MnemeError::PersonaNotFound {
                user_id: user_id.to_string(),
            })?;

        let history = self
            .storage
            .get_recent_turns(user_id, &turn.conversation_id, self.history_window)
            .await?;
        let memories = self
            .retriever
            .retrieve(user_id, &turn.message, &self.retrieval)
            .await?;
        let relationship = match &turn.counterpart_id {
            Some(counterpart) => self.storage.get_relationship(user_id, counterpart).await?,
            None => None,
        };
        let connected_sources = self.storage.list_connected_sources(user_id).await?;

        let adjusted = self
            .adjuster
            .adjust(&persona, relationship.as_ref(), turn.at, &history);

        debug!(
            user_id,
            conversation_id = %turn.conversation_id,
            history = history.len(),
            memories = memories.len(),
            has_relationship = relationship.is_some(),
            "memory snapshot assembled"
        );

        Ok(MemorySnapshot {
            user_id: user_id.to_string(),
            conversation_id: turn.conversation_id.clone(),
            message: turn.message.clone(),
            history,
            memories,
            relationship,
            persona: adjusted.persona,
            emotion: adjusted.emotion,
            time_bucket: adjusted.time_bucket,
            connected_sources,
        })
    }

    /// Append a turn to the dialogue log.
    pub async fn record_turn(
        &self,
        turn: &TurnContext,
        role: TurnRole,
        content: &str,
    ) -> Result<DialogueTurn, MnemeError> {
        let record = DialogueTurn {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: turn.user_id.clone(),
            conversation_id: turn.conversation_id.clone(),
            counterpart_id: turn.counterpart_id.clone(),
            role,
            content: content.to_string(),
            created_at: now_timestamp(),
        };
        self.storage.record_turn(&record).await?;
        Ok(record)
    }

    /// Delete turns older than `older_than_days`. Documents, chunks and
    /// vectors are untouched. Returns the number of turns removed.
    pub async fn prune_turns(&self, user_id: &str, older_than_days: u32) -> Result<usize, MnemeError> {
        self.prune_turns_at(user_id, older_than_days, Utc::now()).await
    }

    /// [`prune_turns`](Self::prune_turns) with an explicit clock.
    pub async fn prune_turns_at(
        &self,
        user_id: &str,
        older_than_days: u32,
        now: DateTime<Utc>,
    ) -> Result<usize, MnemeError> {
        let cutoff = format_timestamp(&(now - Duration::days(i64::from(older_than_days))));
        let removed = self.storage.delete_turns_before(user_id, &cutoff).await?;
        info!(user_id, older_than_days, removed, "pruned conversation turns");
        Ok(removed)
    }
}
