// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the ingest, storage, retrieval and
//! context crates.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Open key-value metadata attached to documents and chunks.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Origin of an imported document.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SourceTag {
    Mail,
    Drive,
    Calendar,
    Photos,
    Chat,
    Social,
    Media,
    Unknown,
}

impl SourceTag {
    /// Convert to string for SQLite storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::Mail => "mail",
            SourceTag::Drive => "drive",
            SourceTag::Calendar => "calendar",
            SourceTag::Photos => "photos",
            SourceTag::Chat => "chat",
            SourceTag::Social => "social",
            SourceTag::Media => "media",
            SourceTag::Unknown => "unknown",
        }
    }

    /// Parse from SQLite string. Unrecognized values map to `Unknown`.
    pub fn from_str_value(s: &str) -> Self {
        s.parse().unwrap_or(SourceTag::Unknown)
    }

    /// Human-readable label used in rendered instructions.
    pub fn label(&self) -> &'static str {
        match self {
            SourceTag::Mail => "email",
            SourceTag::Drive => "cloud documents",
            SourceTag::Calendar => "calendar events",
            SourceTag::Photos => "photo library metadata",
            SourceTag::Chat => "chat history",
            SourceTag::Social => "social media archive",
            SourceTag::Media => "media files",
            SourceTag::Unknown => "other files",
        }
    }
}

/// A registered user whose data is partitioned under `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
    pub created_at: String,
}

/// One imported record (an email, a chat conversation, a post, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub user_id: String,
    pub source: SourceTag,
    /// MIME-like content type of the original record (e.g. `message/rfc822`).
    pub content_type: String,
    pub title: Option<String>,
    /// Full normalized text.
    pub content: String,
    pub metadata: Metadata,
    /// ISO 8601 creation timestamp of the original record.
    pub created_at: String,
}

/// A bounded slice of a document's normalized text; the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub user_id: String,
    /// Zero-based, gap-free position within the parent document.
    pub seq_index: u32,
    pub text: String,
    pub metadata: Metadata,
}

/// Embedding of one chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    pub chunk_id: String,
    pub user_id: String,
    pub values: Vec<f32>,
}

impl VectorRecord {
    pub fn dimensions(&self) -> usize {
        self.values.len()
    }
}

/// Result of a dedup-aware document insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The document was written under this id.
    Inserted(String),
    /// Byte-identical content already exists for the user; nothing was written.
    Duplicate { existing_id: String },
}

impl InsertOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, InsertOutcome::Duplicate { .. })
    }
}

/// A chunk joined with its parent document's provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkContext {
    pub chunk_id: String,
    pub document_id: String,
    pub source: SourceTag,
    pub title: Option<String>,
    pub text: String,
    pub metadata: Metadata,
    /// Creation time of the parent document.
    pub created_at: String,
}

/// A stored vector together with the fields hybrid scoring needs.
#[derive(Debug, Clone)]
pub struct VectorCandidate {
    pub chunk_id: String,
    pub values: Vec<f32>,
    pub source: SourceTag,
    pub created_at: String,
}

/// A chunk returned by the recency query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentChunk {
    pub chunk_id: String,
    pub text: String,
    pub source: SourceTag,
    pub created_at: String,
}

/// A retrieved memory excerpt with its ranking score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedMemory {
    pub chunk_id: String,
    pub score: f32,
    pub text: String,
    pub source: SourceTag,
    pub created_at: String,
    /// True when this entry came from the recency fallback rather than a
    /// semantic match.
    pub fallback: bool,
}

/// Per-source document count for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectedSource {
    pub source: SourceTag,
    pub document_count: u64,
    pub last_imported_at: Option<String>,
}

/// Rows removed by a user-data deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub documents: usize,
    pub chunks: usize,
    pub vectors: usize,
    pub turns: usize,
}

/// Who produced a dialogue turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The person the persona is talking to.
    User,
    /// The persona's own reply.
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }

    pub fn from_str_value(s: &str) -> Self {
        match s {
            "assistant" => TurnRole::Assistant,
            _ => TurnRole::User,
        }
    }
}

/// One logged dialogue turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueTurn {
    pub id: String,
    pub user_id: String,
    pub conversation_id: String,
    pub counterpart_id: Option<String>,
    pub role: TurnRole,
    pub content: String,
    pub created_at: String,
}

/// Closeness and tone between a user and one conversation counterpart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipProfile {
    pub user_id: String,
    pub counterpart_id: String,
    pub display_name: Option<String>,
    /// Free-form tag such as `friend`, `family`, `colleague`.
    pub relationship_type: String,
    /// Closeness in [0, 1].
    pub intimacy_level: f64,
    /// Interactions per week, non-negative.
    pub interaction_frequency: f64,
    /// Average tone in [-1, 1].
    pub emotional_tone: f64,
    pub topics: Vec<String>,
    pub total_interactions: u64,
    pub first_interaction_at: Option<String>,
    pub last_interaction_at: Option<String>,
}

impl RelationshipProfile {
    /// A neutral profile for a counterpart seen for the first time.
    pub fn new(user_id: impl Into<String>, counterpart_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            counterpart_id: counterpart_id.into(),
            display_name: None,
            relationship_type: "acquaintance".to_string(),
            intimacy_level: 0.5,
            interaction_frequency: 0.0,
            emotional_tone: 0.0,
            topics: Vec::new(),
            total_interactions: 0,
            first_interaction_at: None,
            last_interaction_at: None,
        }
    }
}

/// Aggregate counters returned by an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub files_seen: usize,
    pub files_failed: usize,
    pub documents_inserted: usize,
    pub duplicates_skipped: usize,
    pub chunks_inserted: usize,
    pub source_tag: Option<SourceTag>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Embedding,
    Generation,
}

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
    /// Requested vector length.
    pub dimensions: usize,
}

/// Output from an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

/// One message passed to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationMessage {
    pub role: String,
    pub content: String,
}

/// A request to the external generation service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    /// Rendered instructions from the context builder.
    pub instructions: String,
    /// Raw dialogue turns, oldest first, ending with the current message.
    pub messages: Vec<GenerationMessage>,
}

/// A single chunk from a streaming generation response.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationChunk {
    pub text: String,
}

/// Current UTC time as an ISO 8601 string with millisecond precision.
///
/// All timestamps in the store use this format so that lexicographic
/// ordering in SQL matches chronological ordering.
pub fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

/// Formats a UTC time in the store's canonical timestamp format.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Compute cosine similarity between two vectors.
///
/// For L2-normalized vectors this is the dot product. Returns an error
/// if the dimensionalities differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, crate::MnemeError> {
    if a.len() != b.len() {
        return Err(crate::MnemeError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
