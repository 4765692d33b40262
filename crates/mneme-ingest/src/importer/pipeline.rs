// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared import flow: enumerate, extract, normalize, deduplicate, chunk,
//! embed and store.
//!
//! A document row is committed before its chunks. Chunks and vectors of one
//! document are then written in a single transaction, so a crash between the
//! two leaves at most an orphan document that the next import removes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mneme_config::model::IngestConfig;
use mneme_core::traits::{EmbeddingAdapter, StorageAdapter};
use mneme_core::types::{
    now_timestamp, Chunk, Document, EmbeddingInput, ImportReport, InsertOutcome, SourceTag,
    VectorRecord,
};
use mneme_core::MnemeError;
use tracing::{debug, warn};
use uuid::Uuid;

use super::SourceImporter;
use crate::chunker::{chunk, ChunkConfig};
use crate::extract::ExtractedRecord;
use crate::normalize::normalize;

/// Runs an importer over a directory and persists what it extracts.
pub struct ImportPipeline {
    storage: Arc<dyn StorageAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    chunking: ChunkConfig,
    max_file_bytes: u64,
    dimensions: usize,
}

impl ImportPipeline {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &IngestConfig,
        dimensions: usize,
    ) -> Result<Self, MnemeError> {
        Ok(Self {
            storage,
            embedder,
            chunking: ChunkConfig::from_ingest(config)?,
            max_file_bytes: config.max_file_bytes,
            dimensions,
        })
    }

    /// Import every file under `root` the importer accepts.
    ///
    /// Per-file failures are logged and counted; they never abort the run.
    pub async fn run(
        &self,
        user_id: &str,
        root: &Path,
        importer: &dyn SourceImporter,
    ) -> Result<ImportReport, MnemeError> {
        let walk_root = root.to_path_buf();
        let files = tokio::task::spawn_blocking(move || collect_files(&walk_root))
            .await
            .map_err(|e| MnemeError::Internal(format!("file walk task failed: {e}")))?
            .map_err(|e| import_error(root, e))?;

        let mut report = ImportReport::default();
        for path in files.iter().filter(|p| importer.accepts(p)) {
            report.files_seen += 1;
            if let Err(e) = self.import_file(user_id, path, importer, &mut report).await {
                report.files_failed += 1;
                warn!(
                    importer = importer.name(),
                    path = %path.display(),
                    error = %e,
                    "file import failed"
                );
            }
        }
        debug!(importer = importer.name(), ?report, "import pass finished");
        Ok(report)
    }

    async fn import_file(
        &self,
        user_id: &str,
        path: &Path,
        importer: &dyn SourceImporter,
        report: &mut ImportReport,
    ) -> Result<(), MnemeError> {
        let size = tokio::fs::metadata(path)
            .await
            .map_err(|e| import_error(path, e))?
            .len();
        if size > self.max_file_bytes {
            return Err(MnemeError::Import {
                path: path.display().to_string(),
                message: format!("file is {size} bytes, limit is {}", self.max_file_bytes),
            });
        }
        let raw = tokio::fs::read(path).await.map_err(|e| import_error(path, e))?;
        let records = importer.extract(path, &raw)?;
        let source = importer.source_for(path);

        let mut first_error = None;
        for record in records {
            if let Err(e) = self.store_record(user_id, source, record, report).await {
                debug!(path = %path.display(), error = %e, "record not stored");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Normalize, deduplicate and persist one extracted record.
    ///
    /// Records whose normalized text is empty are skipped silently.
    pub async fn store_record(
        &self,
        user_id: &str,
        source: SourceTag,
        record: ExtractedRecord,
        report: &mut ImportReport,
    ) -> Result<(), MnemeError> {
        let content = normalize(&record.text);
        if content.is_empty() {
            return Ok(());
        }
        let document = Document {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            source,
            content_type: record.content_type,
            title: record.title.map(|t| normalize(&t)).filter(|t| !t.is_empty()),
            content,
            metadata: record.metadata,
            created_at: record.created_at.unwrap_or_else(now_timestamp),
        };

        let document_id = match self.storage.insert_document(&document).await? {
            InsertOutcome::Inserted(id) => id,
            InsertOutcome::Duplicate { existing_id } => {
                report.duplicates_skipped += 1;
                debug!(%existing_id, %source, "duplicate content skipped");
                return Ok(());
            }
        };

        match self.write_chunks(&document).await {
            Ok(written) => {
                report.documents_inserted += 1;
                report.chunks_inserted += written;
                Ok(())
            }
            Err(e) => {
                // Leave no orphan behind, or the content would dedup against it forever.
                if let Err(cleanup) = self.storage.delete_documents(&[document_id]).await {
                    warn!(error = %cleanup, "failed to remove document after chunk write failure");
                }
                Err(e)
            }
        }
    }

    async fn write_chunks(&self, document: &Document) -> Result<usize, MnemeError> {
        let pieces = chunk(&document.content, self.chunking);
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: pieces.clone(),
                dimensions: self.dimensions,
            })
            .await?;
        if output.embeddings.len() != pieces.len() {
            return Err(MnemeError::Internal(format!(
                "embedder returned {} vectors for {} chunks",
                output.embeddings.len(),
                pieces.len()
            )));
        }

        let count = pieces.len();
        let group: Vec<(Chunk, VectorRecord)> = pieces
            .into_iter()
            .zip(output.embeddings)
            .enumerate()
            .map(|(index, (text, values))| {
                let chunk_id = Uuid::new_v4().to_string();
                let mut metadata = document.metadata.clone();
                metadata.insert("chunk_index".to_string(), index.into());
                metadata.insert("chunk_count".to_string(), count.into());
                let chunk = Chunk {
                    id: chunk_id.clone(),
                    document_id: document.id.clone(),
                    user_id: document.user_id.clone(),
                    seq_index: index as u32,
                    text,
                    metadata,
                };
                let vector = VectorRecord {
                    chunk_id,
                    user_id: document.user_id.clone(),
                    values,
                };
                (chunk, vector)
            })
            .collect();
        self.storage.insert_chunk_group(&group).await
    }
}

fn import_error(path: &Path, err: std::io::Error) -> MnemeError {
    MnemeError::Import {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Regular files under `root`, recursively, sorted by path. Hidden entries
/// and symlinks are skipped.
pub fn collect_files(root: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file() {
                files.push(entry.path());
            }
        }
    }
    files.sort();
    Ok(files)
}
