// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry point for importing one unpacked export directory.

use std::path::Path;
use std::sync::Arc;

use mneme_config::model::IngestConfig;
use mneme_core::traits::{EmbeddingAdapter, StorageAdapter};
use mneme_core::types::{ImportReport, SourceTag};
use mneme_core::MnemeError;
use tracing::info;

use crate::detector::SourceDetector;
use crate::importer::{importer_for, ImportPipeline};

/// Detects the export type of a directory and runs the matching importer.
pub struct ImportCoordinator {
    storage: Arc<dyn StorageAdapter>,
    pipeline: ImportPipeline,
    detector: SourceDetector,
}

impl ImportCoordinator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: &IngestConfig,
        dimensions: usize,
    ) -> Result<Self, MnemeError> {
        Ok(Self {
            pipeline: ImportPipeline::new(storage.clone(), embedder, config, dimensions)?,
            storage,
            detector: SourceDetector::new(config),
        })
    }

    /// Detect the export type of `dir` without importing anything.
    pub async fn detect(&self, dir: &Path) -> Result<SourceTag, MnemeError> {
        let detector = self.detector.clone();
        let dir = dir.to_path_buf();
        tokio::task::spawn_blocking(move || detector.detect(&dir))
            .await
            .map_err(|e| MnemeError::Internal(format!("detection task failed: {e}")))
    }

    /// Import every supported file under `dir` for an existing user.
    ///
    /// `hint` skips detection. Orphan documents left by an interrupted
    /// earlier import are deleted first.
    pub async fn import_unified_data(
        &self,
        user_id: &str,
        dir: &Path,
        hint: Option<SourceTag>,
    ) -> Result<ImportReport, MnemeError> {
        if !dir.is_dir() {
            return Err(MnemeError::InvalidInput(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
        if self.storage.get_user(user_id).await?.is_none() {
            return Err(MnemeError::UserNotFound {
                user_id: user_id.to_string(),
            });
        }

        let orphans = self.storage.find_orphan_documents(user_id).await?;
        if !orphans.is_empty() {
            let removed = self.storage.delete_documents(&orphans).await?;
            info!(user_id, removed, "removed documents left by an interrupted import");
        }

        let tag = match hint {
            Some(tag) => tag,
            None => self.detect(dir).await?,
        };
        let importer = importer_for(tag);
        info!(
            user_id,
            dir = %dir.display(),
            %tag,
            importer = importer.name(),
            "import started"
        );

        let mut report = self.pipeline.run(user_id, dir, importer.as_ref()).await?;
        report.source_tag = Some(tag);
        info!(
            user_id,
            files_seen = report.files_seen,
            files_failed = report.files_failed,
            documents_inserted = report.documents_inserted,
            duplicates_skipped = report.duplicates_skipped,
            chunks_inserted = report.chunks_inserted,
            "import finished"
        );
        Ok(report)
    }
}
