// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source importers and the shared import pipeline.
//!
//! An importer decides which files of an export it reads, how each file is
//! parsed and which [`SourceTag`] the resulting documents carry. Everything
//! after extraction (normalization, dedup, chunking, embedding, storage) is
//! shared by [`ImportPipeline`].

pub mod chat;
pub mod generic;
pub mod pipeline;
pub mod social;
pub mod takeout;

use std::path::Path;

use mneme_core::types::SourceTag;
use mneme_core::MnemeError;

use crate::extract::{extract_bytes, ExtractedRecord, FileFormat};

pub use chat::ChatImporter;
pub use generic::GenericImporter;
pub use pipeline::ImportPipeline;
pub use social::SocialImporter;
pub use takeout::TakeoutImporter;

/// Reads one kind of export.
pub trait SourceImporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Format used to parse `path`, or `None` if this importer skips it.
    fn format_for(&self, path: &Path) -> Option<FileFormat>;

    /// Source tag for documents extracted from `path`.
    fn source_for(&self, path: &Path) -> SourceTag;

    fn accepts(&self, path: &Path) -> bool {
        self.format_for(path).is_some()
    }

    fn extract(&self, path: &Path, raw: &[u8]) -> Result<Vec<ExtractedRecord>, MnemeError> {
        let format = self.format_for(path).ok_or_else(|| MnemeError::Import {
            path: path.display().to_string(),
            message: format!("unsupported by the {} importer", self.name()),
        })?;
        extract_bytes(path, raw, format)
    }
}

/// Importer for a detected (or hinted) source tag.
pub fn importer_for(tag: SourceTag) -> Box<dyn SourceImporter> {
    match tag {
        SourceTag::Mail | SourceTag::Drive | SourceTag::Calendar | SourceTag::Photos => {
            Box::new(TakeoutImporter::new(tag))
        }
        SourceTag::Chat => Box::new(ChatImporter),
        SourceTag::Social => Box::new(SocialImporter),
        SourceTag::Media | SourceTag::Unknown => Box::new(GenericImporter::new(tag)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_has_an_importer() {
        assert_eq!(importer_for(SourceTag::Mail).name(), "takeout");
        assert_eq!(importer_for(SourceTag::Photos).name(), "takeout");
        assert_eq!(importer_for(SourceTag::Chat).name(), "chat");
        assert_eq!(importer_for(SourceTag::Social).name(), "social");
        assert_eq!(importer_for(SourceTag::Unknown).name(), "generic");
    }

    #[test]
    fn skipped_files_cannot_be_extracted() {
        let importer = importer_for(SourceTag::Chat);
        let result = importer.extract(Path::new("song.mp3"), b"ID3");
        assert!(matches!(result, Err(MnemeError::Import { .. })));
    }
}
