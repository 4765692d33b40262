// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Social network archives: message threads, posts and profile pages.

use std::path::Path;

use mneme_core::types::SourceTag;

use super::SourceImporter;
use crate::extract::FileFormat;

#[derive(Debug, Clone, Copy, Default)]
pub struct SocialImporter;

impl SourceImporter for SocialImporter {
    fn name(&self) -> &'static str {
        "social"
    }

    fn format_for(&self, path: &Path) -> Option<FileFormat> {
        match FileFormat::from_path(path)? {
            format @ (FileFormat::Json | FileFormat::Html | FileFormat::PlainText) => Some(format),
            _ => None,
        }
    }

    fn source_for(&self, _path: &Path) -> SourceTag {
        SourceTag::Social
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_json_becomes_one_document() {
        let raw = br#"{"participants": [{"name": "Ana"}], "messages": [{"sender_name": "Ana", "timestamp_ms": 1700000000000, "content": "hey"}]}"#;
        let records = SocialImporter
            .extract(Path::new("messages/inbox/ana/message_1.json"), raw)
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Ana: hey");
        assert_eq!(records[0].metadata["file"], "message_1.json");
    }

    #[test]
    fn images_are_skipped() {
        assert!(!SocialImporter.accepts(Path::new("media/posts/photo.jpg")));
        assert!(SocialImporter.accepts(Path::new("your_posts.html")));
    }
}
