// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat application exports: line-oriented text logs and JSON chat dumps.

use std::path::Path;

use mneme_core::types::SourceTag;

use super::SourceImporter;
use crate::extract::FileFormat;

#[derive(Debug, Clone, Copy, Default)]
pub struct ChatImporter;

impl SourceImporter for ChatImporter {
    fn name(&self) -> &'static str {
        "chat"
    }

    fn format_for(&self, path: &Path) -> Option<FileFormat> {
        match FileFormat::from_path(path)? {
            FileFormat::PlainText => Some(FileFormat::ChatText),
            format @ (FileFormat::Json | FileFormat::Html) => Some(format),
            _ => None,
        }
    }

    fn source_for(&self, _path: &Path) -> SourceTag {
        SourceTag::Chat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_logs_are_parsed_as_chat() {
        assert_eq!(
            ChatImporter.format_for(Path::new("WhatsApp Chat with Ana.txt")),
            Some(FileFormat::ChatText)
        );
        assert_eq!(ChatImporter.format_for(Path::new("result.json")), Some(FileFormat::Json));
        assert_eq!(ChatImporter.format_for(Path::new("inbox.mbox")), None);
    }

    #[test]
    fn chat_log_extracts_messages() {
        let raw = b"[01/02/2024, 10:00:00] Ana: hello\n[01/02/2024, 10:01:00] Ben: hi\n";
        let records = ChatImporter.extract(Path::new("chat.txt"), raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Ana: hello\nBen: hi");
    }
}
