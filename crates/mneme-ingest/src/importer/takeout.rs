// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account-export archives with per-product folders (mail, drive, calendar,
//! photos). The source tag is chosen per file from its folder.

use std::path::Path;

use mneme_core::types::SourceTag;

use super::SourceImporter;
use crate::extract::FileFormat;

#[derive(Debug, Clone)]
pub struct TakeoutImporter {
    fallback: SourceTag,
}

impl TakeoutImporter {
    /// `fallback` tags files outside any recognized product folder.
    pub fn new(fallback: SourceTag) -> Self {
        Self { fallback }
    }
}

impl SourceImporter for TakeoutImporter {
    fn name(&self) -> &'static str {
        "takeout"
    }

    fn format_for(&self, path: &Path) -> Option<FileFormat> {
        FileFormat::from_path(path)
    }

    fn source_for(&self, path: &Path) -> SourceTag {
        match FileFormat::from_path(path) {
            Some(FileFormat::Mbox | FileFormat::Eml) => return SourceTag::Mail,
            Some(FileFormat::Calendar) => return SourceTag::Calendar,
            _ => {}
        }
        for component in path.components().rev().skip(1) {
            let name = component.as_os_str().to_string_lossy().to_lowercase();
            let tag = match name.as_str() {
                "mail" | "gmail" => SourceTag::Mail,
                "calendar" => SourceTag::Calendar,
                "google photos" | "google fotos" | "photos" => SourceTag::Photos,
                "drive" | "google drive" => SourceTag::Drive,
                _ => continue,
            };
            return tag;
        }
        self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_follows_product_folder() {
        let importer = TakeoutImporter::new(SourceTag::Mail);
        assert_eq!(
            importer.source_for(Path::new("Takeout/Drive/Notes/plan.html")),
            SourceTag::Drive
        );
        assert_eq!(
            importer.source_for(Path::new("Takeout/Google Photos/Trip/IMG_1.jpg.json")),
            SourceTag::Photos
        );
        assert_eq!(
            importer.source_for(Path::new("Takeout/Calendar/me.ics")),
            SourceTag::Calendar
        );
        assert_eq!(
            importer.source_for(Path::new("Takeout/Mail/inbox.mbox")),
            SourceTag::Mail
        );
        assert_eq!(
            importer.source_for(Path::new("Takeout/archive_browser.html")),
            SourceTag::Mail
        );
    }

    #[test]
    fn media_files_are_skipped() {
        let importer = TakeoutImporter::new(SourceTag::Mail);
        assert!(!importer.accepts(Path::new("Takeout/Google Photos/IMG_1.jpg")));
        assert!(importer.accepts(Path::new("Takeout/Google Photos/IMG_1.jpg.json")));
    }
}
