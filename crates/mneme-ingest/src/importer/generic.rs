// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fallback importer for unrecognized exports: every known text format.

use std::path::Path;

use mneme_core::types::SourceTag;

use super::SourceImporter;
use crate::extract::FileFormat;

#[derive(Debug, Clone)]
pub struct GenericImporter {
    tag: SourceTag,
}

impl GenericImporter {
    pub fn new(tag: SourceTag) -> Self {
        Self { tag }
    }
}

impl SourceImporter for GenericImporter {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn format_for(&self, path: &Path) -> Option<FileFormat> {
        FileFormat::from_path(path)
    }

    fn source_for(&self, _path: &Path) -> SourceTag {
        self.tag
    }
}
