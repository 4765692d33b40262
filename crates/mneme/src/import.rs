// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mneme import` command implementation.

use std::path::Path;

use mneme_core::types::SourceTag;
use mneme_core::{MnemeError, StorageAdapter};

use crate::app::App;
use crate::output::print_json;

/// Import an extracted export directory for `user_id`, registering the user
/// on first use.
pub async fn run_import(
    app: &App,
    user_id: &str,
    dir: &Path,
    hint: Option<SourceTag>,
    display_name: Option<&str>,
    json: bool,
) -> Result<(), MnemeError> {
    app.storage().ensure_user(user_id, display_name).await?;
    let coordinator = app.coordinator()?;
    let report = coordinator.import_unified_data(user_id, dir, hint).await?;

    if json {
        return print_json(&report);
    }
    let tag = report.source_tag.unwrap_or(SourceTag::Unknown);
    println!("Imported {} as {tag}", dir.display());
    println!("  files seen:          {}", report.files_seen);
    println!("  files failed:        {}", report.files_failed);
    println!("  documents inserted:  {}", report.documents_inserted);
    println!("  duplicates skipped:  {}", report.duplicates_skipped);
    println!("  chunks inserted:     {}", report.chunks_inserted);
    Ok(())
}

/// Print the detected export type without importing.
pub async fn run_detect(app: &App, dir: &Path) -> Result<(), MnemeError> {
    let tag = app.coordinator()?.detect(dir).await?;
    println!("{tag}");
    Ok(())
}
