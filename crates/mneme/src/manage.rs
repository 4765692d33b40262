// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mneme sources`, `mneme prune` and `mneme forget` command implementations.

use mneme_core::{MnemeError, StorageAdapter};
use tracing::warn;

use crate::app::App;
use crate::output::print_json;

pub async fn run_sources(app: &App, user_id: &str, json: bool) -> Result<(), MnemeError> {
    app.require_user(user_id).await?;
    let sources = app.storage().list_connected_sources(user_id).await?;
    if json {
        return print_json(&sources);
    }
    if sources.is_empty() {
        println!("Nothing imported for {user_id} yet.");
        return Ok(());
    }
    for source in &sources {
        println!(
            "{:<10} {:>6} documents  last import {}",
            source.source.as_str(),
            source.document_count,
            source.last_imported_at.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

/// Delete conversation turns older than `days` (default: `conversation.retention_days`).
pub async fn run_prune(app: &App, user_id: &str, days: Option<u32>) -> Result<(), MnemeError> {
    app.require_user(user_id).await?;
    let days = days.unwrap_or(app.config.conversation.retention_days);
    let removed = app.assembler().prune_turns(user_id, days).await?;
    println!("Removed {removed} conversation turns older than {days} days.");
    Ok(())
}

/// Delete every imported document and conversation turn of the user.
pub async fn run_forget(app: &App, user_id: &str, confirmed: bool) -> Result<(), MnemeError> {
    if !confirmed {
        return Err(MnemeError::InvalidInput(
            "refusing to delete without --yes".to_string(),
        ));
    }
    app.require_user(user_id).await?;
    let report = app.storage().delete_user_data(user_id).await?;
    warn!(
        user_id,
        documents = report.documents,
        chunks = report.chunks,
        turns = report.turns,
        "user data deleted"
    );
    println!(
        "Deleted {} documents, {} chunks, {} vectors and {} conversation turns.",
        report.documents, report.chunks, report.vectors, report.turns
    );
    Ok(())
}
