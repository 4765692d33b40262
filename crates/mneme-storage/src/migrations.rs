// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema migrations, embedded from `migrations/` at compile time.

use mneme_core::MnemeError;
use tracing::info;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Bring the schema up to date. Already-applied versions are skipped.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), MnemeError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(MnemeError::storage)?;
    for migration in report.applied_migrations() {
        info!(version = migration.version(), name = migration.name(), "schema migrated");
    }
    Ok(())
}
