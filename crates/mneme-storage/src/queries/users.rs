// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User registry and whole-user data deletion.

use mneme_core::types::{now_timestamp, DeletionReport, User};
use mneme_core::MnemeError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;

/// Return the user, creating the row if it does not exist.
///
/// A non-empty `display_name` replaces the stored one.
pub async fn ensure_user(
    db: &Database,
    user_id: &str,
    display_name: Option<&str>,
) -> Result<User, MnemeError> {
    let user_id = user_id.to_string();
    let display_name = display_name.map(str::to_string);
    let created_at = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<User, rusqlite::Error> {
            conn.execute(
                "INSERT INTO users (id, display_name, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                     display_name = COALESCE(excluded.display_name, users.display_name)",
                params![user_id, display_name, created_at],
            )?;
            conn.query_row(
                "SELECT id, display_name, created_at FROM users WHERE id = ?1",
                params![user_id],
                row_to_user,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user by id.
pub async fn get_user(db: &Database, user_id: &str) -> Result<Option<User>, MnemeError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<User>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, display_name, created_at FROM users WHERE id = ?1",
                params![user_id],
                row_to_user,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete every document (chunks and vectors cascade) and conversation turn of a user.
///
/// The user row, persona and relationship profiles are kept.
pub async fn delete_user_data(db: &Database, user_id: &str) -> Result<DeletionReport, MnemeError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<DeletionReport, rusqlite::Error> {
            let tx = conn.transaction()?;
            let chunks: i64 = tx.query_row(
                "SELECT COUNT(*) FROM chunks WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;
            let vectors: i64 = tx.query_row(
                "SELECT COUNT(*) FROM vectors WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;
            let documents = tx.execute("DELETE FROM documents WHERE user_id = ?1", params![user_id])?;
            let turns = tx.execute(
                "DELETE FROM conversation_turns WHERE user_id = ?1",
                params![user_id],
            )?;
            tx.commit()?;
            Ok(DeletionReport {
                documents,
                chunks: chunks as usize,
                vectors: vectors as usize,
                turns,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        display_name: row.get(1)?,
        created_at: row.get(2)?,
    })
}
