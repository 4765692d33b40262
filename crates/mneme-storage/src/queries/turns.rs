// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation turn log and retention.

use mneme_core::types::{DialogueTurn, TurnRole};
use mneme_core::MnemeError;
use rusqlite::params;

use crate::database::Database;

/// Append a dialogue turn.
pub async fn record_turn(db: &Database, turn: &DialogueTurn) -> Result<(), MnemeError> {
    let turn = turn.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO conversation_turns
                     (id, user_id, conversation_id, counterpart_id, role, content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    turn.id,
                    turn.user_id,
                    turn.conversation_id,
                    turn.counterpart_id,
                    turn.role.as_str(),
                    turn.content,
                    turn.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recent `limit` turns of a conversation, returned oldest first.
pub async fn get_recent_turns(
    db: &Database,
    user_id: &str,
    conversation_id: &str,
    limit: usize,
) -> Result<Vec<DialogueTurn>, MnemeError> {
    let user_id = user_id.to_string();
    let conversation_id = conversation_id.to_string();
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let mut turns = db
        .connection()
        .call(move |conn| -> Result<Vec<DialogueTurn>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, conversation_id, counterpart_id, role, content, created_at
                 FROM conversation_turns
                 WHERE user_id = ?1 AND conversation_id = ?2
                 ORDER BY created_at DESC, rowid DESC
                 LIMIT ?3",
            )?;
            let rows = stmt.query_map(params![user_id, conversation_id, limit], |row| {
                let role: String = row.get(4)?;
                Ok(DialogueTurn {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    conversation_id: row.get(2)?,
                    counterpart_id: row.get(3)?,
                    role: TurnRole::from_str_value(&role),
                    content: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    turns.reverse();
    Ok(turns)
}

/// Delete a user's turns created strictly before `cutoff`. Returns rows removed.
pub async fn delete_turns_before(
    db: &Database,
    user_id: &str,
    cutoff: &str,
) -> Result<usize, MnemeError> {
    let user_id = user_id.to_string();
    let cutoff = cutoff.to_string();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "DELETE FROM conversation_turns WHERE user_id = ?1 AND created_at < ?2",
                params![user_id, cutoff],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
