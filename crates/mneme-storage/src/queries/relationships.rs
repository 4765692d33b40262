// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relationship profiles keyed by (user, counterpart).

use mneme_core::types::{now_timestamp, RelationshipProfile};
use mneme_core::MnemeError;
use rusqlite::{params, OptionalExtension};

use crate::database::Database;

pub async fn get_relationship(
    db: &Database,
    user_id: &str,
    counterpart_id: &str,
) -> Result<Option<RelationshipProfile>, MnemeError> {
    let user_id = user_id.to_string();
    let counterpart_id = counterpart_id.to_string();
    let raw = db
        .connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT profile FROM relationships WHERE user_id = ?1 AND counterpart_id = ?2",
                params![user_id, counterpart_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    raw.map(|json| serde_json::from_str(&json).map_err(MnemeError::storage))
        .transpose()
}

pub async fn upsert_relationship(
    db: &Database,
    profile: &RelationshipProfile,
) -> Result<(), MnemeError> {
    let json = serde_json::to_string(profile)
        .map_err(|e| MnemeError::Internal(format!("relationship encode: {e}")))?;
    let user_id = profile.user_id.clone();
    let counterpart_id = profile.counterpart_id.clone();
    let updated_at = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO relationships (user_id, counterpart_id, profile, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, counterpart_id) DO UPDATE SET
                     profile = excluded.profile,
                     updated_at = excluded.updated_at",
                params![user_id, counterpart_id, json, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
