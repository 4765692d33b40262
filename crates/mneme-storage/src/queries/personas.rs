// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona persistence. The full trait profile is stored as one JSON document.

use mneme_core::{MnemeError, PersonaVector};
use rusqlite::{params, OptionalExtension};

use crate::database::Database;

/// Load the stored persona of a user.
pub async fn get_persona(db: &Database, user_id: &str) -> Result<Option<PersonaVector>, MnemeError> {
    let user_id = user_id.to_string();
    let raw = db
        .connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT profile FROM personas WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    raw.map(|json| serde_json::from_str(&json).map_err(MnemeError::storage))
        .transpose()
}

/// Insert or replace a user's persona.
pub async fn save_persona(db: &Database, persona: &PersonaVector) -> Result<(), MnemeError> {
    let profile = serde_json::to_string(persona)
        .map_err(|e| MnemeError::Internal(format!("persona encode: {e}")))?;
    let user_id = persona.user_id.clone();
    let version = persona.version;
    let updated_at = persona.updated_at.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO personas (user_id, version, profile, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id) DO UPDATE SET
                     version = excluded.version,
                     profile = excluded.profile,
                     updated_at = excluded.updated_at",
                params![user_id, version, profile, updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::setup;

    #[tokio::test]
    async fn missing_persona_is_none() {
        let db = setup().await;
        assert!(get_persona(&db, "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_then_load_and_replace() {
        let db = setup().await;
        let mut persona = PersonaVector::neutral("u1", "2026-01-01T00:00:00.000Z");
        persona.linguistic.catchphrases = vec!["no worries".to_string()];
        save_persona(&db, &persona).await.unwrap();
        assert_eq!(get_persona(&db, "u1").await.unwrap(), Some(persona.clone()));

        persona.version = 2;
        persona.linguistic.formality_level = 0.9;
        save_persona(&db, &persona).await.unwrap();
        let loaded = get_persona(&db, "u1").await.unwrap().unwrap();
        assert_eq!(loaded.version, 2);
        assert!((loaded.linguistic.formality_level - 0.9).abs() < 1e-9);
    }

    #[tokio::test]
    async fn persona_requires_user_row() {
        let db = setup().await;
        let persona = PersonaVector::neutral("ghost", "2026-01-01T00:00:00.000Z");
        assert!(save_persona(&db, &persona).await.is_err());
    }
}
