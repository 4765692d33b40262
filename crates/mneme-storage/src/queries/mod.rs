// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod chunks;
pub mod documents;
pub mod personas;
pub mod relationships;
pub mod turns;
pub mod users;

#[cfg(test)]
pub(crate) mod test_support {
    use mneme_core::types::{Document, Metadata, SourceTag};

    use crate::database::Database;
    use crate::queries::users::ensure_user;

    /// In-memory database with users `u1` and `u2`.
    pub(crate) async fn setup() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        ensure_user(&db, "u1", None).await.unwrap();
        ensure_user(&db, "u2", None).await.unwrap();
        db
    }

    pub(crate) fn make_document(id: &str, user: &str, source: SourceTag, content: &str) -> Document {
        Document {
            id: id.to_string(),
            user_id: user.to_string(),
            source,
            content_type: "text/plain".to_string(),
            title: Some(format!("title {id}")),
            content: content.to_string(),
            metadata: Metadata::new(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }
}
