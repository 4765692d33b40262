// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document writes with exact-content deduplication, orphan cleanup and
//! per-source summaries.

use mneme_core::types::{now_timestamp, ConnectedSource, Document, InsertOutcome, Metadata, SourceTag};
use mneme_core::MnemeError;
use rusqlite::{params, params_from_iter, OptionalExtension};
use sha2::{Digest, Sha256};

use crate::database::Database;

/// SHA-256 of the content, hex encoded. Used to find dedup candidates only;
/// equality is always confirmed on the full text.
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

pub(crate) fn metadata_to_json(metadata: &Metadata) -> Result<String, MnemeError> {
    serde_json::to_string(metadata).map_err(|e| MnemeError::Internal(format!("metadata encode: {e}")))
}

pub(crate) fn metadata_from_json(raw: &str) -> Metadata {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Insert a document unless the same user already owns one with identical content.
///
/// The lookup and the insert run in one transaction, so two concurrent writers
/// cannot both insert the same content.
pub async fn insert_document(db: &Database, document: &Document) -> Result<InsertOutcome, MnemeError> {
    let doc = document.clone();
    let hash = content_hash(&doc.content);
    let metadata = metadata_to_json(&doc.metadata)?;
    let imported_at = now_timestamp();
    db.connection()
        .call(move |conn| -> Result<InsertOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;
            let existing = {
                let mut stmt = tx.prepare(
                    "SELECT id, content FROM documents WHERE user_id = ?1 AND content_hash = ?2",
                )?;
                let mut rows = stmt.query(params![doc.user_id, hash])?;
                let mut found = None;
                while let Some(row) = rows.next()? {
                    let content: String = row.get(1)?;
                    if content == doc.content {
                        found = Some(row.get::<_, String>(0)?);
                        break;
                    }
                }
                found
            };
            if let Some(existing_id) = existing {
                return Ok(InsertOutcome::Duplicate { existing_id });
            }
            tx.execute(
                "INSERT INTO documents
                     (id, user_id, source, content_type, title, content, content_hash,
                      metadata, created_at, imported_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    doc.id,
                    doc.user_id,
                    doc.source.as_str(),
                    doc.content_type,
                    doc.title,
                    doc.content,
                    hash,
                    metadata,
                    doc.created_at,
                    imported_at,
                ],
            )?;
            tx.commit()?;
            Ok(InsertOutcome::Inserted(doc.id))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a document by id.
pub async fn get_document(db: &Database, document_id: &str) -> Result<Option<Document>, MnemeError> {
    let document_id = document_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<Document>, rusqlite::Error> {
            conn.query_row(
                "SELECT id, user_id, source, content_type, title, content, metadata, created_at
                 FROM documents WHERE id = ?1",
                params![document_id],
                |row| {
                    let source: String = row.get(2)?;
                    let metadata: String = row.get(6)?;
                    Ok(Document {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        source: SourceTag::from_str_value(&source),
                        content_type: row.get(3)?,
                        title: row.get(4)?,
                        content: row.get(5)?,
                        metadata: metadata_from_json(&metadata),
                        created_at: row.get(7)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Shallow-merge `patch` into a document's metadata object.
///
/// Keys in `patch` overwrite existing keys; every other column is untouched.
pub async fn merge_document_metadata(
    db: &Database,
    document_id: &str,
    patch: &Metadata,
) -> Result<(), MnemeError> {
    let id = document_id.to_string();
    let patch = patch.clone();
    let found = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let current: Option<String> = tx
                .query_row(
                    "SELECT metadata FROM documents WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(current) = current else {
                return Ok(false);
            };
            let mut merged = metadata_from_json(&current);
            for (key, value) in patch {
                merged.insert(key, value);
            }
            let encoded = serde_json::to_string(&merged)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            tx.execute(
                "UPDATE documents SET metadata = ?1 WHERE id = ?2",
                params![encoded, id],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if found {
        Ok(())
    } else {
        Err(MnemeError::InvalidInput(format!(
            "document {document_id} does not exist"
        )))
    }
}

/// Documents of the user that have no chunks, left behind by an interrupted import.
pub async fn find_orphan_documents(db: &Database, user_id: &str) -> Result<Vec<String>, MnemeError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT d.id FROM documents d
                 WHERE d.user_id = ?1
                   AND NOT EXISTS (SELECT 1 FROM chunks c WHERE c.document_id = d.id)
                 ORDER BY d.rowid",
            )?;
            let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete documents by id. Chunks and vectors cascade.
pub async fn delete_documents(db: &Database, document_ids: &[String]) -> Result<usize, MnemeError> {
    if document_ids.is_empty() {
        return Ok(0);
    }
    let ids = document_ids.to_vec();
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!("DELETE FROM documents WHERE id IN ({placeholders})");
            conn.execute(&sql, params_from_iter(ids.iter()))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Per-source document counts for a user, ordered by source name.
pub async fn list_connected_sources(
    db: &Database,
    user_id: &str,
) -> Result<Vec<ConnectedSource>, MnemeError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<ConnectedSource>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT source, COUNT(*), MAX(imported_at) FROM documents
                 WHERE user_id = ?1
                 GROUP BY source
                 ORDER BY source",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                let source: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok(ConnectedSource {
                    source: SourceTag::from_str_value(&source),
                    document_count: count as u64,
                    last_imported_at: row.get(2)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::test_support::{make_document, setup};

    #[test]
    fn content_hash_is_stable_hex() {
        let h = content_hash("hello");
        assert_eq!(h.len(), 64);
        assert_eq!(h, content_hash("hello"));
        assert_ne!(h, content_hash("hello "));
    }

    #[tokio::test]
    async fn identical_content_is_deduplicated_per_user() {
        let db = setup().await;
        let first = insert_document(&db, &make_document("d1", "u1", SourceTag::Mail, "same body"))
            .await
            .unwrap();
        assert_eq!(first, InsertOutcome::Inserted("d1".to_string()));

        let second = insert_document(&db, &make_document("d2", "u1", SourceTag::Drive, "same body"))
            .await
            .unwrap();
        assert_eq!(
            second,
            InsertOutcome::Duplicate {
                existing_id: "d1".to_string()
            }
        );

        // A different user may own the same text.
        let other = insert_document(&db, &make_document("d3", "u2", SourceTag::Mail, "same body"))
            .await
            .unwrap();
        assert!(!other.is_duplicate());
    }

    #[tokio::test]
    async fn document_for_unknown_user_is_rejected() {
        let db = setup().await;
        let result = insert_document(&db, &make_document("d1", "ghost", SourceTag::Mail, "x")).await;
        assert!(matches!(result, Err(MnemeError::Storage { .. })));
    }

    #[tokio::test]
    async fn metadata_merge_overwrites_only_given_keys() {
        let db = setup().await;
        let mut doc = make_document("d1", "u1", SourceTag::Mail, "body");
        doc.metadata.insert("from".into(), "a@example.com".into());
        doc.metadata.insert("labels".into(), serde_json::json!(["inbox"]));
        insert_document(&db, &doc).await.unwrap();

        let mut patch = Metadata::new();
        patch.insert("labels".into(), serde_json::json!(["archived"]));
        patch.insert("starred".into(), true.into());
        merge_document_metadata(&db, "d1", &patch).await.unwrap();

        let stored = get_document(&db, "d1").await.unwrap().unwrap();
        assert_eq!(stored.metadata["from"], "a@example.com");
        assert_eq!(stored.metadata["labels"], serde_json::json!(["archived"]));
        assert_eq!(stored.metadata["starred"], true);
        assert_eq!(stored.content, "body");
    }

    #[tokio::test]
    async fn metadata_merge_on_missing_document_fails() {
        let db = setup().await;
        let result = merge_document_metadata(&db, "nope", &Metadata::new()).await;
        assert!(matches!(result, Err(MnemeError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn documents_without_chunks_are_orphans() {
        let db = setup().await;
        insert_document(&db, &make_document("d1", "u1", SourceTag::Chat, "a"))
            .await
            .unwrap();
        insert_document(&db, &make_document("d2", "u1", SourceTag::Chat, "b"))
            .await
            .unwrap();
        let orphans = find_orphan_documents(&db, "u1").await.unwrap();
        assert_eq!(orphans, vec!["d1".to_string(), "d2".to_string()]);

        assert_eq!(delete_documents(&db, &orphans).await.unwrap(), 2);
        assert!(find_orphan_documents(&db, "u1").await.unwrap().is_empty());
        assert_eq!(delete_documents(&db, &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn connected_sources_reflect_stored_documents() {
        let db = setup().await;
        assert!(list_connected_sources(&db, "u1").await.unwrap().is_empty());

        insert_document(&db, &make_document("d1", "u1", SourceTag::Mail, "one"))
            .await
            .unwrap();
        insert_document(&db, &make_document("d2", "u1", SourceTag::Mail, "two"))
            .await
            .unwrap();
        insert_document(&db, &make_document("d3", "u1", SourceTag::Chat, "three"))
            .await
            .unwrap();

        let sources = list_connected_sources(&db, "u1").await.unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].source, SourceTag::Chat);
        assert_eq!(sources[0].document_count, 1);
        assert_eq!(sources[1].source, SourceTag::Mail);
        assert_eq!(sources[1].document_count, 2);
        assert!(sources[1].last_imported_at.is_some());
    }
}
