// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chunk and vector storage, plus the read paths used by retrieval.

use mneme_core::types::{
    blob_to_vec, vec_to_blob, Chunk, ChunkContext, RecentChunk, SourceTag, VectorCandidate,
    VectorRecord,
};
use mneme_core::MnemeError;
use rusqlite::{params, params_from_iter, OptionalExtension, Transaction};

use crate::database::Database;
use crate::queries::documents::{metadata_from_json, metadata_to_json};

fn write_chunk(conn: &rusqlite::Connection, chunk: &Chunk, metadata: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO chunks (id, document_id, user_id, seq_index, text, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            chunk.id,
            chunk.document_id,
            chunk.user_id,
            chunk.seq_index,
            chunk.text,
            metadata,
        ],
    )?;
    Ok(())
}

fn write_vector(conn: &rusqlite::Connection, vector: &VectorRecord) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO vectors (chunk_id, user_id, dimensions, embedding) VALUES (?1, ?2, ?3, ?4)",
        params![
            vector.chunk_id,
            vector.user_id,
            vector.dimensions() as i64,
            vec_to_blob(&vector.values),
        ],
    )?;
    Ok(())
}

/// Insert a single chunk.
pub async fn insert_chunk(db: &Database, chunk: &Chunk) -> Result<(), MnemeError> {
    let chunk = chunk.clone();
    let metadata = metadata_to_json(&chunk.metadata)?;
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> { write_chunk(conn, &chunk, &metadata) })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a single vector.
pub async fn insert_vector(db: &Database, vector: &VectorRecord) -> Result<(), MnemeError> {
    let vector = vector.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> { write_vector(conn, &vector) })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert chunks with their vectors in one transaction.
///
/// Either every pair lands or none does.
pub async fn insert_chunk_group(
    db: &Database,
    group: &[(Chunk, VectorRecord)],
) -> Result<usize, MnemeError> {
    if group.is_empty() {
        return Ok(0);
    }
    let mut rows = Vec::with_capacity(group.len());
    for (chunk, vector) in group {
        if chunk.id != vector.chunk_id {
            return Err(MnemeError::InvalidInput(format!(
                "vector for {} paired with chunk {}",
                vector.chunk_id, chunk.id
            )));
        }
        rows.push((chunk.clone(), metadata_to_json(&chunk.metadata)?, vector.clone()));
    }
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx: Transaction<'_> = conn.transaction()?;
            for (chunk, metadata, vector) in &rows {
                write_chunk(&tx, chunk, metadata)?;
                write_vector(&tx, vector)?;
            }
            tx.commit()?;
            Ok(rows.len())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All `(chunk_id, vector)` pairs owned by a user, in insertion order.
pub async fn get_vectors_by_user(
    db: &Database,
    user_id: &str,
) -> Result<Vec<(String, Vec<f32>)>, MnemeError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Vec<(String, Vec<f32>)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT chunk_id, embedding FROM vectors WHERE user_id = ?1 ORDER BY rowid",
            )?;
            let rows = stmt.query_map(params![user_id], |row| {
                let blob: Vec<u8> = row.get(1)?;
                Ok((row.get(0)?, blob_to_vec(&blob)))
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Build `?2, ?3, ...` placeholders for a source filter following the user id.
fn source_placeholders(count: usize) -> String {
    (0..count)
        .map(|i| format!("?{}", i + 2))
        .collect::<Vec<_>>()
        .join(", ")
}

fn filter_params(user_id: &str, sources: Option<&[SourceTag]>) -> Vec<String> {
    let mut values = vec![user_id.to_string()];
    if let Some(sources) = sources {
        values.extend(sources.iter().map(|s| s.as_str().to_string()));
    }
    values
}

/// Vectors joined with their document's source and creation time.
///
/// With `sources`, only chunks from those sources are returned; an empty
/// filter matches nothing. Order is the stable insertion (scan) order.
pub async fn get_vector_candidates(
    db: &Database,
    user_id: &str,
    sources: Option<&[SourceTag]>,
) -> Result<Vec<VectorCandidate>, MnemeError> {
    if sources.is_some_and(|s| s.is_empty()) {
        return Ok(Vec::new());
    }
    let filter = sources.map(|s| source_placeholders(s.len()));
    let values = filter_params(user_id, sources);
    db.connection()
        .call(move |conn| -> Result<Vec<VectorCandidate>, rusqlite::Error> {
            let mut sql = String::from(
                "SELECT v.chunk_id, v.embedding, d.source, d.created_at
                 FROM vectors v
                 JOIN chunks c ON c.id = v.chunk_id
                 JOIN documents d ON d.id = c.document_id
                 WHERE v.user_id = ?1",
            );
            if let Some(placeholders) = &filter {
                sql.push_str(&format!(" AND d.source IN ({placeholders})"));
            }
            sql.push_str(" ORDER BY v.rowid");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
                let blob: Vec<u8> = row.get(1)?;
                let source: String = row.get(2)?;
                Ok(VectorCandidate {
                    chunk_id: row.get(0)?,
                    values: blob_to_vec(&blob),
                    source: SourceTag::from_str_value(&source),
                    created_at: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Text of a chunk, if it exists.
pub async fn get_chunk_text(db: &Database, chunk_id: &str) -> Result<Option<String>, MnemeError> {
    let chunk_id = chunk_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            conn.query_row(
                "SELECT text FROM chunks WHERE id = ?1",
                params![chunk_id],
                |row| row.get(0),
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// A chunk together with its parent document's source, title and creation time.
pub async fn get_chunk_with_document_metadata(
    db: &Database,
    chunk_id: &str,
) -> Result<Option<ChunkContext>, MnemeError> {
    let chunk_id = chunk_id.to_string();
    db.connection()
        .call(move |conn| -> Result<Option<ChunkContext>, rusqlite::Error> {
            conn.query_row(
                "SELECT c.id, c.document_id, d.source, d.title, c.text, c.metadata, d.created_at
                 FROM chunks c JOIN documents d ON d.id = c.document_id
                 WHERE c.id = ?1",
                params![chunk_id],
                |row| {
                    let source: String = row.get(2)?;
                    let metadata: String = row.get(5)?;
                    Ok(ChunkContext {
                        chunk_id: row.get(0)?,
                        document_id: row.get(1)?,
                        source: SourceTag::from_str_value(&source),
                        title: row.get(3)?,
                        text: row.get(4)?,
                        metadata: metadata_from_json(&metadata),
                        created_at: row.get(6)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recently created chunks of a user, newest document first.
///
/// Within one document, chunks keep their sequence order.
pub async fn get_recent_chunks_by_user(
    db: &Database,
    user_id: &str,
    limit: usize,
    sources: Option<&[SourceTag]>,
) -> Result<Vec<RecentChunk>, MnemeError> {
    if limit == 0 || sources.is_some_and(|s| s.is_empty()) {
        return Ok(Vec::new());
    }
    let filter = sources.map(|s| source_placeholders(s.len()));
    let values = filter_params(user_id, sources);
    db.connection()
        .call(move |conn| -> Result<Vec<RecentChunk>, rusqlite::Error> {
            let mut sql = String::from(
                "SELECT c.id, c.text, d.source, d.created_at
                 FROM chunks c JOIN documents d ON d.id = c.document_id
                 WHERE c.user_id = ?1",
            );
            if let Some(placeholders) = &filter {
                sql.push_str(&format!(" AND d.source IN ({placeholders})"));
            }
            sql.push_str(&format!(
                " ORDER BY d.created_at DESC, d.rowid DESC, c.seq_index ASC LIMIT {limit}"
            ));
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
                let source: String = row.get(2)?;
                Ok(RecentChunk {
                    chunk_id: row.get(0)?,
                    text: row.get(1)?,
                    source: SourceTag::from_str_value(&source),
                    created_at: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
