// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end import tests against a temporary SQLite store.

use std::fs;
use std::path::Path;

use mneme_core::types::{Document, Metadata, SourceTag};
use mneme_core::{MnemeError, StorageAdapter};
use mneme_ingest::ImportCoordinator;
use mneme_test_utils::TestHarness;

const NEW_YEAR_MAIL: &str = "From alice@example.com Mon Jan  1 10:00:00 2024\n\
Subject: New year plans\n\
From: Alice <alice@example.com>\n\
Date: Mon, 1 Jan 2024 10:00:00 +0000\n\
\n\
Let's hike the ridge trail on Saturday and grab lunch after.\n";

fn coordinator(harness: &TestHarness) -> ImportCoordinator {
    ImportCoordinator::new(
        harness.storage(),
        harness.embedder(),
        &harness.config.ingest,
        harness.dimensions(),
    )
    .unwrap()
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[tokio::test]
async fn takeout_mail_is_deduplicated_across_files() {
    let harness = TestHarness::builder().build().await.unwrap();
    let export = tempfile::tempdir().unwrap();
    write(export.path(), "Takeout/Mail/inbox.mbox", NEW_YEAR_MAIL);
    write(export.path(), "Takeout/Mail/archive.mbox", NEW_YEAR_MAIL);

    let report = coordinator(&harness)
        .import_unified_data(&harness.user_id, export.path(), None)
        .await
        .unwrap();

    assert_eq!(report.source_tag, Some(SourceTag::Mail));
    assert_eq!(report.files_seen, 2);
    assert_eq!(report.files_failed, 0);
    assert_eq!(report.documents_inserted, 1);
    assert_eq!(report.duplicates_skipped, 1);
    assert!(report.chunks_inserted >= 1);

    let sources = harness
        .storage
        .list_connected_sources(&harness.user_id)
        .await
        .unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].source, SourceTag::Mail);
    assert_eq!(sources[0].document_count, 1);
}

#[tokio::test]
async fn reimporting_the_same_export_adds_nothing() {
    let harness = TestHarness::builder().build().await.unwrap();
    let export = tempfile::tempdir().unwrap();
    write(export.path(), "Takeout/Mail/inbox.mbox", NEW_YEAR_MAIL);
    let coordinator = coordinator(&harness);

    let first = coordinator
        .import_unified_data(&harness.user_id, export.path(), None)
        .await
        .unwrap();
    assert_eq!(first.documents_inserted, 1);

    let second = coordinator
        .import_unified_data(&harness.user_id, export.path(), None)
        .await
        .unwrap();
    assert_eq!(second.documents_inserted, 0);
    assert_eq!(second.chunks_inserted, 0);
    assert_eq!(second.duplicates_skipped, 1);
}

#[tokio::test]
async fn oversized_file_is_counted_and_the_batch_continues() {
    let harness = TestHarness::builder().build().await.unwrap();
    let export = tempfile::tempdir().unwrap();
    write(export.path(), "Takeout/Mail/inbox.mbox", NEW_YEAR_MAIL);
    write(export.path(), "Takeout/Mail/huge.mbox", &"x".repeat(4096));

    let mut ingest = harness.config.ingest.clone();
    ingest.max_file_bytes = 1024;
    let coordinator =
        ImportCoordinator::new(harness.storage(), harness.embedder(), &ingest, harness.dimensions())
            .unwrap();
    let report = coordinator
        .import_unified_data(&harness.user_id, export.path(), None)
        .await
        .unwrap();

    assert_eq!(report.files_seen, 2);
    assert_eq!(report.files_failed, 1);
    assert_eq!(report.documents_inserted, 1);
}

#[tokio::test]
async fn mailbox_without_messages_is_kept_as_raw_text() {
    let harness = TestHarness::builder().build().await.unwrap();
    let export = tempfile::tempdir().unwrap();
    write(export.path(), "Takeout/Mail/notes.mbox", "packing list: boots, map, water\n");

    let report = coordinator(&harness)
        .import_unified_data(&harness.user_id, export.path(), None)
        .await
        .unwrap();

    assert_eq!(report.files_failed, 0);
    assert_eq!(report.documents_inserted, 1);
}

#[tokio::test]
async fn chat_export_is_detected_and_imported() {
    let harness = TestHarness::builder().build().await.unwrap();
    let export = tempfile::tempdir().unwrap();
    write(
        export.path(),
        "WhatsApp Chat with Ana.txt",
        "[31/12/2023, 21:04:11] Ana: happy new year\n\
         [31/12/2023, 21:05:02] Me: happy new year to you too\n",
    );

    let report = coordinator(&harness)
        .import_unified_data(&harness.user_id, export.path(), None)
        .await
        .unwrap();

    assert_eq!(report.source_tag, Some(SourceTag::Chat));
    assert_eq!(report.documents_inserted, 1);
}

#[tokio::test]
async fn hint_skips_detection() {
    let harness = TestHarness::builder().build().await.unwrap();
    let export = tempfile::tempdir().unwrap();
    write(export.path(), "notes/journal.txt", "Planted tomatoes and basil today.");

    let coordinator = coordinator(&harness);
    assert_eq!(coordinator.detect(export.path()).await.unwrap(), SourceTag::Unknown);

    let report = coordinator
        .import_unified_data(&harness.user_id, export.path(), Some(SourceTag::Drive))
        .await
        .unwrap();
    assert_eq!(report.source_tag, Some(SourceTag::Drive));
    assert_eq!(report.documents_inserted, 1);

    let sources = harness
        .storage
        .list_connected_sources(&harness.user_id)
        .await
        .unwrap();
    assert_eq!(sources[0].source, SourceTag::Drive);
}

#[tokio::test]
async fn orphan_documents_are_removed_before_import() {
    let harness = TestHarness::builder().build().await.unwrap();
    let orphan = Document {
        id: "orphan".to_string(),
        user_id: harness.user_id.clone(),
        source: SourceTag::Mail,
        content_type: "message/rfc822".to_string(),
        title: None,
        content: NEW_YEAR_MAIL.to_string(),
        metadata: Metadata::new(),
        created_at: "2024-01-01T10:00:00.000Z".to_string(),
    };
    harness.storage.insert_document(&orphan).await.unwrap();
    assert_eq!(
        harness.storage.find_orphan_documents(&harness.user_id).await.unwrap(),
        vec!["orphan".to_string()]
    );

    let export = tempfile::tempdir().unwrap();
    write(export.path(), "Takeout/Mail/inbox.mbox", NEW_YEAR_MAIL);
    coordinator(&harness)
        .import_unified_data(&harness.user_id, export.path(), None)
        .await
        .unwrap();

    assert!(harness
        .storage
        .find_orphan_documents(&harness.user_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn unknown_user_is_rejected() {
    let harness = TestHarness::builder().build().await.unwrap();
    let export = tempfile::tempdir().unwrap();
    write(export.path(), "Takeout/Mail/inbox.mbox", NEW_YEAR_MAIL);

    let err = coordinator(&harness)
        .import_unified_data("nobody", export.path(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MnemeError::UserNotFound { .. }));
}

#[tokio::test]
async fn file_path_is_not_a_directory() {
    let harness = TestHarness::builder().build().await.unwrap();
    let export = tempfile::tempdir().unwrap();
    write(export.path(), "inbox.mbox", NEW_YEAR_MAIL);

    let err = coordinator(&harness)
        .import_unified_data(&harness.user_id, &export.path().join("inbox.mbox"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MnemeError::InvalidInput(_)));
}
