// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data ingestion for Mneme.
//!
//! Turns unpacked personal-data exports into deduplicated, chunked and
//! embedded documents:
//!
//! - [`detector`] recognizes the export type of a directory
//! - [`extract`] parses individual files into records
//! - [`normalize`] and [`chunker`] prepare text for embedding
//! - [`importer`] persists records through the storage adapter
//! - [`coordinator`] ties detection and import together

pub mod chunker;
pub mod coordinator;
pub mod detector;
pub mod extract;
pub mod importer;
pub mod normalize;

pub use chunker::{chunk, ChunkConfig};
pub use coordinator::ImportCoordinator;
pub use detector::SourceDetector;
pub use extract::{ExtractedRecord, FileFormat};
pub use importer::{importer_for, ImportPipeline, SourceImporter};
pub use normalize::{normalize, strip_markup};
