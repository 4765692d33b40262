// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mneme integration tests.
//!
//! - [`MockGenerator`] - generation adapter with queued replies and an optional delay
//! - [`TestHarness`] - temporary SQLite store, hashing embedder and a seeded user

pub mod harness;
pub mod mock_generator;

pub use harness::TestHarness;
pub use mock_generator::MockGenerator;
