// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona adaptation for Mneme.
//!
//! Estimates the emotional state of a conversation, adjusts a stored persona
//! to its relationship and time-of-day context, and bootstraps an initial
//! persona from sample writing.

pub mod adjuster;
pub mod bootstrap;
pub mod emotion;

pub use adjuster::{AdjustedPersona, ContextualAdjuster, IntimacyBand, TimeBucket};
pub use bootstrap::bootstrap_persona;
pub use emotion::{EmotionLabel, EmotionalState};
