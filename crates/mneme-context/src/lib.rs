// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation context for Mneme.
//!
//! Assembles a per-turn [`MemorySnapshot`] from dialogue history, retrieved
//! memories, the relationship profile and the adjusted persona, renders it
//! into instructions for the generation service, and bounds the generation
//! call itself.

pub mod assembler;
pub mod builder;
pub mod generation;

pub use assembler::{ConversationMemoryAssembler, MemorySnapshot, TurnContext};
pub use builder::{ContextBuilder, ContextSection, RenderedContext, SectionKind};
pub use generation::ReplyGenerator;
