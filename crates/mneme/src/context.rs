// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mneme context` command implementation.
//!
//! Logs the incoming message as a user turn, assembles the memory snapshot
//! and prints the instructions that would be handed to the generation
//! service.

use mneme_context::{ContextBuilder, MemorySnapshot, RenderedContext, TurnContext};
use mneme_core::types::TurnRole;
use mneme_core::MnemeError;
use serde::Serialize;

use crate::app::App;
use crate::output::print_json;

#[derive(Debug, Serialize)]
struct ContextOutput<'a> {
    snapshot: &'a MemorySnapshot,
    rendered: &'a RenderedContext,
    instructions: String,
}

pub async fn run_context(
    app: &App,
    user_id: &str,
    conversation_id: &str,
    message: &str,
    counterpart: Option<&str>,
    json: bool,
) -> Result<(), MnemeError> {
    app.require_user(user_id).await?;
    let mut turn = TurnContext::new(user_id, conversation_id, message)
        .at(chrono::Local::now().fixed_offset());
    if let Some(counterpart) = counterpart {
        turn = turn.with_counterpart(counterpart);
    }

    let assembler = app.assembler();
    assembler.record_turn(&turn, TurnRole::User, message).await?;
    let snapshot = assembler.build_snapshot(&turn).await?;
    let rendered = ContextBuilder::new().render(&snapshot);
    let instructions = rendered.to_instructions();

    if json {
        return print_json(&ContextOutput {
            snapshot: &snapshot,
            rendered: &rendered,
            instructions,
        });
    }
    print!("{instructions}");
    Ok(())
}
