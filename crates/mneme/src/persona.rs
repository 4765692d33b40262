// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mneme persona` command implementation.

use mneme_core::types::now_timestamp;
use mneme_core::{MnemeError, PersonaVector, StorageAdapter};
use mneme_persona::bootstrap_persona;
use tracing::info;

use crate::app::App;
use crate::output::print_json;

/// Recent chunks sampled when bootstrapping a persona.
const PERSONA_SAMPLE_CHUNKS: usize = 200;

/// Show the user's persona, bootstrapping it from imported text when none
/// exists or when `rebuild` is set.
pub async fn run_persona(
    app: &App,
    user_id: &str,
    rebuild: bool,
    json: bool,
) -> Result<(), MnemeError> {
    app.require_user(user_id).await?;
    let storage = app.storage();
    let existing = storage.get_persona(user_id).await?;

    let persona = match existing {
        Some(persona) if !rebuild => persona,
        previous => {
            let samples: Vec<String> = storage
                .get_recent_chunks_by_user(user_id, PERSONA_SAMPLE_CHUNKS, None)
                .await?
                .into_iter()
                .map(|chunk| chunk.text)
                .collect();
            let mut persona = bootstrap_persona(user_id, &samples, &now_timestamp());
            if let Some(previous) = previous {
                persona.version = previous.version + 1;
                persona.created_at = previous.created_at;
            }
            storage.save_persona(&persona).await?;
            info!(
                user_id,
                samples = persona.training_samples,
                version = persona.version,
                "persona bootstrapped"
            );
            persona
        }
    };

    if json {
        return print_json(&persona);
    }
    print_summary(&persona);
    Ok(())
}

fn print_summary(persona: &PersonaVector) {
    let l = &persona.linguistic;
    println!(
        "Persona for {} (version {}, {} samples)",
        persona.user_id, persona.version, persona.training_samples
    );
    println!("  formality:        {:.2}", l.formality_level);
    println!("  sentence length:  {:.1} words", l.sentence_length_preference);
    println!("  emoji rate:       {:.2}", l.emoji_rate);
    println!(
        "  punctuation:      ! {:.2}  ? {:.2}  ... {:.2}",
        l.punctuation_style.exclamation_rate,
        l.punctuation_style.question_rate,
        l.punctuation_style.ellipsis_rate
    );
    if !l.catchphrases.is_empty() {
        println!("  catchphrases:     {}", l.catchphrases.join(" | "));
    }
}
