// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Context builder: renders a [`MemorySnapshot`] into labeled instruction
//! sections for the generation service.
//!
//! Sections appear in a fixed order and a section with no underlying data is
//! left out entirely. The connected-sources section is the exception: it is
//! always rendered, stating plainly when nothing has been imported.

use std::fmt::Write as _;

use mneme_core::persona::PersonaVector;
use mneme_core::types::{
    ConnectedSource, DialogueTurn, GenerationMessage, GenerationRequest, RelationshipProfile,
    RetrievedMemory, TurnRole,
};
use mneme_persona::EmotionLabel;
use serde::Serialize;
use strum::Display;

use crate::assembler::MemorySnapshot;

/// Maximum characters of one memory excerpt.
const EXCERPT_CHARS: usize = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum SectionKind {
    #[strum(to_string = "Identity")]
    Identity,
    #[strum(to_string = "Relationship")]
    Relationship,
    #[strum(to_string = "Connected data sources")]
    Sources,
    #[strum(to_string = "Relevant memories")]
    Memories,
    #[strum(to_string = "Recent conversation")]
    Dialogue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextSection {
    pub kind: SectionKind,
    pub body: String,
}

/// Rendered instructions, in section order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedContext {
    pub sections: Vec<ContextSection>,
}

impl RenderedContext {
    pub fn section(&self, kind: SectionKind) -> Option<&ContextSection> {
        self.sections.iter().find(|s| s.kind == kind)
    }

    /// All sections as one markdown-style document.
    pub fn to_instructions(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            if !out.is_empty() {
                out.push('\n');
            }
            let _ = writeln!(out, "## {}\n{}", section.kind, section.body.trim_end());
        }
        out
    }
}

/// Stateless renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextBuilder;

impl ContextBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, snapshot: &MemorySnapshot) -> RenderedContext {
        let mut sections = vec![ContextSection {
            kind: SectionKind::Identity,
            body: identity(snapshot),
        }];
        if let Some(rel) = &snapshot.relationship {
            sections.push(ContextSection {
                kind: SectionKind::Relationship,
                body: relationship(rel),
            });
        }
        sections.push(ContextSection {
            kind: SectionKind::Sources,
            body: sources(&snapshot.connected_sources),
        });
        if !snapshot.memories.is_empty() {
            sections.push(ContextSection {
                kind: SectionKind::Memories,
                body: memories(&snapshot.memories),
            });
        }
        if !snapshot.history.is_empty() {
            sections.push(ContextSection {
                kind: SectionKind::Dialogue,
                body: dialogue(&snapshot.history),
            });
        }
        RenderedContext { sections }
    }

    /// Generation request: rendered instructions plus the raw dialogue.
    ///
    /// The current message is appended unless it is already the last
    /// recorded user turn.
    pub fn request(&self, snapshot: &MemorySnapshot) -> GenerationRequest {
        let mut messages: Vec<GenerationMessage> = snapshot
            .history
            .iter()
            .map(|turn| GenerationMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            })
            .collect();
        let already_recorded = snapshot
            .history
            .last()
            .is_some_and(|t| t.role == TurnRole::User && t.content == snapshot.message);
        if !already_recorded && !snapshot.message.trim().is_empty() {
            messages.push(GenerationMessage {
                role: TurnRole::User.as_str().to_string(),
                content: snapshot.message.clone(),
            });
        }
        GenerationRequest {
            instructions: self.render(snapshot).to_instructions(),
            messages,
        }
    }
}

fn level(value: f64) -> &'static str {
    if value < 0.34 {
        "low"
    } else if value < 0.67 {
        "moderate"
    } else {
        "high"
    }
}

fn sentiment(value: f64) -> &'static str {
    if value > 0.2 {
        "positive"
    } else if value < -0.2 {
        "negative"
    } else {
        "neutral"
    }
}

fn identity(snapshot: &MemorySnapshot) -> String {
    let p: &PersonaVector = &snapshot.persona;
    let l = &p.linguistic;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Write as the user would. Formality is {}; sentences average about {:.0} words.",
        level(l.formality_level),
        l.sentence_length_preference
    );
    let _ = writeln!(
        out,
        "Humor: {}. Emoji use: {}. Exclamations: {}. Questions: {}.",
        level(l.humor_frequency),
        level(l.emoji_rate),
        level(l.punctuation_style.exclamation_rate),
        level(l.punctuation_style.question_rate)
    );
    if !l.catchphrases.is_empty() {
        let quoted: Vec<String> = l.catchphrases.iter().map(|c| format!("\"{c}\"")).collect();
        let _ = writeln!(out, "Characteristic phrases: {}.", quoted.join(", "));
    }
    let e = &p.emotional;
    let _ = writeln!(
        out,
        "Baseline mood is {}; optimism {}, empathy {}.",
        sentiment(e.baseline_sentiment),
        level(e.optimism),
        level(e.empathy)
    );
    let c = &p.cognitive;
    let style = if c.analytical_vs_intuitive >= 0.5 { "analytical" } else { "intuitive" };
    let _ = writeln!(
        out,
        "Thinks in a mostly {style} way; decisions are made at {} speed.",
        level(c.decision_speed)
    );
    let _ = writeln!(out, "In disagreements the user {}.", p.social.conflict_style.describe());
    if !p.behavioral.interests.is_empty() {
        let _ = writeln!(out, "Interests: {}.", p.behavioral.interests.join(", "));
    }
    let mut priorities: Vec<(&String, &f64)> = p.values.priorities.iter().collect();
    priorities.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    if !priorities.is_empty() {
        let names: Vec<&str> = priorities.iter().take(3).map(|(n, _)| n.as_str()).collect();
        let _ = writeln!(out, "Values most: {}.", names.join(", "));
    }
    if snapshot.emotion.label != EmotionLabel::Neutral {
        let _ = writeln!(
            out,
            "The conversation currently feels {} (intensity {:.2}).",
            snapshot.emotion.label, snapshot.emotion.intensity
        );
    }
    out
}

fn relationship(rel: &RelationshipProfile) -> String {
    let name = rel.display_name.as_deref().unwrap_or(&rel.counterpart_id);
    let mut out = format!(
        "Talking with {name} ({}). Closeness is {}; the usual tone is {}.\n",
        rel.relationship_type,
        level(rel.intimacy_level),
        sentiment(rel.emotional_tone)
    );
    if !rel.topics.is_empty() {
        let _ = writeln!(out, "Common topics: {}.", rel.topics.join(", "));
    }
    if let Some(last) = &rel.last_interaction_at {
        let _ = writeln!(
            out,
            "{} previous interactions, the last at {last}.",
            rel.total_interactions
        );
    }
    out
}

fn sources(connected: &[ConnectedSource]) -> String {
    let present: Vec<&ConnectedSource> = connected.iter().filter(|s| s.document_count > 0).collect();
    if present.is_empty() {
        return "No personal data has been imported for this user. Do not refer to their mail, \
                chats or other records."
            .to_string();
    }
    let mut out = String::from("Imported data is available from these sources only:\n");
    for source in present {
        let _ = writeln!(
            out,
            "- {}: {} documents",
            source.source.label(),
            source.document_count
        );
    }
    out
}

fn memories(items: &[RetrievedMemory]) -> String {
    let mut out = String::new();
    for memory in items {
        let excerpt: String = memory.text.chars().take(EXCERPT_CHARS).collect();
        let marker = if memory.fallback { ", recent" } else { "" };
        let _ = writeln!(
            out,
            "- [score {:.2}{marker}] ({}, {}) {excerpt}",
            memory.score,
            memory.source,
            memory.created_at
        );
    }
    out
}

fn dialogue(turns: &[DialogueTurn]) -> String {
    let mut out = String::new();
    for turn in turns {
        let _ = writeln!(out, "{}: {}", turn.role.as_str(), turn.content);
    }
    out
}
