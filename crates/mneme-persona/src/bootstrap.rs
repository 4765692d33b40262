// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Initial persona derived from a sample of the user's own writing.

use std::collections::{BTreeMap, BTreeSet};

use mneme_core::persona::{bounded, PersonaVector, SENTENCE_LENGTH_RANGE, UNIT_RANGE};

/// Catchphrases kept on the bootstrapped persona.
pub const MAX_CATCHPHRASES: usize = 5;

/// A phrase must appear in at least this many distinct samples.
const MIN_PHRASE_SAMPLES: usize = 2;

/// Build a persona for `user_id` from sample texts.
///
/// Only the linguistic profile is derived; the other sub-profiles keep their
/// neutral defaults. Blank samples are ignored.
pub fn bootstrap_persona<S: AsRef<str>>(
    user_id: &str,
    samples: &[S],
    timestamp: &str,
) -> PersonaVector {
    let mut persona = PersonaVector::neutral(user_id, timestamp);
    let texts: Vec<&str> = samples
        .iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .collect();
    if texts.is_empty() {
        return persona;
    }

    let n = texts.len() as f64;
    let rate = |pred: &dyn Fn(&str) -> bool| texts.iter().filter(|t| pred(**t)).count() as f64 / n;

    let l = &mut persona.linguistic;
    if let Some(mean) = mean_sentence_length(&texts) {
        l.sentence_length_preference = bounded(mean, &SENTENCE_LENGTH_RANGE);
    }
    l.emoji_rate = bounded(rate(&|t: &str| t.chars().any(is_emoji)), &UNIT_RANGE);
    l.punctuation_style.exclamation_rate = rate(&|t: &str| t.contains('!'));
    l.punctuation_style.question_rate = rate(&|t: &str| t.contains('?'));
    l.punctuation_style.ellipsis_rate = rate(&|t: &str| t.contains("...") || t.contains('…'));
    l.catchphrases = catchphrases(&texts);

    persona.training_samples = texts.len() as u64;
    persona.last_trained_at = Some(timestamp.to_string());
    persona.clamp_ranges();
    persona
}

/// Mean words per sentence across every sample.
fn mean_sentence_length(texts: &[&str]) -> Option<f64> {
    let mut sentences = 0usize;
    let mut words = 0usize;
    for text in texts {
        for sentence in text.split(['.', '!', '?', '…', '\n']) {
            let count = sentence.split_whitespace().count();
            if count > 0 {
                sentences += 1;
                words += count;
            }
        }
    }
    (sentences > 0).then(|| words as f64 / sentences as f64)
}

fn is_emoji(c: char) -> bool {
    matches!(c as u32, 0x1F300..=0x1FAFF | 0x2600..=0x27BF)
}

fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Two- and three-word phrases that recur across samples, most frequent first.
fn catchphrases(texts: &[&str]) -> Vec<String> {
    let mut seen_in: BTreeMap<String, usize> = BTreeMap::new();
    for text in texts {
        let tokens = words(text);
        let mut phrases = BTreeSet::new();
        for n in 2..=3 {
            for window in tokens.windows(n) {
                phrases.insert(window.join(" "));
            }
        }
        for phrase in phrases {
            *seen_in.entry(phrase).or_default() += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = seen_in
        .into_iter()
        .filter(|(_, count)| *count >= MIN_PHRASE_SAMPLES)
        .collect();
    // Longer phrases first on equal counts, then alphabetical.
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.0.split(' ').count().cmp(&a.0.split(' ').count()))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut picked: Vec<String> = Vec::new();
    for (phrase, _) in ranked {
        if picked.len() == MAX_CATCHPHRASES {
            break;
        }
        // Skip sub-phrases of something already picked.
        let padded = format!(" {phrase} ");
        if picked.iter().any(|p| format!(" {p} ").contains(&padded)) {
            continue;
        }
        picked.push(phrase);
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2026-02-01T12:00:00.000Z";

    #[test]
    fn no_samples_gives_neutral_persona() {
        let empty: [&str; 0] = [];
        let persona = bootstrap_persona("u1", &empty, TS);
        assert_eq!(persona, PersonaVector::neutral("u1", TS));
        assert_eq!(persona.training_samples, 0);
    }

    #[test]
    fn linguistic_profile_reflects_samples() {
        let samples = [
            "No worries at all! See you soon.",
            "Are you coming tonight?",
            "no worries, I can do it 🙂",
            "Well... maybe later",
        ];
        let persona = bootstrap_persona("u1", &samples, TS);
        let l = &persona.linguistic;
        assert_eq!(persona.version, 1);
        assert_eq!(persona.training_samples, 4);
        assert_eq!(persona.last_trained_at.as_deref(), Some(TS));
        assert_eq!(l.emoji_rate, 0.25);
        assert_eq!(l.punctuation_style.exclamation_rate, 0.25);
        assert_eq!(l.punctuation_style.question_rate, 0.25);
        assert_eq!(l.punctuation_style.ellipsis_rate, 0.25);
        assert_eq!(l.catchphrases, vec!["no worries".to_string()]);
        assert!(persona.is_within_bounds());
    }

    #[test]
    fn sentence_length_is_the_mean_word_count() {
        let samples = ["one two three four. five six", "a b c d e f g h"];
        let persona = bootstrap_persona("u1", &samples, TS);
        // Sentences of 4, 2 and 8 words.
        assert!((persona.linguistic.sentence_length_preference - 14.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn very_short_sentences_clamp_to_minimum() {
        let persona = bootstrap_persona("u1", &["ok.", "yes.", "no"], TS);
        assert_eq!(persona.linguistic.sentence_length_preference, 3.0);
    }

    #[test]
    fn catchphrases_prefer_longer_repeated_phrases() {
        let samples = [
            "sounds good to me",
            "that sounds good to me too",
            "ok sounds good to me",
        ];
        let persona = bootstrap_persona("u1", &samples, TS);
        assert_eq!(
            persona.linguistic.catchphrases.first().map(String::as_str),
            Some("good to me")
        );
        assert!(persona.linguistic.catchphrases.len() <= MAX_CATCHPHRASES);
        assert!(
            !persona
                .linguistic
                .catchphrases
                .iter()
                .any(|p| p == "to me" || p == "good to")
        );
    }

    #[test]
    fn blank_samples_are_ignored() {
        let persona = bootstrap_persona("u1", &["   ", "hello there friend"], TS);
        assert_eq!(persona.training_samples, 1);
    }
}
