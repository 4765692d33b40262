// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexicon-based estimate of the current emotional state from recent turns.

use serde::Serialize;
use strum::Display;

/// Positive words (whole-token match, case-insensitive).
const POSITIVE_WORDS: &[&str] = &[
    "happy", "glad", "great", "love", "loved", "awesome", "excited", "thanks", "thank",
    "wonderful", "good", "amazing", "fantastic", "yay", "fun", "enjoy", "enjoyed", "nice",
    "proud", "relieved", "perfect", "haha", "lol", "beautiful", "excellent", "cool",
];

/// Negative words (whole-token match, case-insensitive).
const NEGATIVE_WORDS: &[&str] = &[
    "sad", "angry", "upset", "hate", "terrible", "awful", "worried", "anxious", "tired",
    "stressed", "annoyed", "frustrated", "bad", "sorry", "cry", "crying", "lonely", "hurt",
    "afraid", "scared", "ugh", "horrible", "sick", "disappointed", "miserable",
];

const POSITIVE_EMOJI: &[&str] = &["😊", "😀", "😃", "😂", "🙂", "😍", "❤", "👍", "🎉", "🥳"];

const NEGATIVE_EMOJI: &[&str] = &["😢", "😭", "😠", "😡", "💔", "😞", "🙁", "😟", "😩"];

/// Coarse polarity of the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Positive,
    Negative,
    Neutral,
}

/// Estimated emotional state of the current conversation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EmotionalState {
    pub label: EmotionLabel,
    /// Mean per-turn polarity in [-1, 1].
    pub valence: f64,
    /// Strength in [0, 1].
    pub intensity: f64,
}

impl EmotionalState {
    pub fn neutral() -> Self {
        Self {
            label: EmotionLabel::Neutral,
            valence: 0.0,
            intensity: 0.0,
        }
    }
}

/// Polarity of one text in [-1, 1]: `(pos - neg) / (pos + neg)`, 0 when
/// no lexicon entry occurs.
pub fn score_text(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let mut positive = 0usize;
    let mut negative = 0usize;
    for token in lower.split(|c: char| !c.is_alphanumeric() && c != '\'') {
        if POSITIVE_WORDS.contains(&token) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&token) {
            negative += 1;
        }
    }
    positive += POSITIVE_EMOJI.iter().map(|e| lower.matches(e).count()).sum::<usize>();
    negative += NEGATIVE_EMOJI.iter().map(|e| lower.matches(e).count()).sum::<usize>();

    let total = positive + negative;
    if total == 0 {
        return 0.0;
    }
    (positive as f64 - negative as f64) / total as f64
}

/// Estimate the emotional state from the last `window` texts.
///
/// Scores are averaged; the average is labelled positive above `threshold`
/// and negative below `-threshold`. Intensity is `|avg| * (1 + volatility)`
/// capped at 1.
pub fn estimate<S: AsRef<str>>(
    texts: &[S],
    window: usize,
    threshold: f64,
    volatility: f64,
) -> EmotionalState {
    let start = texts.len().saturating_sub(window);
    let recent = &texts[start..];
    if recent.is_empty() {
        return EmotionalState::neutral();
    }

    let valence = recent.iter().map(|t| score_text(t.as_ref())).sum::<f64>() / recent.len() as f64;
    let label = if valence > threshold {
        EmotionLabel::Positive
    } else if valence < -threshold {
        EmotionLabel::Negative
    } else {
        EmotionLabel::Neutral
    };
    let volatility = if volatility.is_nan() { 0.0 } else { volatility.clamp(0.0, 1.0) };
    EmotionalState {
        label,
        valence,
        intensity: (valence.abs() * (1.0 + volatility)).min(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_scores_follow_the_lexicon() {
        assert_eq!(score_text("I am so happy, thanks!"), 1.0);
        assert_eq!(score_text("ugh, I'm tired and stressed"), -1.0);
        assert_eq!(score_text("good news but bad timing"), 0.0);
        assert_eq!(score_text("the meeting is at noon"), 0.0);
        assert_eq!(score_text("see you 🎉"), 1.0);
    }

    #[test]
    fn only_the_window_is_considered() {
        let turns = ["I hate this", "love it", "great", "awesome"];
        let state = estimate(&turns, 3, 0.3, 0.0);
        assert_eq!(state.label, EmotionLabel::Positive);
        assert_eq!(state.valence, 1.0);
    }

    #[test]
    fn weak_average_is_neutral() {
        let turns = ["great", "see you", "at noon", "ok"];
        let state = estimate(&turns, 4, 0.3, 0.0);
        assert_eq!(state.label, EmotionLabel::Neutral);
        assert!((state.valence - 0.25).abs() < 1e-12);
    }

    #[test]
    fn negative_average_is_negative() {
        let turns = ["so sad", "awful day", "hello"];
        let state = estimate(&turns, 3, 0.3, 0.0);
        assert_eq!(state.label, EmotionLabel::Negative);
        assert!((state.valence + 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn volatility_scales_intensity_up_to_one() {
        let turns = ["happy", "neutral words", "plain"];
        let calm = estimate(&turns, 3, 0.3, 0.0);
        let volatile = estimate(&turns, 3, 0.3, 1.0);
        assert!((calm.intensity - 1.0 / 3.0).abs() < 1e-12);
        assert!((volatile.intensity - 2.0 / 3.0).abs() < 1e-12);

        let strong = estimate(&["love", "love"], 3, 0.3, 1.0);
        assert_eq!(strong.intensity, 1.0);
    }

    #[test]
    fn no_history_is_neutral() {
        let empty: [&str; 0] = [];
        assert_eq!(estimate(&empty, 3, 0.3, 0.5), EmotionalState::neutral());
    }
}
