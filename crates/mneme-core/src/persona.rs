// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona data model: the per-user trait vector that shapes generated replies.
//!
//! Every scalar has a documented range. [`PersonaVector::clamp_ranges`] is the
//! single normalization pass that brings all of them back into range; the
//! contextual adjuster runs it unconditionally after each adjustment.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Range for rate and level fields.
pub const UNIT_RANGE: RangeInclusive<f64> = 0.0..=1.0;
/// Range for sentiment and tone fields.
pub const SIGNED_RANGE: RangeInclusive<f64> = -1.0..=1.0;
/// Range for the preferred sentence length, in words.
pub const SENTENCE_LENGTH_RANGE: RangeInclusive<f64> = 3.0..=50.0;

/// Clamps `value` into `range`. NaN maps to the range midpoint.
pub fn bounded(value: f64, range: &RangeInclusive<f64>) -> f64 {
    let (lo, hi) = (*range.start(), *range.end());
    if value.is_nan() {
        (lo + hi) / 2.0
    } else {
        value.clamp(lo, hi)
    }
}

fn in_range(value: f64, range: &RangeInclusive<f64>) -> bool {
    range.contains(&value)
}

/// Relative frequency of expressive punctuation, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PunctuationStyle {
    pub exclamation_rate: f64,
    pub question_rate: f64,
    pub ellipsis_rate: f64,
}

impl Default for PunctuationStyle {
    fn default() -> Self {
        Self {
            exclamation_rate: 0.1,
            question_rate: 0.1,
            ellipsis_rate: 0.05,
        }
    }
}

/// How the user writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinguisticProfile {
    pub formality_level: f64,
    /// Preferred sentence length in words, in [3, 50].
    pub sentence_length_preference: f64,
    pub humor_frequency: f64,
    pub emoji_rate: f64,
    pub catchphrases: Vec<String>,
    pub punctuation_style: PunctuationStyle,
}

impl Default for LinguisticProfile {
    fn default() -> Self {
        Self {
            formality_level: 0.5,
            sentence_length_preference: 15.0,
            humor_frequency: 0.3,
            emoji_rate: 0.1,
            catchphrases: Vec::new(),
            punctuation_style: PunctuationStyle::default(),
        }
    }
}

/// Emotional baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalProfile {
    /// Resting sentiment in [-1, 1].
    pub baseline_sentiment: f64,
    pub volatility: f64,
    pub empathy: f64,
    pub optimism: f64,
    pub anxiety: f64,
    pub anger_threshold: f64,
}

impl Default for EmotionalProfile {
    fn default() -> Self {
        Self {
            baseline_sentiment: 0.1,
            volatility: 0.3,
            empathy: 0.6,
            optimism: 0.5,
            anxiety: 0.3,
            anger_threshold: 0.7,
        }
    }
}

/// Thinking style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CognitiveProfile {
    /// 0 is fully intuitive, 1 fully analytical.
    pub analytical_vs_intuitive: f64,
    pub detail_orientation: f64,
    pub risk_tolerance: f64,
    pub decision_speed: f64,
}

impl Default for CognitiveProfile {
    fn default() -> Self {
        Self {
            analytical_vs_intuitive: 0.5,
            detail_orientation: 0.5,
            risk_tolerance: 0.5,
            decision_speed: 0.5,
        }
    }
}

/// Preferred way of handling disagreement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStyle {
    Avoiding,
    Accommodating,
    #[default]
    Compromising,
    Collaborating,
    Competing,
}

impl ConflictStyle {
    pub fn describe(&self) -> &'static str {
        match self {
            ConflictStyle::Avoiding => "tends to sidestep disagreements",
            ConflictStyle::Accommodating => "tends to yield to keep the peace",
            ConflictStyle::Compromising => "looks for middle ground in disagreements",
            ConflictStyle::Collaborating => "works through disagreements openly",
            ConflictStyle::Competing => "argues firmly for their own position",
        }
    }
}

/// Social disposition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub extraversion: f64,
    /// Topic name to preference weight in [0, 1].
    pub topic_preferences: BTreeMap<String, f64>,
    pub conflict_style: ConflictStyle,
}

/// Named priorities, each weighted in [0, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuesProfile {
    pub priorities: BTreeMap<String, f64>,
}

/// Habits and interests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehavioralProfile {
    pub routine_regularity: f64,
    pub interests: Vec<String>,
}

impl Default for BehavioralProfile {
    fn default() -> Self {
        Self {
            routine_regularity: 0.5,
            interests: Vec::new(),
        }
    }
}

/// The full per-user persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaVector {
    pub user_id: String,
    pub linguistic: LinguisticProfile,
    pub emotional: EmotionalProfile,
    pub cognitive: CognitiveProfile,
    pub social: SocialProfile,
    pub values: ValuesProfile,
    pub behavioral: BehavioralProfile,
    pub version: u32,
    pub training_samples: u64,
    pub last_trained_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl PersonaVector {
    /// A persona with neutral defaults for every sub-profile.
    pub fn neutral(user_id: impl Into<String>, timestamp: &str) -> Self {
        Self {
            user_id: user_id.into(),
            linguistic: LinguisticProfile::default(),
            emotional: EmotionalProfile::default(),
            cognitive: CognitiveProfile::default(),
            social: SocialProfile {
                extraversion: 0.5,
                ..Default::default()
            },
            values: ValuesProfile::default(),
            behavioral: BehavioralProfile::default(),
            version: 1,
            training_samples: 0,
            last_trained_at: None,
            created_at: timestamp.to_string(),
            updated_at: timestamp.to_string(),
        }
    }

    /// Brings every scalar field back into its documented range.
    pub fn clamp_ranges(&mut self) {
        let l = &mut self.linguistic;
        l.formality_level = bounded(l.formality_level, &UNIT_RANGE);
        l.sentence_length_preference =
            bounded(l.sentence_length_preference, &SENTENCE_LENGTH_RANGE);
        l.humor_frequency = bounded(l.humor_frequency, &UNIT_RANGE);
        l.emoji_rate = bounded(l.emoji_rate, &UNIT_RANGE);
        let p = &mut l.punctuation_style;
        p.exclamation_rate = bounded(p.exclamation_rate, &UNIT_RANGE);
        p.question_rate = bounded(p.question_rate, &UNIT_RANGE);
        p.ellipsis_rate = bounded(p.ellipsis_rate, &UNIT_RANGE);

        let e = &mut self.emotional;
        e.baseline_sentiment = bounded(e.baseline_sentiment, &SIGNED_RANGE);
        e.volatility = bounded(e.volatility, &UNIT_RANGE);
        e.empathy = bounded(e.empathy, &UNIT_RANGE);
        e.optimism = bounded(e.optimism, &UNIT_RANGE);
        e.anxiety = bounded(e.anxiety, &UNIT_RANGE);
        e.anger_threshold = bounded(e.anger_threshold, &UNIT_RANGE);

        let c = &mut self.cognitive;
        c.analytical_vs_intuitive = bounded(c.analytical_vs_intuitive, &UNIT_RANGE);
        c.detail_orientation = bounded(c.detail_orientation, &UNIT_RANGE);
        c.risk_tolerance = bounded(c.risk_tolerance, &UNIT_RANGE);
        c.decision_speed = bounded(c.decision_speed, &UNIT_RANGE);

        self.social.extraversion = bounded(self.social.extraversion, &UNIT_RANGE);
        for weight in self.social.topic_preferences.values_mut() {
            *weight = bounded(*weight, &UNIT_RANGE);
        }
        for weight in self.values.priorities.values_mut() {
            *weight = bounded(*weight, &UNIT_RANGE);
        }
        self.behavioral.routine_regularity =
            bounded(self.behavioral.routine_regularity, &UNIT_RANGE);
    }

    /// Returns the dotted names of every scalar field outside its range.
    pub fn out_of_range_fields(&self) -> Vec<String> {
        let mut bad = Vec::new();
        let mut check = |name: &str, value: f64, range: &RangeInclusive<f64>| {
            if !in_range(value, range) {
                bad.push(name.to_string());
            }
        };

        let l = &self.linguistic;
        check("linguistic.formality_level", l.formality_level, &UNIT_RANGE);
        check(
            "linguistic.sentence_length_preference",
            l.sentence_length_preference,
            &SENTENCE_LENGTH_RANGE,
        );
        check("linguistic.humor_frequency", l.humor_frequency, &UNIT_RANGE);
        check("linguistic.emoji_rate", l.emoji_rate, &UNIT_RANGE);
        check(
            "linguistic.punctuation_style.exclamation_rate",
            l.punctuation_style.exclamation_rate,
            &UNIT_RANGE,
        );
        check(
            "linguistic.punctuation_style.question_rate",
            l.punctuation_style.question_rate,
            &UNIT_RANGE,
        );
        check(
            "linguistic.punctuation_style.ellipsis_rate",
            l.punctuation_style.ellipsis_rate,
            &UNIT_RANGE,
        );

        let e = &self.emotional;
        check("emotional.baseline_sentiment", e.baseline_sentiment, &SIGNED_RANGE);
        check("emotional.volatility", e.volatility, &UNIT_RANGE);
        check("emotional.empathy", e.empathy, &UNIT_RANGE);
        check("emotional.optimism", e.optimism, &UNIT_RANGE);
        check("emotional.anxiety", e.anxiety, &UNIT_RANGE);
        check("emotional.anger_threshold", e.anger_threshold, &UNIT_RANGE);

        let c = &self.cognitive;
        check("cognitive.analytical_vs_intuitive", c.analytical_vs_intuitive, &UNIT_RANGE);
        check("cognitive.detail_orientation", c.detail_orientation, &UNIT_RANGE);
        check("cognitive.risk_tolerance", c.risk_tolerance, &UNIT_RANGE);
        check("cognitive.decision_speed", c.decision_speed, &UNIT_RANGE);

        check("social.extraversion", self.social.extraversion, &UNIT_RANGE);
        for (topic, weight) in &self.social.topic_preferences {
            check(&format!("social.topic_preferences.{topic}"), *weight, &UNIT_RANGE);
        }
        for (name, weight) in &self.values.priorities {
            check(&format!("values.priorities.{name}"), *weight, &UNIT_RANGE);
        }
        check(
            "behavioral.routine_regularity",
            self.behavioral.routine_regularity,
            &UNIT_RANGE,
        );
        bad
    }

    /// True when every scalar field lies within its documented range.
    pub fn is_within_bounds(&self) -> bool {
        self.out_of_range_fields().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn neutral_persona_is_within_bounds() {
        let persona = PersonaVector::neutral("u1", "2026-01-01T00:00:00.000Z");
        assert!(persona.is_within_bounds(), "{:?}", persona.out_of_range_fields());
        assert_eq!(persona.version, 1);
    }

    #[test]
    fn clamp_ranges_fixes_every_field() {
        let mut persona = PersonaVector::neutral("u1", "2026-01-01T00:00:00.000Z");
        persona.linguistic.formality_level = 1.7;
        persona.linguistic.sentence_length_preference = 1.0;
        persona.emotional.baseline_sentiment = -3.0;
        persona.cognitive.decision_speed = f64::NAN;
        persona.values.priorities.insert("family".into(), 4.0);
        assert_eq!(persona.out_of_range_fields().len(), 5);

        persona.clamp_ranges();
        assert!(persona.is_within_bounds());
        assert_eq!(persona.linguistic.formality_level, 1.0);
        assert_eq!(persona.linguistic.sentence_length_preference, 3.0);
        assert_eq!(persona.emotional.baseline_sentiment, -1.0);
        assert_eq!(persona.cognitive.decision_speed, 0.5);
        assert_eq!(persona.values.priorities["family"], 1.0);
    }

    #[test]
    fn persona_serializes_round_trip() {
        let mut persona = PersonaVector::neutral("u1", "2026-01-01T00:00:00.000Z");
        persona.linguistic.catchphrases = vec!["no worries".into()];
        persona.social.conflict_style = ConflictStyle::Collaborating;
        let json = serde_json::to_string(&persona).unwrap();
        let back: PersonaVector = serde_json::from_str(&json).unwrap();
        assert_eq!(back, persona);
    }

    proptest! {
        #[test]
        fn bounded_always_lands_in_range(v in proptest::num::f64::ANY) {
            let out = bounded(v, &SENTENCE_LENGTH_RANGE);
            prop_assert!(SENTENCE_LENGTH_RANGE.contains(&out));
        }
    }
}
