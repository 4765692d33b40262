// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contextual persona adjustment.
//!
//! [`ContextualAdjuster::adjust`] is pure: the base persona is copied, the
//! rules below are applied to the copy, and every scalar is clamped back into
//! range before it is returned.
//!
//! 1. Emotion is estimated from the last `emotion_window` turns.
//! 2. A relationship's intimacy band scales formality, emoji and humor, and
//!    its emotional tone shifts baseline sentiment.
//! 3. The local hour picks a time-of-day bucket whose multipliers scale
//!    sentence length, decision speed, optimism and formality.

use chrono::{DateTime, FixedOffset, Timelike};
use mneme_config::model::{PersonaConfig, TimeOfDayMultipliers};
use mneme_core::persona::{bounded, PersonaVector, SIGNED_RANGE, UNIT_RANGE};
use mneme_core::types::{DialogueTurn, RelationshipProfile};
use serde::Serialize;
use strum::Display;
use tracing::debug;

use crate::emotion::{estimate, EmotionalState};

/// Coarse part of the day, from the local hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    LateNight,
    Morning,
    WorkHours,
    Evening,
}

impl TimeBucket {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => TimeBucket::LateNight,
            6..=8 => TimeBucket::Morning,
            9..=17 => TimeBucket::WorkHours,
            _ => TimeBucket::Evening,
        }
    }

    fn multipliers(self, config: &PersonaConfig) -> &TimeOfDayMultipliers {
        match self {
            TimeBucket::LateNight => &config.late_night,
            TimeBucket::Morning => &config.morning,
            TimeBucket::WorkHours => &config.work_hours,
            TimeBucket::Evening => &config.evening,
        }
    }
}

/// Intimacy band of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IntimacyBand {
    Close,
    Neutral,
    Distant,
}

/// Result of one adjustment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdjustedPersona {
    pub persona: PersonaVector,
    pub emotion: EmotionalState,
    pub time_bucket: TimeBucket,
    /// `None` when no relationship was supplied.
    pub intimacy_band: Option<IntimacyBand>,
}

/// Applies relationship, time-of-day and emotion context to a base persona.
#[derive(Debug, Clone, Default)]
pub struct ContextualAdjuster {
    config: PersonaConfig,
}

impl ContextualAdjuster {
    pub fn new(config: PersonaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }

    pub fn intimacy_band(&self, intimacy: f64) -> IntimacyBand {
        if intimacy > f64::from(self.config.high_intimacy_threshold) {
            IntimacyBand::Close
        } else if intimacy < f64::from(self.config.low_intimacy_threshold) {
            IntimacyBand::Distant
        } else {
            IntimacyBand::Neutral
        }
    }

    /// Adjust `base` for the given context. `base` is never modified.
    pub fn adjust(
        &self,
        base: &PersonaVector,
        relationship: Option<&RelationshipProfile>,
        at: DateTime<FixedOffset>,
        recent: &[DialogueTurn],
    ) -> AdjustedPersona {
        let cfg = &self.config;
        let mut persona = base.clone();

        let texts: Vec<&str> = recent.iter().map(|turn| turn.content.as_str()).collect();
        let emotion = estimate(
            &texts,
            cfg.emotion_window,
            f64::from(cfg.emotion_threshold),
            base.emotional.volatility,
        );

        let intimacy_band = relationship.map(|rel| {
            let band = self.intimacy_band(bounded(rel.intimacy_level, &UNIT_RANGE));
            let (formality, emoji, humor) = match band {
                IntimacyBand::Close => (
                    cfg.high_intimacy_formality,
                    cfg.high_intimacy_emoji,
                    cfg.high_intimacy_humor,
                ),
                IntimacyBand::Distant => (
                    cfg.low_intimacy_formality,
                    cfg.low_intimacy_emoji,
                    cfg.low_intimacy_humor,
                ),
                IntimacyBand::Neutral => (1.0, 1.0, 1.0),
            };
            let l = &mut persona.linguistic;
            l.formality_level *= f64::from(formality);
            l.emoji_rate *= f64::from(emoji);
            l.humor_frequency *= f64::from(humor);

            let tone = bounded(rel.emotional_tone, &SIGNED_RANGE);
            persona.emotional.baseline_sentiment += tone * f64::from(cfg.tone_shift_weight);
            band
        });

        let time_bucket = TimeBucket::from_hour(at.hour());
        let m = time_bucket.multipliers(cfg);
        persona.linguistic.sentence_length_preference *= f64::from(m.sentence_length);
        persona.cognitive.decision_speed *= f64::from(m.decision_speed);
        persona.emotional.optimism *= f64::from(m.optimism);
        persona.linguistic.formality_level *= f64::from(m.formality);

        persona.clamp_ranges();

        debug!(
            user_id = %base.user_id,
            time_bucket = %time_bucket,
            intimacy = ?intimacy_band,
            emotion = %emotion.label,
            "persona adjusted"
        );

        AdjustedPersona {
            persona,
            emotion,
            time_bucket,
            intimacy_band,
        }
    }
}
