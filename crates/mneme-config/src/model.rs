// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Mneme.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mneme configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemeConfig {
    /// Process-wide settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Embedding settings.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Import pipeline settings.
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Hybrid retrieval settings.
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Contextual persona adjustment settings.
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Conversation history settings.
    #[serde(default)]
    pub conversation: ConversationConfig,

    /// Reply generation settings.
    #[serde(default)]
    pub generation: GenerationConfig,
}

/// Process-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneralConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("mneme").join("mneme.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("mneme.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Embedding configuration for the local hashing embedder.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// Output vector dimensionality.
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,

    /// Shortest character n-gram hashed into the vector.
    #[serde(default = "default_ngram_min")]
    pub ngram_min: usize,

    /// Longest character n-gram hashed into the vector.
    #[serde(default = "default_ngram_max")]
    pub ngram_max: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            ngram_min: default_ngram_min(),
            ngram_max: default_ngram_max(),
        }
    }
}

fn default_dimensions() -> usize {
    1536
}

fn default_ngram_min() -> usize {
    3
}

fn default_ngram_max() -> usize {
    4
}

/// Import pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IngestConfig {
    /// Maximum characters per chunk.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Characters shared between consecutive chunks.
    #[serde(default = "default_overlap")]
    pub overlap: usize,

    /// Files larger than this are skipped and counted as failed.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// How many top-level JSON files the detector inspects.
    #[serde(default = "default_max_json_sniff_files")]
    pub max_json_sniff_files: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            overlap: default_overlap(),
            max_file_bytes: default_max_file_bytes(),
            max_json_sniff_files: default_max_json_sniff_files(),
        }
    }
}

fn default_max_chars() -> usize {
    1200
}

fn default_overlap() -> usize {
    120
}

fn default_max_file_bytes() -> u64 {
    64 * 1024 * 1024
}

fn default_max_json_sniff_files() -> usize {
    5
}

/// Hybrid retrieval configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetrievalConfig {
    /// Maximum number of memories returned per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Scores below this are dropped before truncation.
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Weight of the recency decay in the final score (0.0 - 1.0).
    #[serde(default = "default_recency_boost")]
    pub recency_boost: f32,

    /// Age in days at which the recency decay reaches one half.
    #[serde(default = "default_recency_half_life_days")]
    pub recency_half_life_days: f64,

    /// Score attached to recent chunks returned when nothing passes `min_score`.
    #[serde(default = "default_fallback_score")]
    pub fallback_score: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_score: default_min_score(),
            recency_boost: default_recency_boost(),
            recency_half_life_days: default_recency_half_life_days(),
            fallback_score: default_fallback_score(),
        }
    }
}

fn default_top_k() -> usize {
    8
}

fn default_min_score() -> f32 {
    0.2
}

fn default_recency_boost() -> f32 {
    0.15
}

fn default_recency_half_life_days() -> f64 {
    30.0
}

fn default_fallback_score() -> f32 {
    0.05
}

/// Multipliers applied to a persona during one time-of-day bucket.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TimeOfDayMultipliers {
    pub sentence_length: f32,
    pub decision_speed: f32,
    pub optimism: f32,
    pub formality: f32,
}

impl TimeOfDayMultipliers {
    fn values(&self) -> [(&'static str, f32); 4] {
        [
            ("sentence_length", self.sentence_length),
            ("decision_speed", self.decision_speed),
            ("optimism", self.optimism),
            ("formality", self.formality),
        ]
    }
}

/// Contextual persona adjustment configuration.
///
/// Every multiplier here is an empirical default; none is load-bearing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    /// Intimacy above which the persona becomes more casual.
    #[serde(default = "default_high_intimacy_threshold")]
    pub high_intimacy_threshold: f32,

    /// Intimacy below which the persona becomes more formal.
    #[serde(default = "default_low_intimacy_threshold")]
    pub low_intimacy_threshold: f32,

    #[serde(default = "default_high_intimacy_formality")]
    pub high_intimacy_formality: f32,

    #[serde(default = "default_high_intimacy_emoji")]
    pub high_intimacy_emoji: f32,

    #[serde(default = "default_high_intimacy_humor")]
    pub high_intimacy_humor: f32,

    #[serde(default = "default_low_intimacy_formality")]
    pub low_intimacy_formality: f32,

    #[serde(default = "default_low_intimacy_emoji")]
    pub low_intimacy_emoji: f32,

    #[serde(default = "default_low_intimacy_humor")]
    pub low_intimacy_humor: f32,

    /// Fraction of the relationship's emotional tone added to baseline sentiment.
    #[serde(default = "default_tone_shift_weight")]
    pub tone_shift_weight: f32,

    /// Number of most recent dialogue turns used for emotion estimation.
    #[serde(default = "default_emotion_window")]
    pub emotion_window: usize,

    /// Average sentiment beyond which the state is positive or negative.
    #[serde(default = "default_emotion_threshold")]
    pub emotion_threshold: f32,

    /// 00:00 - 05:59.
    #[serde(default = "default_late_night")]
    pub late_night: TimeOfDayMultipliers,

    /// 06:00 - 08:59.
    #[serde(default = "default_morning")]
    pub morning: TimeOfDayMultipliers,

    /// 09:00 - 17:59.
    #[serde(default = "default_work_hours")]
    pub work_hours: TimeOfDayMultipliers,

    /// 18:00 - 23:59.
    #[serde(default = "default_evening")]
    pub evening: TimeOfDayMultipliers,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            high_intimacy_threshold: default_high_intimacy_threshold(),
            low_intimacy_threshold: default_low_intimacy_threshold(),
            high_intimacy_formality: default_high_intimacy_formality(),
            high_intimacy_emoji: default_high_intimacy_emoji(),
            high_intimacy_humor: default_high_intimacy_humor(),
            low_intimacy_formality: default_low_intimacy_formality(),
            low_intimacy_emoji: default_low_intimacy_emoji(),
            low_intimacy_humor: default_low_intimacy_humor(),
            tone_shift_weight: default_tone_shift_weight(),
            emotion_window: default_emotion_window(),
            emotion_threshold: default_emotion_threshold(),
            late_night: default_late_night(),
            morning: default_morning(),
            work_hours: default_work_hours(),
            evening: default_evening(),
        }
    }
}

impl PersonaConfig {
    /// All multipliers with their dotted names, for validation.
    pub fn multipliers(&self) -> Vec<(String, f32)> {
        let mut out = vec![
            ("high_intimacy_formality".to_string(), self.high_intimacy_formality),
            ("high_intimacy_emoji".to_string(), self.high_intimacy_emoji),
            ("high_intimacy_humor".to_string(), self.high_intimacy_humor),
            ("low_intimacy_formality".to_string(), self.low_intimacy_formality),
            ("low_intimacy_emoji".to_string(), self.low_intimacy_emoji),
            ("low_intimacy_humor".to_string(), self.low_intimacy_humor),
        ];
        for (bucket, m) in [
            ("late_night", &self.late_night),
            ("morning", &self.morning),
            ("work_hours", &self.work_hours),
            ("evening", &self.evening),
        ] {
            for (field, value) in m.values() {
                out.push((format!("{bucket}.{field}"), value));
            }
        }
        out
    }
}

fn default_high_intimacy_threshold() -> f32 {
    0.7
}

fn default_low_intimacy_threshold() -> f32 {
    0.3
}

fn default_high_intimacy_formality() -> f32 {
    0.6
}

fn default_high_intimacy_emoji() -> f32 {
    1.4
}

fn default_high_intimacy_humor() -> f32 {
    1.5
}

fn default_low_intimacy_formality() -> f32 {
    1.4
}

fn default_low_intimacy_emoji() -> f32 {
    0.6
}

fn default_low_intimacy_humor() -> f32 {
    0.7
}

fn default_tone_shift_weight() -> f32 {
    0.3
}

fn default_emotion_window() -> usize {
    3
}

fn default_emotion_threshold() -> f32 {
    0.3
}

fn default_late_night() -> TimeOfDayMultipliers {
    TimeOfDayMultipliers {
        sentence_length: 0.8,
        decision_speed: 0.8,
        optimism: 0.9,
        formality: 0.8,
    }
}

fn default_morning() -> TimeOfDayMultipliers {
    TimeOfDayMultipliers {
        sentence_length: 0.9,
        decision_speed: 1.1,
        optimism: 1.1,
        formality: 1.0,
    }
}

fn default_work_hours() -> TimeOfDayMultipliers {
    TimeOfDayMultipliers {
        sentence_length: 1.0,
        decision_speed: 1.1,
        optimism: 1.0,
        formality: 1.2,
    }
}

fn default_evening() -> TimeOfDayMultipliers {
    TimeOfDayMultipliers {
        sentence_length: 1.1,
        decision_speed: 0.9,
        optimism: 1.0,
        formality: 0.9,
    }
}

/// Conversation history configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConversationConfig {
    /// Number of recent turns carried into a snapshot.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Turns older than this many days are removed by `prune`.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            retention_days: default_retention_days(),
        }
    }
}

fn default_history_window() -> usize {
    20
}

fn default_retention_days() -> u32 {
    90
}

/// Reply generation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Upper bound on a single generation call.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieval_defaults() {
        let config = RetrievalConfig::default();
        assert_eq!(config.top_k, 8);
        assert!((config.recency_half_life_days - 30.0).abs() < f64::EPSILON);
        assert!((config.fallback_score - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn persona_multipliers_list_every_bucket() {
        let config = PersonaConfig::default();
        let names: Vec<String> = config.multipliers().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), 6 + 4 * 4);
        assert!(names.contains(&"late_night.formality".to_string()));
        assert!(names.contains(&"evening.decision_speed".to_string()));
    }

    #[test]
    fn partial_time_bucket_is_rejected() {
        let toml_str = r#"
[persona.morning]
optimism = 1.2
"#;
        assert!(toml::from_str::<MnemeConfig>(toml_str).is_err());
    }

    #[test]
    fn ingest_section_deserializes() {
        let toml_str = r#"
[ingest]
max_chars = 800
overlap = 80
"#;
        let config: MnemeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ingest.max_chars, 800);
        assert_eq!(config.ingest.overlap, 80);
        assert_eq!(config.ingest.max_json_sniff_files, 5);
    }
}
