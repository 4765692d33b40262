// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Mneme configuration system.

use mneme_config::diagnostic::{suggest_key, ConfigError};
use mneme_config::model::MnemeConfig;
use mneme_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};
use serial_test::serial;

/// Valid TOML with all known sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_mneme_config() {
    let toml = r#"
[general]
log_level = "debug"

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[embedding]
dimensions = 256
ngram_min = 2
ngram_max = 5

[ingest]
max_chars = 1000
overlap = 100
max_file_bytes = 1048576
max_json_sniff_files = 3

[retrieval]
top_k = 4
min_score = 0.5
recency_boost = 0.3
recency_half_life_days = 14.0
fallback_score = 0.1

[persona]
high_intimacy_formality = 0.5
emotion_window = 5

[persona.late_night]
sentence_length = 0.7
decision_speed = 0.7
optimism = 0.8
formality = 0.6

[conversation]
history_window = 10
retention_days = 30

[generation]
timeout_secs = 15
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.embedding.dimensions, 256);
    assert_eq!(config.embedding.ngram_min, 2);
    assert_eq!(config.ingest.max_chars, 1000);
    assert_eq!(config.ingest.max_json_sniff_files, 3);
    assert_eq!(config.retrieval.top_k, 4);
    assert!((config.retrieval.recency_half_life_days - 14.0).abs() < f64::EPSILON);
    assert!((config.persona.high_intimacy_formality - 0.5).abs() < f32::EPSILON);
    assert_eq!(config.persona.emotion_window, 5);
    assert!((config.persona.late_night.formality - 0.6).abs() < f32::EPSILON);
    // Untouched buckets keep their defaults.
    assert!((config.persona.work_hours.formality - 1.2).abs() < f32::EPSILON);
    assert_eq!(config.conversation.retention_days, 30);
    assert_eq!(config.generation.timeout_secs, 15);
}

/// Unknown field in [retrieval] produces an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_in_retrieval_suggests_correction() {
    let toml = r#"
[retrieval]
top_kk = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    let found = errors.iter().any(|e| {
        matches!(
            e,
            ConfigError::UnknownKey { key, suggestion, .. }
                if key == "top_kk" && suggestion.as_deref() == Some("top_k")
        )
    });
    assert!(found, "expected an unknown key diagnostic, got: {errors:?}");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.general.log_level, "info");
    assert!(config.storage.wal_mode);
    assert!(config.storage.database_path.ends_with("mneme.db"));
    assert_eq!(config.embedding.dimensions, 1536);
    assert_eq!(config.ingest.max_chars, 1200);
    assert_eq!(config.ingest.overlap, 120);
    assert_eq!(config.retrieval.top_k, 8);
    assert!((config.retrieval.fallback_score - 0.05).abs() < f32::EPSILON);
    assert!((config.persona.high_intimacy_threshold - 0.7).abs() < f32::EPSILON);
    assert!((config.persona.low_intimacy_threshold - 0.3).abs() < f32::EPSILON);
    assert_eq!(config.persona.emotion_window, 3);
    assert_eq!(config.conversation.history_window, 20);
    assert_eq!(config.generation.timeout_secs, 60);
}

/// Dotted overrides (the shape environment variables are mapped into) win over TOML.
#[test]
fn dotted_override_beats_toml() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[retrieval]
top_k = 3
"#;

    let config: MnemeConfig = Figment::new()
        .merge(Serialized::defaults(MnemeConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("retrieval.top_k", 9))
        .extract()
        .expect("should merge override");

    assert_eq!(config.retrieval.top_k, 9);
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: MnemeConfig = Figment::new()
        .merge(Serialized::defaults(MnemeConfig::default()))
        .merge(Toml::file("/nonexistent/path/mneme.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.retrieval.top_k, 8);
}

/// Unexpected top-level section is rejected by deny_unknown_fields.
#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[telemetry]
enabled = true
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("telemetry"),
        "error should mention the unknown section, got: {err_str}"
    );
}

/// Semantic violations surface as validation errors after a clean parse.
#[test]
fn validation_runs_after_parse() {
    let toml = r#"
[ingest]
max_chars = 100
overlap = 150

[retrieval]
recency_boost = 1.5
"#;

    let errors = load_and_validate_str(toml).expect_err("invalid values should fail");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::Validation { .. })));
}

/// A config file on disk is loaded through the explicit-path entry point.
#[test]
#[serial]
fn load_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mneme.toml");
    std::fs::write(
        &path,
        "[storage]\ndatabase_path = \"/var/lib/mneme/data.db\"\n",
    )
    .unwrap();

    let config = load_and_validate_path(&path).expect("file config should validate");
    assert_eq!(config.storage.database_path, "/var/lib/mneme/data.db");
}

/// Typo suggestions work across the section keys.
#[test]
fn suggestions_for_common_typos() {
    let retrieval_keys = &[
        "top_k",
        "min_score",
        "recency_boost",
        "recency_half_life_days",
        "fallback_score",
    ];
    assert_eq!(
        suggest_key("min_scor", retrieval_keys),
        Some("min_score".to_string())
    );
    assert_eq!(
        suggest_key("recency_bost", retrieval_keys),
        Some("recency_boost".to_string())
    );
}

/// `MNEME_*` variables override values from the file.
#[test]
#[serial]
fn environment_overrides_file_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mneme.toml");
    std::fs::write(&path, "[retrieval]\ntop_k = 3\n").unwrap();

    // SAFETY: env access is serialized by #[serial].
    unsafe { std::env::set_var("MNEME_RETRIEVAL_TOP_K", "7") };
    let loaded = load_and_validate_path(&path);
    unsafe { std::env::remove_var("MNEME_RETRIEVAL_TOP_K") };

    let config = loaded.expect("env override should validate");
    assert_eq!(config.retrieval.top_k, 7);
}
