// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration diagnostics.
//!
//! Figment extraction failures become [`ConfigError`] values that miette can
//! render with the offending line of the TOML file underlined. Unknown keys
//! get a "did you mean" hint from Jaro-Winkler similarity.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a candidate key needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A TOML file that took part in loading, kept for span lookup.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(mneme::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted in the same section.
        valid_keys: String,
        #[label("not a mneme setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(mneme::config::wrong_type), help("expected {expected}"))]
    WrongType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("missing key `{key}`")]
    #[diagnostic(
        code(mneme::config::missing_key),
        help("set `{key}` in mneme.toml or through a MNEME_* variable")
    )]
    MissingKey { key: String },

    /// A value parsed fine but is out of its allowed range.
    #[error("{message}")]
    #[diagnostic(code(mneme::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(mneme::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(key) => format!("did you mean `{key}`? accepted keys: {valid_keys}"),
        None => format!("accepted keys: {valid_keys}"),
    }
}

/// Convert every error carried by `err` into a diagnostic.
pub fn figment_to_config_errors(err: figment::Error, sources: &[SourceFile]) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| ConfigError::from_figment(&error, sources))
        .collect()
}

impl ConfigError {
    fn from_figment(error: &figment::Error, sources: &[SourceFile]) -> Self {
        let dotted = error.path.join(".");
        match &error.kind {
            Kind::UnknownField(field, expected) => {
                let (span, src) = locate(error, field, sources)
                    .map(|(span, src)| (Some(span), Some(src)))
                    .unwrap_or((None, None));
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: if dotted.is_empty() {
                    field.to_string()
                } else {
                    format!("{dotted}.{field}")
                },
            },
            Kind::InvalidType(found, expected) => ConfigError::WrongType {
                key: dotted,
                found: found.to_string(),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        }
    }
}

/// Span of `field` in the file the error came from, if that file was read.
fn locate(
    error: &figment::Error,
    field: &str,
    sources: &[SourceFile],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let figment::Source::File(path) = error.metadata.as_ref()?.source.as_ref()? else {
        return None;
    };
    let name = path.display().to_string();
    let file = sources.iter().find(|s| s.name == name)?;
    let offset = find_key_offset(&file.content, &error.path, field)?;
    Some((
        SourceSpan::new(offset.into(), field.len()),
        NamedSource::new(&file.name, file.content.clone()),
    ))
}

/// Byte offset of `field` as a key inside the `[section]` named by the
/// first element of `path`, or at top level when `path` is empty.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let wanted = path.first().map(String::as_str);
    let mut section: Option<&str> = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('[').and_then(|h| h.strip_suffix(']')) {
            section = Some(header.trim());
        } else if section == wanted {
            let indent = line.len() - line.trim_start().len();
            let key_end = line[indent..]
                .find(|c: char| c == '=' || c.is_whitespace())
                .map(|i| indent + i);
            if key_end.is_some_and(|end| &line[indent..end] == field) {
                return Some(offset + indent);
            }
        }
        offset += line.len();
    }
    None
}

/// Closest accepted key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print diagnostics to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("mneme: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typos_get_suggestions() {
        let retrieval = &["top_k", "min_score", "recency_boost"];
        assert_eq!(suggest_key("top_kk", retrieval), Some("top_k".to_string()));
        let ingest = &["max_chars", "overlap", "max_file_bytes"];
        assert_eq!(suggest_key("overlapp", ingest), Some("overlap".to_string()));
        assert_eq!(suggest_key("zzzzzz", retrieval), None);
    }

    #[test]
    fn key_is_found_inside_its_section_only() {
        let content = "top_kk = 1\n[general]\nlog_level = \"info\"\n\n[retrieval]\n  top_kk = 3\n";
        let path = vec!["retrieval".to_string()];
        let offset = find_key_offset(content, &path, "top_kk").unwrap();
        assert_eq!(&content[offset..offset + 6], "top_kk");
        assert!(offset > content.find("[retrieval]").unwrap());

        assert_eq!(find_key_offset(content, &[], "top_kk"), Some(0));
    }

    #[test]
    fn prefix_of_another_key_does_not_match() {
        let content = "[retrieval]\ntop_k_max = 3\n";
        let path = vec!["retrieval".to_string()];
        assert!(find_key_offset(content, &path, "top_k").is_none());
    }

    #[test]
    fn missing_section_has_no_offset() {
        let content = "[general]\nlog_level = \"info\"\n";
        let path = vec!["retrieval".to_string()];
        assert!(find_key_offset(content, &path, "top_k").is_none());
    }
}
