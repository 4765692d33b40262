// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Format-specific record extraction.
//!
//! Every extractor turns raw file bytes into zero or more
//! [`ExtractedRecord`]s. Extraction is best effort: malformed input falls
//! back to plain text rather than failing the file.

pub mod calendar;
pub mod chat;
pub mod json;
pub mod mail;

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use mneme_core::types::{format_timestamp, parse_timestamp, Metadata};
use mneme_core::MnemeError;
use serde_json::Value;
use tracing::debug;

use crate::normalize::strip_markup;

/// One document-to-be, before normalization and storage.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRecord {
    pub title: Option<String>,
    pub text: String,
    pub content_type: String,
    /// Item's own creation time, when the format carries one.
    pub created_at: Option<String>,
    pub metadata: Metadata,
}

impl ExtractedRecord {
    pub fn new(content_type: &str, text: impl Into<String>) -> Self {
        Self {
            title: None,
            text: text.into(),
            content_type: content_type.to_string(),
            created_at: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_created_at(mut self, created_at: Option<String>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// File formats the importers understand, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Html,
    Calendar,
    Mbox,
    Eml,
    /// Line-oriented chat export (`[date, time] Name: text`).
    ChatText,
    PlainText,
}

impl FileFormat {
    /// Format for a path by extension. `.txt` is plain text; chat importers
    /// upgrade it to [`FileFormat::ChatText`].
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let format = match ext.as_str() {
            "json" => FileFormat::Json,
            "html" | "htm" => FileFormat::Html,
            "ics" => FileFormat::Calendar,
            "mbox" => FileFormat::Mbox,
            "eml" => FileFormat::Eml,
            "txt" | "md" | "csv" => FileFormat::PlainText,
            _ => return None,
        };
        Some(format)
    }
}

/// Extract records from raw bytes in the given format.
pub fn extract_bytes(
    path: &Path,
    raw: &[u8],
    format: FileFormat,
) -> Result<Vec<ExtractedRecord>, MnemeError> {
    let records = match format {
        FileFormat::Json => json::extract_json(raw),
        FileFormat::Html => vec![extract_html(&String::from_utf8_lossy(raw))],
        FileFormat::Calendar => calendar::extract_calendar(&String::from_utf8_lossy(raw)),
        FileFormat::Mbox => {
            let messages = mail::extract_mbox(raw);
            if messages.is_empty() && !raw.iter().all(u8::is_ascii_whitespace) {
                debug!(path = %path.display(), "no messages in mailbox, keeping raw text");
                vec![extract_plain(&String::from_utf8_lossy(raw))]
            } else {
                messages
            }
        }
        FileFormat::Eml => mail::extract_message(raw).into_iter().collect(),
        FileFormat::ChatText => chat::extract_chat_text(&String::from_utf8_lossy(raw)),
        FileFormat::PlainText => vec![extract_plain(&String::from_utf8_lossy(raw))],
    };
    Ok(records
        .into_iter()
        .map(|record| {
            if record.metadata.contains_key("file") {
                record
            } else {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                record.with_meta("file", name)
            }
        })
        .collect())
}

pub fn extract_plain(text: &str) -> ExtractedRecord {
    ExtractedRecord::new("text/plain", text)
}

/// HTML page: `<title>` becomes the title, markup is stripped from the body.
pub fn extract_html(html: &str) -> ExtractedRecord {
    let title = html_title(html);
    ExtractedRecord::new("text/html", strip_markup(html)).with_title(title)
}

fn html_title(html: &str) -> Option<String> {
    let lower = html.to_ascii_lowercase();
    let open = lower.find("<title")?;
    let start = open + lower[open..].find('>')? + 1;
    let end = start + lower[start..].find("</title")?;
    let title = crate::normalize::normalize(&strip_markup(&html[start..end]));
    (!title.is_empty()).then_some(title)
}

/// Unix seconds to a canonical timestamp.
pub(crate) fn timestamp_from_unix(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|t| format_timestamp(&t))
}

/// Best-effort timestamp from a JSON value: unix seconds or milliseconds
/// (numeric or numeric string), RFC 3339, or a naive `YYYY-MM-DDTHH:MM:SS`.
pub(crate) fn timestamp_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)).and_then(unix_guess),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                return unix_guess(n);
            }
            if let Some(ts) = parse_timestamp(s) {
                return Some(format_timestamp(&ts));
            }
            ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|naive| format_timestamp(&naive.and_utc()))
        }
        _ => None,
    }
}

fn unix_guess(n: i64) -> Option<String> {
    if n <= 0 {
        return None;
    }
    // Values beyond year 5138 in seconds are milliseconds.
    if n > 100_000_000_000 {
        timestamp_from_unix(n / 1000)
    } else {
        timestamp_from_unix(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn format_is_chosen_by_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a/B.JSON")), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_path(Path::new("x.htm")), Some(FileFormat::Html));
        assert_eq!(FileFormat::from_path(Path::new("cal.ics")), Some(FileFormat::Calendar));
        assert_eq!(FileFormat::from_path(Path::new("notes.md")), Some(FileFormat::PlainText));
        assert_eq!(FileFormat::from_path(Path::new("photo.jpg")), None);
        assert_eq!(FileFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn html_title_and_body_are_extracted() {
        let record = extract_html("<html><head><title>Trip &amp; Plans</title></head><body><p>Pack bags</p></body></html>");
        assert_eq!(record.title.as_deref(), Some("Trip & Plans"));
        assert_eq!(crate::normalize::normalize(&record.text), "Pack bags");
        assert_eq!(record.content_type, "text/html");
    }

    #[test]
    fn timestamps_from_json_values() {
        assert_eq!(
            timestamp_from_value(&json!(1_700_000_000)).as_deref(),
            Some("2023-11-14T22:13:20.000Z")
        );
        assert_eq!(
            timestamp_from_value(&json!(1_700_000_000_000i64)).as_deref(),
            Some("2023-11-14T22:13:20.000Z")
        );
        assert_eq!(
            timestamp_from_value(&json!("1700000000")).as_deref(),
            Some("2023-11-14T22:13:20.000Z")
        );
        assert_eq!(
            timestamp_from_value(&json!("2023-01-02T03:04:05")).as_deref(),
            Some("2023-01-02T03:04:05.000Z")
        );
        assert!(timestamp_from_value(&json!("yesterday")).is_none());
        assert!(timestamp_from_value(&json!(null)).is_none());
    }

    #[test]
    fn file_name_is_recorded_in_metadata() {
        let records = extract_bytes(Path::new("dir/note.txt"), b"hello", FileFormat::PlainText).unwrap();
        assert_eq!(records[0].metadata["file"], "note.txt");
    }

    #[test]
    fn mailbox_without_messages_falls_back_to_raw_text() {
        let records =
            extract_bytes(Path::new("x.mbox"), b"\x00\x01 not a mailbox", FileFormat::Mbox).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].content_type, "text/plain");
        assert!(records[0].text.contains("not a mailbox"));
    }
}
