// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! iCalendar (`.ics`) event extraction.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use mneme_core::types::format_timestamp;

use super::ExtractedRecord;

const CONTENT_TYPE: &str = "text/calendar";

/// One record per `VEVENT` with a summary or description.
pub fn extract_calendar(raw: &str) -> Vec<ExtractedRecord> {
    let mut records = Vec::new();
    let mut event: Option<HashMap<String, String>> = None;

    for line in unfold(raw) {
        let upper = line.trim().to_ascii_uppercase();
        if upper == "BEGIN:VEVENT" {
            event = Some(HashMap::new());
            continue;
        }
        if upper == "END:VEVENT" {
            if let Some(props) = event.take() {
                records.extend(event_record(&props));
            }
            continue;
        }
        let Some(props) = event.as_mut() else {
            continue;
        };
        let Some((name_params, value)) = line.split_once(':') else {
            continue;
        };
        let name = name_params
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_uppercase();
        // Nested components (VALARM) may repeat names; the event's own wins.
        props.entry(name).or_insert_with(|| unescape(value));
    }
    records
}

/// Join folded continuation lines (leading space or tab).
fn unfold(raw: &str) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for line in raw.lines() {
        match (line.strip_prefix([' ', '\t']), lines.last_mut()) {
            (Some(rest), Some(last)) => last.push_str(rest),
            _ => lines.push(line.to_string()),
        }
    }
    lines
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn event_record(props: &HashMap<String, String>) -> Option<ExtractedRecord> {
    let field = |name: &str| props.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());
    let summary = field("SUMMARY");
    let description = field("DESCRIPTION");
    if summary.is_none() && description.is_none() {
        return None;
    }

    let mut lines: Vec<String> = summary.into_iter().chain(description).map(str::to_string).collect();
    let location = field("LOCATION");
    if let Some(location) = location {
        lines.push(format!("Location: {location}"));
    }

    let starts_at = field("DTSTART").and_then(parse_ics_time);
    let mut record = ExtractedRecord::new(CONTENT_TYPE, lines.join("\n"))
        .with_title(summary.map(str::to_string))
        .with_created_at(starts_at.clone());
    if let Some(start) = starts_at {
        record = record.with_meta("starts_at", start);
    }
    if let Some(end) = field("DTEND").and_then(parse_ics_time) {
        record = record.with_meta("ends_at", end);
    }
    if let Some(location) = location {
        record = record.with_meta("location", location);
    }
    if let Some(uid) = field("UID") {
        record = record.with_meta("uid", uid);
    }
    Some(record)
}

/// `20240101T120000Z`, floating `20240101T120000`, or all-day `20240101`.
fn parse_ics_time(value: &str) -> Option<String> {
    let value = value.trim_end_matches(['Z', 'z']);
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S") {
        return Some(format_timestamp(&naive.and_utc()));
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| format_timestamp(&naive.and_utc()))
}
