// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Line-oriented chat exports.
//!
//! Accepts both common layouts:
//! ```text
//! [31/12/2023, 21:04:11] Ana: happy new year
//! 12/31/23, 9:04 PM - Ben: you too
//! ```
//! Lines that do not start a message continue the previous one.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use mneme_core::types::format_timestamp;
use regex::Regex;

use super::ExtractedRecord;

static MESSAGE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[?(?P<date>\d{1,4}[./-]\d{1,2}[./-]\d{1,4}),?\s+(?P<time>\d{1,2}:\d{2}(?::\d{2})?(?:\s?[APap]\.?\s?[Mm]\.?)?)\]?\s*(?:-\s*)?(?P<name>[^:]{1,80}?):\s(?P<text>.*)$",
    )
    .unwrap()
});

/// Timestamped line without an author (encryption notices, group events).
static SYSTEM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[?\d{1,4}[./-]\d{1,2}[./-]\d{1,4},?\s+\d{1,2}:\d{2}").unwrap()
});

struct ChatMessage {
    sender: String,
    text: String,
    sent_at: Option<String>,
}

/// One record per file. Text without any recognizable message line is kept
/// as plain text.
pub fn extract_chat_text(raw: &str) -> Vec<ExtractedRecord> {
    let mut messages: Vec<ChatMessage> = Vec::new();
    let mut in_system_line = false;

    for line in raw.lines() {
        let line = line.trim_start_matches(['\u{200e}', '\u{feff}']);
        if let Some(caps) = MESSAGE_LINE.captures(line) {
            messages.push(ChatMessage {
                sender: caps["name"].trim().to_string(),
                text: caps["text"].to_string(),
                sent_at: parse_sent_at(&caps["date"], &caps["time"]),
            });
            in_system_line = false;
        } else if SYSTEM_LINE.is_match(line) {
            in_system_line = true;
        } else if !in_system_line {
            if let Some(last) = messages.last_mut() {
                last.text.push('\n');
                last.text.push_str(line);
            }
        }
    }

    if messages.is_empty() {
        return vec![super::extract_plain(raw)];
    }

    let participants: Vec<String> = messages
        .iter()
        .map(|m| m.sender.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let first_at = messages.iter().find_map(|m| m.sent_at.clone());
    let last_at = messages.iter().rev().find_map(|m| m.sent_at.clone());
    let text = messages
        .iter()
        .map(|m| format!("{}: {}", m.sender, m.text))
        .collect::<Vec<_>>()
        .join("\n");

    let mut record = ExtractedRecord::new("text/plain", text)
        .with_title(Some(format!("Chat with {}", participants.join(", "))))
        .with_created_at(last_at.clone())
        .with_meta("format", "chat_text")
        .with_meta("message_count", messages.len())
        .with_meta("participants", participants);
    if let Some(first) = first_at {
        record = record.with_meta("first_message_at", first);
    }
    if let Some(last) = last_at {
        record = record.with_meta("last_message_at", last);
    }
    vec![record]
}

fn parse_sent_at(date: &str, time: &str) -> Option<String> {
    let date = parse_chat_date(date)?;
    let time = parse_chat_time(time).unwrap_or(NaiveTime::MIN);
    Some(format_timestamp(&date.and_time(time).and_utc()))
}

/// `YYYY-MM-DD`, otherwise day-first with a month-first retry when the
/// day-first reading is not a valid date. Two-digit years are 20xx.
fn parse_chat_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw.split(['/', '.', '-']).collect();
    if parts.len() != 3 {
        return None;
    }
    let nums = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<Vec<u32>>>()?;
    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(nums[0] as i32, nums[1], nums[2]);
    }
    let year = if parts[2].len() == 2 {
        2000 + nums[2] as i32
    } else {
        nums[2] as i32
    };
    NaiveDate::from_ymd_opt(year, nums[1], nums[0])
        .or_else(|| NaiveDate::from_ymd_opt(year, nums[0], nums[1]))
}

fn parse_chat_time(raw: &str) -> Option<NaiveTime> {
    let lower = raw.to_ascii_lowercase();
    let clock: String = lower
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == ':')
        .collect();
    let mut fields = clock.split(':').map(|f| f.parse::<u32>().ok());
    let mut hour = fields.next()??;
    let minute = fields.next()??;
    let second = fields.next().flatten().unwrap_or(0);
    if lower.contains('p') && hour < 12 {
        hour += 12;
    } else if lower.contains('a') && hour == 12 {
        hour = 0;
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_export_is_parsed() {
        let raw = "[31/12/2023, 21:04:11] Ana: happy new year\n\
                   [31/12/2023, 21:05:00] Ben: you too!\n\
                   see you tomorrow\n";
        let records = extract_chat_text(raw);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.text, "Ana: happy new year\nBen: you too!\nsee you tomorrow");
        assert_eq!(record.title.as_deref(), Some("Chat with Ana, Ben"));
        assert_eq!(record.metadata["message_count"], 2);
        assert_eq!(record.created_at.as_deref(), Some("2023-12-31T21:05:00.000Z"));
        assert_eq!(record.metadata["first_message_at"], "2023-12-31T21:04:11.000Z");
    }

    #[test]
    fn dash_export_with_am_pm_is_parsed() {
        let raw = "12/31/23, 9:04 PM - Messages and calls are end-to-end encrypted.\n\
                   12/31/23, 9:05 PM - Ben: late again\n\
                   1/1/24, 12:10 AM - Ana: on my way\n";
        let record = &extract_chat_text(raw)[0];
        assert_eq!(record.text, "Ben: late again\nAna: on my way");
        assert_eq!(record.metadata["first_message_at"], "2023-12-31T21:05:00.000Z");
        assert_eq!(record.created_at.as_deref(), Some("2024-01-01T00:10:00.000Z"));
    }

    #[test]
    fn unstructured_text_falls_back_to_plain() {
        let records = extract_chat_text("no chat lines here\njust notes");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "no chat lines here\njust notes");
        assert!(records[0].title.is_none());
    }

    #[test]
    fn dates_resolve_day_or_month_first() {
        assert_eq!(parse_chat_date("2024-03-05"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_chat_date("05.03.2024"), NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(parse_chat_date("12/31/23"), NaiveDate::from_ymd_opt(2023, 12, 31));
        assert!(parse_chat_date("99/99/99").is_none());
    }
}
