// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mailbox (`.mbox`) and single-message (`.eml`) extraction.
//!
//! The document content is the message body only, so the same body sent
//! under different subjects deduplicates to one document.

use mail_parser::MessageParser;

use super::{timestamp_from_unix, ExtractedRecord};
use crate::normalize::strip_markup;

const CONTENT_TYPE: &str = "message/rfc822";

/// Split an mbox file into raw messages.
///
/// Messages start at lines beginning with `From `. Bytes before the first
/// separator are ignored. Escaped body lines (`>From `) lose one `>`.
pub fn split_mbox(raw: &[u8]) -> Vec<Vec<u8>> {
    let mut messages = Vec::new();
    let mut current: Option<Vec<u8>> = None;
    for line in raw.split_inclusive(|b| *b == b'\n') {
        if line.starts_with(b"From ") {
            if let Some(done) = current.take() {
                messages.push(done);
            }
            current = Some(Vec::new());
            continue;
        }
        let Some(buf) = current.as_mut() else {
            continue;
        };
        let quoted = line.iter().take_while(|b| **b == b'>').count();
        if quoted > 0 && line[quoted..].starts_with(b"From ") {
            buf.extend_from_slice(&line[1..]);
        } else {
            buf.extend_from_slice(line);
        }
    }
    if let Some(done) = current {
        messages.push(done);
    }
    messages.retain(|m| !m.iter().all(u8::is_ascii_whitespace));
    messages
}

/// Extract every parseable message of an mbox file.
pub fn extract_mbox(raw: &[u8]) -> Vec<ExtractedRecord> {
    split_mbox(raw)
        .iter()
        .filter_map(|message| extract_message(message))
        .collect()
}

/// Extract one RFC 822 message. `None` when it has neither body nor subject.
pub fn extract_message(raw: &[u8]) -> Option<ExtractedRecord> {
    let message = MessageParser::default().parse(raw)?;
    let subject = message.subject().map(str::to_string);

    let body = match message.body_text(0) {
        Some(text) if !text.trim().is_empty() => text.into_owned(),
        _ => message
            .body_html(0)
            .map(|html| strip_markup(&html))
            .unwrap_or_default(),
    };
    let text = if body.trim().is_empty() {
        subject.clone()?
    } else {
        body
    };

    let created_at = message.date().and_then(|d| timestamp_from_unix(d.to_timestamp()));
    let mut record = ExtractedRecord::new(CONTENT_TYPE, text)
        .with_title(subject)
        .with_created_at(created_at);
    if let Some(from) = message.from().and_then(|a| a.first()) {
        if let Some(address) = from.address() {
            record = record.with_meta("from", address);
        }
        if let Some(name) = from.name() {
            record = record.with_meta("from_name", name);
        }
    }
    if let Some(to) = message.to().and_then(|a| a.first()).and_then(|a| a.address()) {
        record = record.with_meta("to", to);
    }
    if let Some(id) = message.message_id() {
        record = record.with_meta("message_id", id);
    }
    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MBOX: &[u8] = b"From alice@example.com Mon Jan  1 10:00:00 2024\n\
Subject: Lunch\n\
From: Alice <alice@example.com>\n\
To: bob@example.com\n\
Date: Mon, 1 Jan 2024 10:00:00 +0000\n\
Message-ID: <m1@example.com>\n\
\n\
Shall we meet at noon?\n\
>From the cafe, I mean.\n\
\n\
From carol@example.com Tue Jan  2 11:00:00 2024\n\
Subject: Re: Lunch\n\
From: carol@example.com\n\
Date: Tue, 2 Jan 2024 11:00:00 +0000\n\
\n\
Count me in.\n";

    #[test]
    fn mbox_splits_on_separator_lines() {
        let messages = split_mbox(MBOX);
        assert_eq!(messages.len(), 2);
        let first = String::from_utf8_lossy(&messages[0]);
        assert!(first.starts_with("Subject: Lunch"));
        assert!(first.contains("\nFrom the cafe"));
    }

    #[test]
    fn preamble_before_first_separator_is_ignored() {
        assert!(split_mbox(b"garbage\nmore garbage\n").is_empty());
    }

    #[test]
    fn messages_carry_subject_sender_and_date() {
        let records = extract_mbox(MBOX);
        assert_eq!(records.len(), 2);
        let first = &records[0];
        assert_eq!(first.title.as_deref(), Some("Lunch"));
        assert!(first.text.contains("Shall we meet at noon?"));
        assert_eq!(first.metadata["from"], "alice@example.com");
        assert_eq!(first.metadata["from_name"], "Alice");
        assert_eq!(first.metadata["to"], "bob@example.com");
        assert_eq!(first.created_at.as_deref(), Some("2024-01-01T10:00:00.000Z"));
        assert_eq!(first.content_type, "message/rfc822");
        assert!(records[1].text.contains("Count me in."));
    }

    #[test]
    fn single_message_is_extracted() {
        let eml = b"Subject: Hello\r\nFrom: a@example.com\r\n\r\nBody text here\r\n";
        let record = extract_message(eml).unwrap();
        assert_eq!(record.title.as_deref(), Some("Hello"));
        assert!(record.text.contains("Body text here"));
    }
}
