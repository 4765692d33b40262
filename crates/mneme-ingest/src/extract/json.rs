// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON export shapes.
//!
//! Exports from different services share no schema, so a parsed document is
//! matched against a fixed list of shapes in priority order and extracted by
//! the first one that fits. [`JsonShape::Generic`] always fits.

use serde_json::Value;
use tracing::debug;

use super::{timestamp_from_value, ExtractedRecord};

const CONTENT_TYPE: &str = "application/json";

/// Fields that carry message text, in preference order.
const MESSAGE_TEXT_FIELDS: &[&str] = &["content", "text", "body", "message"];

/// Fields that name a message author.
const SENDER_FIELDS: &[&str] = &["sender_name", "from", "sender", "author", "user"];

/// Fields that carry a message or post time.
const TIME_FIELDS: &[&str] = &[
    "timestamp_ms",
    "timestamp",
    "date_unixtime",
    "creation_timestamp",
    "date",
    "created_at",
    "time",
];

/// Keys that mark an object as a social post.
const POST_KEYS: &[&str] = &["string_map_data", "data", "media", "post", "attachments"];

/// Fields the generic fallback collects text from.
const GENERIC_TEXT_FIELDS: &[&str] = &[
    "title",
    "subject",
    "name",
    "text",
    "content",
    "body",
    "message",
    "description",
    "caption",
    "snippet",
    "value",
];

/// Known JSON export shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonShape {
    /// A conversation with an explicit participant list.
    SocialThread,
    /// One or more chat conversations made of sender/text messages.
    ChatLog,
    /// A list of posts, stories or comments.
    PostList,
    /// A photo library sidecar describing one image.
    PhotoMetadata,
    /// Anything else: collect text fields.
    Generic,
}

impl JsonShape {
    /// Shapes in the order they are tried.
    pub const PRIORITY: [JsonShape; 5] = [
        JsonShape::SocialThread,
        JsonShape::ChatLog,
        JsonShape::PostList,
        JsonShape::PhotoMetadata,
        JsonShape::Generic,
    ];

    /// First shape in priority order that matches `value`.
    pub fn classify(value: &Value) -> JsonShape {
        Self::PRIORITY
            .into_iter()
            .find(|shape| shape.matches(value))
            .unwrap_or(JsonShape::Generic)
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            JsonShape::SocialThread => {
                value.get("participants").is_some_and(Value::is_array)
                    && value.get("messages").is_some_and(Value::is_array)
            }
            JsonShape::ChatLog => chat_conversations(value).is_some(),
            JsonShape::PostList => post_items(value).is_some(),
            JsonShape::PhotoMetadata => {
                value.get("photoTakenTime").is_some()
                    || (value.get("title").is_some()
                        && value.get("creationTime").is_some()
                        && (value.get("geoData").is_some() || value.get("url").is_some()))
            }
            JsonShape::Generic => true,
        }
    }

    pub fn extract(&self, value: &Value) -> Vec<ExtractedRecord> {
        match self {
            JsonShape::SocialThread => extract_social_thread(value).into_iter().collect(),
            JsonShape::ChatLog => chat_conversations(value)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|(title, messages)| conversation_record(title, messages))
                .map(|record| record.with_meta("format", "chat_log"))
                .collect(),
            JsonShape::PostList => post_items(value)
                .map(|items| items.iter().filter_map(post_record).collect())
                .unwrap_or_default(),
            JsonShape::PhotoMetadata => extract_photo(value).into_iter().collect(),
            JsonShape::Generic => extract_generic(value).into_iter().collect(),
        }
    }

    /// The source a detector should infer from this shape, if any.
    pub fn source_hint(&self) -> Option<mneme_core::types::SourceTag> {
        use mneme_core::types::SourceTag;
        match self {
            JsonShape::SocialThread | JsonShape::PostList => Some(SourceTag::Social),
            JsonShape::ChatLog => Some(SourceTag::Chat),
            JsonShape::PhotoMetadata => Some(SourceTag::Photos),
            JsonShape::Generic => None,
        }
    }
}

/// Parse and extract a JSON file. Unparseable input becomes one raw-text record.
pub fn extract_json(raw: &[u8]) -> Vec<ExtractedRecord> {
    match serde_json::from_slice::<Value>(raw) {
        Ok(value) => {
            let shape = JsonShape::classify(&value);
            debug!(?shape, "classified JSON export");
            shape.extract(&value)
        }
        Err(e) => {
            debug!(error = %e, "JSON parse failed, keeping raw text");
            vec![ExtractedRecord::new("text/plain", String::from_utf8_lossy(raw))]
        }
    }
}

fn extract_social_thread(value: &Value) -> Option<ExtractedRecord> {
    let participants: Vec<String> = value
        .get("participants")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|p| p.as_str().or_else(|| p.get("name").and_then(Value::as_str)))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    let title = value
        .get("title")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| (!participants.is_empty()).then(|| participants.join(", ")));
    let messages = value.get("messages").and_then(Value::as_array)?;
    let record = conversation_record(title, messages)?;
    Some(
        record
            .with_meta("format", "social_thread")
            .with_meta("participants", participants),
    )
}

/// Conversations in a chat export: `(title, messages)` pairs.
fn chat_conversations(value: &Value) -> Option<Vec<(Option<String>, &Vec<Value>)>> {
    // Multi-chat export: {"chats": {"list": [{"name", "messages"}]}}
    if let Some(list) = value
        .get("chats")
        .and_then(|c| c.get("list").or(Some(c)))
        .and_then(Value::as_array)
    {
        let chats: Vec<_> = list
            .iter()
            .filter_map(|chat| {
                let messages = chat.get("messages")?.as_array()?;
                Some((title_of(chat), messages))
            })
            .collect();
        return (!chats.is_empty()).then_some(chats);
    }
    if let Some(messages) = value.get("messages").and_then(Value::as_array) {
        if value.get("participants").is_none() && looks_like_messages(messages) {
            return Some(vec![(title_of(value), messages)]);
        }
    }
    if let Some(messages) = value.as_array() {
        if looks_like_messages(messages) {
            return Some(vec![(None, messages)]);
        }
    }
    None
}

fn looks_like_messages(items: &[Value]) -> bool {
    items.iter().take(5).any(|item| {
        item.is_object()
            && message_sender(item).is_some()
            && message_text(item).is_some()
            && !POST_KEYS.iter().any(|k| item.get(*k).is_some())
    })
}

fn title_of(value: &Value) -> Option<String> {
    ["title", "name", "subject"]
        .iter()
        .find_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

/// Message text; arrays of strings or `{"text": ..}` fragments are flattened.
fn message_text(message: &Value) -> Option<String> {
    MESSAGE_TEXT_FIELDS.iter().find_map(|field| {
        let text = match message.get(*field)? {
            Value::String(s) => s.clone(),
            Value::Array(parts) => parts
                .iter()
                .filter_map(|p| p.as_str().or_else(|| p.get("text").and_then(Value::as_str)))
                .collect::<String>(),
            _ => return None,
        };
        (!text.trim().is_empty()).then_some(text)
    })
}

fn message_sender(message: &Value) -> Option<String> {
    SENDER_FIELDS.iter().find_map(|field| match message.get(*field)? {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    })
}

fn message_time(message: &Value) -> Option<String> {
    TIME_FIELDS
        .iter()
        .find_map(|field| message.get(*field).and_then(timestamp_from_value))
}

/// One record per conversation, messages in chronological order.
fn conversation_record(title: Option<String>, messages: &[Value]) -> Option<ExtractedRecord> {
    let mut entries: Vec<(Option<String>, String)> = messages
        .iter()
        .filter_map(|m| {
            let text = message_text(m)?;
            let line = match message_sender(m) {
                Some(sender) => format!("{sender}: {text}"),
                None => text,
            };
            Some((message_time(m), line))
        })
        .collect();
    if entries.is_empty() {
        return None;
    }
    // Some exports list newest first; order only when every message is dated.
    if entries.iter().all(|(time, _)| time.is_some()) {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
    }
    let latest = entries.iter().filter_map(|(t, _)| t.clone()).max();
    let count = entries.len();
    let text = entries
        .into_iter()
        .map(|(_, line)| line)
        .collect::<Vec<_>>()
        .join("\n");
    Some(
        ExtractedRecord::new(CONTENT_TYPE, text)
            .with_title(title)
            .with_created_at(latest)
            .with_meta("message_count", count),
    )
}

/// Items of a post list: a top-level array of posts, or the first array
/// field of an object that holds posts.
fn post_items(value: &Value) -> Option<&Vec<Value>> {
    fn is_post_list(items: &[Value]) -> bool {
        items.iter().take(5).any(|item| {
            POST_KEYS.iter().any(|k| item.get(*k).is_some())
                || (item.get("title").is_some() && item.get("timestamp").is_some())
        })
    }
    match value {
        Value::Array(items) if is_post_list(items) => Some(items),
        Value::Object(map) => map.values().find_map(|v| match v {
            Value::Array(items) if is_post_list(items) => Some(items),
            _ => None,
        }),
        _ => None,
    }
}

fn post_record(post: &Value) -> Option<ExtractedRecord> {
    let mut parts: Vec<String> = Vec::new();
    let mut push = |s: &str| {
        if !s.trim().is_empty() {
            parts.push(s.to_string());
        }
    };
    if let Some(title) = post.get("title").and_then(Value::as_str) {
        push(title);
    }
    if let Some(text) = post.get("post").and_then(Value::as_str) {
        push(text);
    }
    for entry in post.get("data").and_then(Value::as_array).into_iter().flatten() {
        if let Some(text) = entry.get("post").and_then(Value::as_str) {
            push(text);
        }
    }
    if let Some(map) = post.get("string_map_data").and_then(Value::as_object) {
        for field in map.values() {
            if let Some(text) = field.get("value").and_then(Value::as_str) {
                push(text);
            }
        }
    }
    for media in post.get("media").and_then(Value::as_array).into_iter().flatten() {
        if let Some(text) = media.get("title").and_then(Value::as_str) {
            push(text);
        }
    }
    if parts.is_empty() {
        return None;
    }

    let created_at = message_time(post)
        .or_else(|| {
            post.get("media")
                .and_then(Value::as_array)
                .and_then(|m| m.first())
                .and_then(message_time)
        })
        .or_else(|| {
            post.get("string_map_data")
                .and_then(Value::as_object)
                .and_then(|map| map.values().find_map(message_time))
        });
    Some(
        ExtractedRecord::new(CONTENT_TYPE, parts.join("\n"))
            .with_created_at(created_at)
            .with_meta("format", "post"),
    )
}

fn extract_photo(value: &Value) -> Option<ExtractedRecord> {
    let title = value.get("title").and_then(Value::as_str).map(str::to_string);
    let mut lines: Vec<String> = Vec::new();
    if let Some(t) = &title {
        lines.push(t.clone());
    }
    if let Some(desc) = value.get("description").and_then(Value::as_str) {
        if !desc.trim().is_empty() {
            lines.push(desc.to_string());
        }
    }
    let people: Vec<String> = value
        .get("people")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|p| p.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    if !people.is_empty() {
        lines.push(format!("People: {}", people.join(", ")));
    }
    if lines.is_empty() {
        return None;
    }

    let created_at = ["photoTakenTime", "creationTime"]
        .iter()
        .find_map(|k| value.get(*k)?.get("timestamp").and_then(timestamp_from_value));
    let mut record = ExtractedRecord::new(CONTENT_TYPE, lines.join("\n"))
        .with_title(title)
        .with_created_at(created_at)
        .with_meta("format", "photo_metadata");
    if !people.is_empty() {
        record = record.with_meta("people", people);
    }
    if let Some(geo) = value.get("geoData") {
        let lat = geo.get("latitude").and_then(Value::as_f64).unwrap_or(0.0);
        let lon = geo.get("longitude").and_then(Value::as_f64).unwrap_or(0.0);
        if lat != 0.0 || lon != 0.0 {
            record = record.with_meta("latitude", lat).with_meta("longitude", lon);
        }
    }
    if let Some(url) = value.get("url").and_then(Value::as_str) {
        record = record.with_meta("url", url);
    }
    Some(record)
}

fn extract_generic(value: &Value) -> Option<ExtractedRecord> {
    let mut texts = Vec::new();
    collect_fields(value, &mut texts, true);
    if texts.is_empty() {
        collect_fields(value, &mut texts, false);
    }
    if texts.is_empty() {
        return None;
    }
    Some(
        ExtractedRecord::new(CONTENT_TYPE, texts.join("\n"))
            .with_title(title_of(value))
            .with_created_at(message_time(value)),
    )
}

/// Depth-first string collection; `known_only` restricts to text fields.
fn collect_fields(value: &Value, out: &mut Vec<String>, known_only: bool) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                match child {
                    Value::String(s) if !known_only || GENERIC_TEXT_FIELDS.contains(&key.as_str()) => {
                        if !s.trim().is_empty() {
                            out.push(s.clone());
                        }
                    }
                    Value::Object(_) | Value::Array(_) => collect_fields(child, out, known_only),
                    _ => {}
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(s) if !known_only && !s.trim().is_empty() => out.push(s.clone()),
                    _ => collect_fields(item, out, known_only),
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn social_thread_is_chronological_with_participants() {
        let value = json!({
            "participants": [{"name": "Ana"}, {"name": "Ben"}],
            "messages": [
                {"sender_name": "Ben", "timestamp_ms": 1_700_000_060_000i64, "content": "see you"},
                {"sender_name": "Ana", "timestamp_ms": 1_700_000_000_000i64, "content": "lunch?"}
            ],
            "title": "Ana and Ben"
        });
        assert_eq!(JsonShape::classify(&value), JsonShape::SocialThread);
        let records = JsonShape::SocialThread.extract(&value);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "Ana: lunch?\nBen: see you");
        assert_eq!(records[0].title.as_deref(), Some("Ana and Ben"));
        assert_eq!(records[0].created_at.as_deref(), Some("2023-11-14T22:14:20.000Z"));
        assert_eq!(records[0].metadata["participants"], json!(["Ana", "Ben"]));
    }

    #[test]
    fn multi_chat_export_yields_one_record_per_chat() {
        let value = json!({"chats": {"list": [
            {"name": "Family", "messages": [
                {"from": "Mom", "date": "2023-01-02T03:04:05", "text": "dinner at 7"},
                {"from": "Me", "date": "2023-01-02T03:05:00", "text": ["ok ", {"type": "bold", "text": "coming"}]}
            ]},
            {"name": "Empty", "messages": []}
        ]}});
        assert_eq!(JsonShape::classify(&value), JsonShape::ChatLog);
        let records = JsonShape::ChatLog.extract(&value);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("Family"));
        assert_eq!(records[0].text, "Mom: dinner at 7\nMe: ok coming");
        assert_eq!(records[0].metadata["message_count"], 2);
    }

    #[test]
    fn post_list_yields_one_record_per_post() {
        let value = json!([
            {"timestamp": 1_600_000_000, "data": [{"post": "First post"}]},
            {"timestamp": 1_600_000_100, "data": [{"post": "Second post"}], "title": "Ana updated her status."},
            {"timestamp": 1_600_000_200, "attachments": []}
        ]);
        assert_eq!(JsonShape::classify(&value), JsonShape::PostList);
        let records = JsonShape::PostList.extract(&value);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "First post");
        assert_eq!(records[1].text, "Ana updated her status.\nSecond post");
        assert!(records[0].created_at.is_some());
    }

    #[test]
    fn wrapped_post_list_is_found_inside_an_object() {
        let value = json!({"ig_stories": [
            {"uri": "a.jpg", "creation_timestamp": 1_650_000_000, "media": [{"title": "beach day"}]}
        ]});
        assert_eq!(JsonShape::classify(&value), JsonShape::PostList);
        assert_eq!(JsonShape::PostList.extract(&value)[0].text, "beach day");
    }

    #[test]
    fn photo_sidecar_extracts_title_people_and_time() {
        let value = json!({
            "title": "IMG_0001.jpg",
            "description": "Sunset over the bay",
            "photoTakenTime": {"timestamp": "1700000000", "formatted": "Nov 14, 2023"},
            "geoData": {"latitude": 37.8, "longitude": -122.4},
            "people": [{"name": "Ana"}]
        });
        assert_eq!(JsonShape::classify(&value), JsonShape::PhotoMetadata);
        let record = &JsonShape::PhotoMetadata.extract(&value)[0];
        assert_eq!(record.text, "IMG_0001.jpg\nSunset over the bay\nPeople: Ana");
        assert_eq!(record.created_at.as_deref(), Some("2023-11-14T22:13:20.000Z"));
        assert_eq!(record.metadata["latitude"], 37.8);
    }

    #[test]
    fn generic_collects_known_text_fields() {
        let value = json!({"title": "Notes", "items": [{"body": "buy milk"}, {"id": 3}], "count": 2});
        assert_eq!(JsonShape::classify(&value), JsonShape::Generic);
        let record = &JsonShape::Generic.extract(&value)[0];
        assert!(record.text.contains("Notes"));
        assert!(record.text.contains("buy milk"));
        assert_eq!(record.title.as_deref(), Some("Notes"));
    }

    #[test]
    fn generic_falls_back_to_all_strings() {
        let value = json!({"k1": "alpha", "nested": {"k2": "beta"}});
        let record = &JsonShape::Generic.extract(&value)[0];
        assert_eq!(record.text, "alpha\nbeta");
    }

    #[test]
    fn unparseable_json_is_kept_as_raw_text() {
        let records = extract_json(b"{not json at all");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "{not json at all");
        assert_eq!(records[0].content_type, "text/plain");
    }

    #[test]
    fn shapes_map_to_source_hints() {
        use mneme_core::types::SourceTag;
        assert_eq!(JsonShape::SocialThread.source_hint(), Some(SourceTag::Social));
        assert_eq!(JsonShape::ChatLog.source_hint(), Some(SourceTag::Chat));
        assert_eq!(JsonShape::Generic.source_hint(), None);
    }
}
