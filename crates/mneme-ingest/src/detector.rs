// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export-type detection for an unpacked data directory.
//!
//! Detection is an ordered rule list evaluated against directory entry
//! names; the first rule that matches any entry wins:
//!
//! 1. social-media archive markers (`messages/`, `posts/`, `media/`, ...)
//! 2. chat export keywords and database files
//! 3. mail and cloud export markers (`Takeout/`, `*.mbox`, `Drive/`, ...)
//! 4. shape of the first few top-level `.json` files
//! 5. rules 1-3 again on subdirectories, breadth first, up to depth 3
//!
//! Nothing matching means [`SourceTag::Unknown`].

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use mneme_config::model::IngestConfig;
use mneme_core::types::SourceTag;
use tracing::debug;

use crate::extract::json::JsonShape;

/// Deepest subdirectory level inspected by the breadth-first pass.
pub const MAX_DETECTION_DEPTH: usize = 3;

/// Directory names of social-media archives (exact match).
const SOCIAL_DIRS: &[&str] = &[
    "messages",
    "posts",
    "stories",
    "comments",
    "media",
    "likes_and_reactions",
    "photos_and_videos",
    "followers_and_following",
    "your_instagram_activity",
    "your_facebook_activity",
];

/// File name prefixes of social-media profile exports.
const SOCIAL_FILE_PREFIXES: &[&str] = &[
    "personal_information",
    "account_information",
    "profile_information",
];

/// Chat application names (contains).
const CHAT_KEYWORDS: &[&str] = &[
    "whatsapp", "telegram", "signal", "wechat", "imessage", "msgstore", "chat",
];

/// Database file extensions used by chat clients.
const CHAT_DB_SUFFIXES: &[&str] = &[".db", ".sqlite", ".sqlite3"];

/// One detection rule over a lowercased entry name.
#[derive(Debug, Clone, Copy)]
pub struct DetectionRule {
    pub name: &'static str,
    pub tag: SourceTag,
    pub matches: fn(&str) -> bool,
}

fn is_social_marker(name: &str) -> bool {
    SOCIAL_DIRS.contains(&name) || SOCIAL_FILE_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn is_chat_marker(name: &str) -> bool {
    CHAT_KEYWORDS.iter().any(|k| name.contains(k))
        || CHAT_DB_SUFFIXES.iter().any(|s| name.ends_with(s))
}

fn is_takeout(name: &str) -> bool {
    name == "takeout"
}

fn is_mail_marker(name: &str) -> bool {
    name == "mail" || name.contains("gmail") || name.ends_with(".mbox") || name.ends_with(".eml")
}

fn is_drive_marker(name: &str) -> bool {
    name == "drive" || name == "google drive"
}

fn is_calendar_marker(name: &str) -> bool {
    name == "calendar" || name.ends_with(".ics")
}

fn is_photos_marker(name: &str) -> bool {
    name == "google photos" || name == "google fotos"
}

/// Name-based rules in priority order.
pub const MARKER_RULES: &[DetectionRule] = &[
    DetectionRule {
        name: "social-archive",
        tag: SourceTag::Social,
        matches: is_social_marker,
    },
    DetectionRule {
        name: "chat-export",
        tag: SourceTag::Chat,
        matches: is_chat_marker,
    },
    DetectionRule {
        name: "takeout",
        tag: SourceTag::Mail,
        matches: is_takeout,
    },
    DetectionRule {
        name: "mailbox",
        tag: SourceTag::Mail,
        matches: is_mail_marker,
    },
    DetectionRule {
        name: "cloud-drive",
        tag: SourceTag::Drive,
        matches: is_drive_marker,
    },
    DetectionRule {
        name: "calendar",
        tag: SourceTag::Calendar,
        matches: is_calendar_marker,
    },
    DetectionRule {
        name: "photo-library",
        tag: SourceTag::Photos,
        matches: is_photos_marker,
    },
];

struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

/// Classifies an export directory into a [`SourceTag`].
#[derive(Debug, Clone)]
pub struct SourceDetector {
    max_json_sniff_files: usize,
}

impl SourceDetector {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            max_json_sniff_files: config.max_json_sniff_files,
        }
    }

    /// Detect the export type of `root`. Blocking; call from a blocking task.
    pub fn detect(&self, root: &Path) -> SourceTag {
        let top = list_entries(root);
        if let Some(tag) = match_markers(root, &top) {
            return tag;
        }
        if let Some(tag) = self.sniff_json(&top) {
            return tag;
        }

        let mut queue: VecDeque<(PathBuf, usize)> = top
            .iter()
            .filter(|e| e.is_dir)
            .map(|e| (e.path.clone(), 1))
            .collect();
        while let Some((dir, depth)) = queue.pop_front() {
            let entries = list_entries(&dir);
            if let Some(tag) = match_markers(&dir, &entries) {
                return tag;
            }
            if depth < MAX_DETECTION_DEPTH {
                queue.extend(
                    entries
                        .iter()
                        .filter(|e| e.is_dir)
                        .map(|e| (e.path.clone(), depth + 1)),
                );
            }
        }

        debug!(dir = %root.display(), "no detection rule matched");
        SourceTag::Unknown
    }

    fn sniff_json(&self, entries: &[Entry]) -> Option<SourceTag> {
        entries
            .iter()
            .filter(|e| !e.is_dir && e.name.ends_with(".json"))
            .take(self.max_json_sniff_files)
            .find_map(|e| {
                let raw = fs::read(&e.path).ok()?;
                let value = serde_json::from_slice(&raw).ok()?;
                let tag = JsonShape::classify(&value).source_hint()?;
                debug!(file = %e.path.display(), %tag, "source detected from JSON shape");
                Some(tag)
            })
    }
}

fn match_markers(dir: &Path, entries: &[Entry]) -> Option<SourceTag> {
    MARKER_RULES.iter().find_map(|rule| {
        let hit = entries.iter().find(|e| (rule.matches)(&e.name))?;
        debug!(
            rule = rule.name,
            tag = %rule.tag,
            dir = %dir.display(),
            entry = %hit.name,
            "source detected"
        );
        Some(rule.tag)
    })
}

/// Non-hidden entries of `dir` with lowercased names, sorted by name.
/// Unreadable directories have no entries.
fn list_entries(dir: &Path) -> Vec<Entry> {
    let Ok(read) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut entries: Vec<Entry> = read
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if name.starts_with('.') {
                return None;
            }
            let is_dir = entry.file_type().ok()?.is_dir();
            Some(Entry {
                name,
                path: entry.path(),
                is_dir,
            })
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
