// SPDX-FileCopyrightText: 2026 Mneme Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content normalization applied to every extracted record before chunking.
//!
//! [`strip_markup`] turns HTML into text and runs first for markup inputs;
//! [`normalize`] then removes control characters and collapses whitespace.
//! An empty result means "skip this record".

use std::sync::LazyLock;

use regex::Regex;

/// Blocks whose content is never user text.
static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>|<noscript\b[^>]*>.*?</noscript\s*>|<head\b[^>]*>.*?</head\s*>",
    )
    .unwrap()
});

static COMMENTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static ENTITIES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").unwrap());

/// Remove script/style blocks, comments and tags, and decode common entities.
///
/// The output still needs [`normalize`].
pub fn strip_markup(html: &str) -> String {
    let without_blocks = HIDDEN_BLOCKS.replace_all(html, " ");
    let without_comments = COMMENTS.replace_all(&without_blocks, " ");
    let without_tags = TAGS.replace_all(&without_comments, " ");
    ENTITIES
        .replace_all(&without_tags, |caps: &regex::Captures<'_>| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "ndash" => "-",
        "mdash" => "-",
        "hellip" => "...",
        _ => return None,
    };
    Some(decoded.to_string())
}

/// Replace control characters with spaces, collapse whitespace runs and trim.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for c in text.chars() {
        let c = if (c as u32) < 0x20 { ' ' } else { c };
        if c.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(c);
        }
    }
    out
}

/// `strip_markup` followed by `normalize`.
pub fn normalize_html(html: &str) -> String {
    normalize(&strip_markup(html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn collapses_whitespace_and_controls() {
        assert_eq!(normalize("  hello\t\tworld \r\n again\u{0007} "), "hello world again");
    }

    #[test]
    fn whitespace_only_becomes_empty() {
        assert_eq!(normalize(" \n\t\u{0001} "), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn strips_scripts_styles_and_tags() {
        let html = r#"<html><head><title>t</title><style>p { color: red }</style></head>
            <body><p>Hello&nbsp;<b>there</b> &amp; welcome</p>
            <script>alert("x")</script><!-- hidden --></body></html>"#;
        assert_eq!(normalize_html(html), "Hello there & welcome");
    }

    #[test]
    fn decodes_numeric_entities_and_keeps_unknown() {
        assert_eq!(normalize(&strip_markup("caf&#233; &#x1F600; &bogus;")), "café 😀 &bogus;");
    }

    #[test]
    fn unicode_is_preserved() {
        assert_eq!(normalize("  naïve   日本語  "), "naïve 日本語");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(s in "\\PC*|[\\x00-\\x20a-z ]{0,64}") {
            let once = normalize(&s);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn normalized_text_has_no_edge_or_double_spaces(s in ".{0,200}") {
            let out = normalize(&s);
            prop_assert!(!out.starts_with(' ') && !out.ends_with(' '));
            prop_assert!(!out.contains("  "));
            prop_assert!(out.chars().all(|c| (c as u32) >= 0x20));
        }
    }
}
