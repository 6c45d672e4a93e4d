// src/utils/content.rs

//! Posting body normalization.
//!
//! Bodies arrive either as free text or as a serialized list of lines
//! (`['1. 담당업무', '- 모델 개발']`). Both are turned into a sequence of
//! classified lines that a renderer can emit without re-parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::Content;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s]+").expect("valid URL pattern"));

static BULLET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-•]\s+").expect("valid bullet pattern"));

static NUMBERED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s+").expect("valid numbered pattern"));

/// Kind of a normalized body line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Text,
    /// `- item`, `• item` or `1. item`
    ListItem,
    Blank,
}

/// One normalized body line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLine {
    pub kind: LineKind,
    /// Line text with any list marker removed
    pub text: String,
    /// URLs found in the line, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

/// Interpret a raw body field.
///
/// A string wrapped in `[` `]` is tried as a list of lines (single quotes
/// allowed); if that fails the string is kept as-is.
pub fn parse_body(raw: &str) -> Content {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        if let Some(lines) = parse_serialized_list(trimmed) {
            return Content::Lines(lines);
        }
    }
    Content::Text(raw.to_string())
}

fn parse_serialized_list(s: &str) -> Option<Vec<String>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(s)
        .or_else(|_| serde_json::from_str(&s.replace('\'', "\"")))
        .ok()?;

    Some(
        values
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Split content into classified lines.
pub fn normalize_lines(content: &Content) -> Vec<ContentLine> {
    let joined = match content {
        Content::Text(s) => match parse_body(s) {
            Content::Lines(lines) => lines.join("\n"),
            Content::Text(s) => s,
        },
        Content::Lines(lines) => lines.join("\n"),
    };

    joined.lines().map(classify_line).collect()
}

fn classify_line(line: &str) -> ContentLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ContentLine {
            kind: LineKind::Blank,
            text: String::new(),
            links: Vec::new(),
        };
    }

    let (kind, text) = if let Some(m) = BULLET_PATTERN.find(trimmed) {
        (LineKind::ListItem, &trimmed[m.end()..])
    } else if let Some(m) = NUMBERED_PATTERN.find(trimmed) {
        (LineKind::ListItem, &trimmed[m.end()..])
    } else {
        (LineKind::Text, trimmed)
    };

    ContentLine {
        kind,
        text: text.to_string(),
        links: extract_links(text),
    }
}

/// URLs contained in `text`.
pub fn extract_links(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
