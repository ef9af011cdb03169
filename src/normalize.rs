//! Coercion of loosely-shaped JSON into canonical cards
//!
//! Everything here is total: malformed input falls back to defaults and is
//! never reported as an error.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

use crate::constants::card::{DEFAULT_LAYOUT, UNTITLED};
use crate::constants::media::{FILE_PATH_BASE, HOST_FAMILIES};
use crate::types::{Card, ContentEntry, ContentItem, ContentMap, Layouts, Side, SideContent};

/// Characters left alone by JavaScript's `encodeURIComponent`
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Matches both `/wiki/File:<name>` and `/wiki/media/File:<name>`
static FILE_PAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/File:(.+)$").expect("file page pattern"));

static EMPTY_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|<div></div>|<p></p>|<h\d></h\d>").expect("empty markup pattern")
});

static NBSP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)&nbsp;").expect("nbsp pattern"));

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

/// Coerce arbitrary data into a [`Card`]
pub fn normalize_card(raw: &Value) -> Card {
    let name = normalize_name(raw.get("name").and_then(Value::as_str).unwrap_or_default());

    Card {
        name,
        layouts: normalize_layouts(raw.get("layouts")),
        content: raw
            .get("content")
            .map(normalize_side_content)
            .unwrap_or_default(),
    }
}

/// Trimmed card name, or the untitled placeholder when blank
pub fn normalize_name(name: &str) -> String {
    match name.trim() {
        "" => UNTITLED.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Layout id, or the default layout when blank
pub fn normalize_layout(layout: &str) -> String {
    match layout.trim() {
        "" => DEFAULT_LAYOUT.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Coerce a `{front, back}` layout pair; missing or blank ids become the default
pub fn normalize_layouts(raw: Option<&Value>) -> Layouts {
    let layout = |side: Side| {
        normalize_layout(
            raw.and_then(|l| l.get(side.as_str()))
                .and_then(Value::as_str)
                .unwrap_or_default(),
        )
    };
    Layouts {
        front: layout(Side::Front),
        back: layout(Side::Back),
    }
}

/// Coerce a `{front, back}` pair, dropping sides that are not objects
pub fn normalize_side_content(raw: &Value) -> SideContent {
    let side = |side: Side| {
        raw.get(side.as_str())
            .map(normalize_content_map)
            .unwrap_or_default()
    };
    SideContent {
        front: side(Side::Front),
        back: side(Side::Back),
    }
}

fn normalize_content_map(raw: &Value) -> ContentMap {
    let Some(entries) = raw.as_object() else {
        return ContentMap::new();
    };
    entries
        .iter()
        .map(|(region, entry)| {
            let entry = serde_json::from_value(entry.clone())
                .unwrap_or_else(|_| ContentEntry::Unknown(entry.clone()));
            (region.clone(), entry)
        })
        .collect()
}

/// Rewrite media viewer-page URLs to the direct file URL
///
/// Users paste `https://en.wikipedia.org/wiki/File:Cat.jpg` far more often
/// than the image itself. Anything that does not parse or match comes back
/// unchanged.
pub fn normalize_image_url(value: &str) -> String {
    let Ok(url) = Url::parse(value) else {
        return value.to_string();
    };
    let Some(host) = url.host_str() else {
        return value.to_string();
    };
    if !HOST_FAMILIES.iter().any(|family| host.contains(family)) {
        return value.to_string();
    }
    let Some(captures) = FILE_PAGE.captures(url.path()) else {
        return value.to_string();
    };

    // The path is already percent-encoded; decode so the name is encoded once.
    // Escapes that are not UTF-8 are passed on as captured.
    let captured = &captures[1];
    let Ok(filename) = percent_decode_str(captured).decode_utf8() else {
        return format!("{FILE_PATH_BASE}{captured}");
    };
    format!(
        "{FILE_PATH_BASE}{}",
        utf8_percent_encode(&filename, URI_COMPONENT)
    )
}

/// True when rich-text HTML holds no visible text
pub fn is_empty_rich_text(value: &str) -> bool {
    let cleaned = EMPTY_MARKUP.replace_all(value, "");
    let cleaned = NBSP.replace_all(&cleaned, " ");
    let cleaned = TAG.replace_all(&cleaned, "");
    cleaned.trim().is_empty()
}

/// True when any region on either side holds something displayable
pub fn has_content(content: &SideContent) -> bool {
    Side::BOTH
        .iter()
        .flat_map(|side| content.side(*side).values())
        .any(|entry| match (entry.displayable(), entry) {
            (Some(ContentItem::Text(value)), _) => !is_empty_rich_text(&value),
            (Some(ContentItem::Image(value)), _) => !value.is_empty(),
            (None, ContentEntry::Unknown(raw)) => raw.get("value").is_some_and(is_truthy),
            (None, ContentEntry::Item(_)) => false,
        })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
