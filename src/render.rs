//! Plain-text rendering of cards for the terminal

use regex::Regex;
use std::sync::LazyLock;

use crate::constants::card::NAME_PLACEHOLDER;
use crate::types::{ContentEntry, ContentItem, ContentMap, Side};

static BLOCK_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(?:div|p|h\d|li)>").expect("block break pattern")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));

/// Reduce rich-text HTML to readable lines
pub fn html_to_text(html: &str) -> String {
    let text = BLOCK_BREAK.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_entry(entry: &ContentEntry) -> String {
    match entry.displayable() {
        Some(ContentItem::Text(html)) => html_to_text(&html),
        Some(ContentItem::Image(url)) => format!("[image] {url}"),
        None => "[unrenderable]".to_string(),
    }
}

/// One side of a card: heading, layout, then each region in order
pub fn render_side(name: &str, side: Side, layout: &str, content: &ContentMap) -> String {
    let heading = match name.trim() {
        "" => NAME_PLACEHOLDER,
        name => name,
    };
    let mut out = format!("{heading} ({side}, layout: {layout})\n");
    if content.is_empty() {
        out.push_str("  (empty)\n");
    }
    for (region, entry) in content {
        let body = render_entry(entry);
        let mut lines = body.lines();
        let first = lines.next().unwrap_or_default();
        out.push_str(&format!("  {region}: {first}\n"));
        for line in lines {
            out.push_str(&format!("  {:width$}  {line}\n", "", width = region.len()));
        }
    }
    out
}
