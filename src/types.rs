//! Core card types shared by the builder and the presenter

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::card::{DEFAULT_LAYOUT, UNTITLED};

/// One face of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Front,
    Back,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Front, Side::Back];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Front => "front",
            Side::Back => "back",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content placed in a single layout region
///
/// Serialized as `{"type": "text", "value": "<h3>..</h3>"}` or
/// `{"type": "image", "value": "https://.."}`. Objects with any other key
/// are not items; they stay [`ContentEntry::Unknown`] so nothing is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase", deny_unknown_fields)]
pub enum ContentItem {
    /// HTML-formatted rich text
    Text(String),
    /// Image URL
    Image(String),
}

impl ContentItem {
    pub fn value(&self) -> &str {
        match self {
            ContentItem::Text(value) | ContentItem::Image(value) => value,
        }
    }
}

/// A region entry as found in stored or imported data
///
/// Entries are not validated: anything that is not a well-formed
/// `ContentItem` is carried through as raw JSON and simply fails to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentEntry {
    Item(ContentItem),
    Unknown(serde_json::Value),
}

/// `ContentItem` without the strict key check, for reading raw entries
#[derive(Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
enum LooseItem {
    Text(String),
    Image(String),
}

impl From<LooseItem> for ContentItem {
    fn from(item: LooseItem) -> Self {
        match item {
            LooseItem::Text(value) => ContentItem::Text(value),
            LooseItem::Image(value) => ContentItem::Image(value),
        }
    }
}

impl ContentEntry {
    pub fn item(&self) -> Option<&ContentItem> {
        match self {
            ContentEntry::Item(item) => Some(item),
            ContentEntry::Unknown(_) => None,
        }
    }

    /// The text or image this entry shows, ignoring extra keys on raw entries
    pub fn displayable(&self) -> Option<ContentItem> {
        match self {
            ContentEntry::Item(item) => Some(item.clone()),
            ContentEntry::Unknown(raw) => serde_json::from_value::<LooseItem>(raw.clone())
                .ok()
                .map(ContentItem::from),
        }
    }
}

impl From<ContentItem> for ContentEntry {
    fn from(item: ContentItem) -> Self {
        ContentEntry::Item(item)
    }
}

/// Region id (e.g. `"area-1"`) → content
pub type ContentMap = BTreeMap<String, ContentEntry>;

/// Per-side content of a card or of the draft
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideContent {
    #[serde(default)]
    pub front: ContentMap,
    #[serde(default)]
    pub back: ContentMap,
}

impl SideContent {
    pub fn side(&self, side: Side) -> &ContentMap {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut ContentMap {
        match side {
            Side::Front => &mut self.front,
            Side::Back => &mut self.back,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }
}

/// Layout id per side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layouts {
    pub front: String,
    pub back: String,
}

impl Default for Layouts {
    fn default() -> Self {
        Self {
            front: DEFAULT_LAYOUT.to_string(),
            back: DEFAULT_LAYOUT.to_string(),
        }
    }
}

impl Layouts {
    pub fn get(&self, side: Side) -> &str {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }

    pub fn set(&mut self, side: Side, layout: impl Into<String>) {
        match side {
            Side::Front => self.front = layout.into(),
            Side::Back => self.back = layout.into(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.front == DEFAULT_LAYOUT && self.back == DEFAULT_LAYOUT
    }
}

/// A saved two-sided flashcard
///
/// Always built through [`crate::normalize::normalize_card`] when it comes
/// from outside the store, so `name` is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub layouts: Layouts,
    pub content: SideContent,
}

impl Default for Card {
    fn default() -> Self {
        Self {
            name: UNTITLED.to_string(),
            layouts: Layouts::default(),
            content: SideContent::default(),
        }
    }
}
