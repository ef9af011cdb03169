//! Deck persistence in named local storage slots
//!
//! Two independent slots exist: the builder slot (cards, selection and the
//! unsaved draft) and the presenter slot (cards and cursor only).

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::constants::{deck::VERSION, slots};
use crate::deck::{Deck, Form, Selection};
use crate::normalize::{normalize_card, normalize_layouts, normalize_side_content};
use crate::types::{Card, Layouts, SideContent};

/// Named string slots, the local key-value storage decks live in
pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// One `<key>.json` file per slot inside a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{}", slots::FILE_EXTENSION))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read slot from {:?}", path))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create storage directory {:?}", self.dir))?;
        let path = self.slot_path(key);
        fs::write(&path, value).with_context(|| format!("Failed to write slot to {:?}", path))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.slot_path(key);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("Failed to remove slot {:?}", path))?;
        }
        Ok(())
    }
}

/// In-process storage; clones share the same slots
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slots: Rc<RefCell<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses writes once the total stored size would exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota: Some(bytes),
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.borrow().contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut slots = self.slots.borrow_mut();
        if let Some(quota) = self.quota {
            let others: usize = slots
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > quota {
                bail!("Storage quota of {} bytes exceeded writing '{}'", quota, key);
            }
        }
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}

/// Receives a snapshot after every persisted-state mutation
pub trait Persist {
    fn persist(&mut self, deck: &Deck);

    /// Drop whatever has been persisted so far
    fn discard(&mut self) {}
}

/// Persist that keeps nothing (presenter views, tests)
#[derive(Debug, Default)]
pub struct NoPersist;

impl Persist for NoPersist {
    fn persist(&mut self, _deck: &Deck) {}
}

/// Which of the two deck slots an adapter targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    Builder,
    Presenter,
}

impl SlotKind {
    pub fn key(self) -> &'static str {
        match self {
            SlotKind::Builder => slots::BUILDER,
            SlotKind::Presenter => slots::PRESENTER,
        }
    }

    fn keeps_draft(self) -> bool {
        self == SlotKind::Builder
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DeckRecord<'a> {
    version: u32,
    cards: &'a [Card],
    current_index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    draft_content: Option<&'a SideContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    draft_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    draft_layouts: Option<&'a Layouts>,
}

/// Reads and writes a [`Deck`] in one storage slot
#[derive(Debug, Clone)]
pub struct DeckSlot<S: Storage> {
    storage: S,
    kind: SlotKind,
}

impl<S: Storage> DeckSlot<S> {
    pub fn new(storage: S, kind: SlotKind) -> Self {
        Self { storage, kind }
    }

    pub fn builder(storage: S) -> Self {
        Self::new(storage, SlotKind::Builder)
    }

    pub fn presenter(storage: S) -> Self {
        Self::new(storage, SlotKind::Presenter)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Serialize `deck` into the slot. Failures are logged, never returned.
    pub fn save(&self, deck: &Deck) {
        if let Err(e) = self.try_save(deck) {
            warn!(slot = self.kind.key(), error = ?e, "Unable to save flashcard state");
        }
    }

    pub fn try_save(&self, deck: &Deck) -> Result<()> {
        let keeps_draft = self.kind.keeps_draft();
        let record = DeckRecord {
            version: VERSION,
            cards: &deck.cards,
            current_index: deck.selection.to_index(),
            draft_content: keeps_draft.then_some(&deck.draft_content),
            draft_name: keeps_draft.then_some(deck.draft_form.name.as_str()),
            draft_layouts: keeps_draft.then_some(&deck.draft_form.layouts),
        };
        let json = serde_json::to_string(&record).context("Failed to serialize deck to JSON")?;
        self.storage.set(self.kind.key(), &json)?;
        debug!(slot = self.kind.key(), cards = deck.cards.len(), "Saved deck");
        Ok(())
    }

    /// Read the slot back. Missing or unparsable slots yield `None`.
    pub fn load(&self) -> Option<Deck> {
        let contents = match self.storage.get(self.kind.key()) {
            Ok(Some(contents)) => contents,
            Ok(None) => return None,
            Err(e) => {
                warn!(slot = self.kind.key(), error = ?e, "Unable to load flashcard state");
                return None;
            }
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(raw) => Some(self.deck_from_value(&raw)),
            Err(e) => {
                warn!(slot = self.kind.key(), error = %e, "Stored flashcard state is not valid JSON");
                None
            }
        }
    }

    fn deck_from_value(&self, raw: &Value) -> Deck {
        let cards: Vec<Card> = raw
            .get("cards")
            .and_then(Value::as_array)
            .map(|cards| cards.iter().map(normalize_card).collect())
            .unwrap_or_default();

        let stored = raw.get("currentIndex").and_then(integer);
        let selection = match stored {
            Some(index) => Selection::from_index(index, cards.len()),
            None => Selection::Draft,
        };
        if stored != Some(selection.to_index()) {
            debug!(slot = self.kind.key(), stored = ?stored, selection = ?selection, "Clamped stored currentIndex");
        }

        if !self.kind.keeps_draft() {
            return Deck::new(cards, selection);
        }

        Deck {
            cards,
            selection,
            draft_content: raw
                .get("draftContent")
                .map(normalize_side_content)
                .unwrap_or_default(),
            draft_form: Form {
                name: raw
                    .get("draftName")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                layouts: normalize_layouts(raw.get("draftLayouts")),
            },
        }
    }

    /// Remove the slot entirely
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(self.kind.key()) {
            warn!(slot = self.kind.key(), error = ?e, "Unable to clear flashcard state");
        }
    }
}

impl<S: Storage> Persist for DeckSlot<S> {
    fn persist(&mut self, deck: &Deck) {
        self.save(deck);
    }

    fn discard(&mut self) {
        self.clear();
    }
}

/// Integral JSON numbers only; `2.0` counts, `2.5` and `"2"` do not
fn integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
            .map(|n| n as i64)
    })
}

/// Replace the presenter deck with `raw_cards`
///
/// The old slot is removed before the new deck is written so the presenter
/// never reads a mix of the two. Returns the deck as stored.
pub fn transfer_to_presenter<S: Storage>(storage: &S, raw_cards: &[Value]) -> Result<Deck> {
    let cards: Vec<Card> = raw_cards.iter().map(normalize_card).collect();
    let selection = if cards.is_empty() {
        Selection::Draft
    } else {
        Selection::Saved(0)
    };
    let deck = Deck::new(cards, selection);

    storage
        .remove(slots::PRESENTER)
        .context("Failed to clear previous presenter deck")?;
    let record = DeckRecord {
        version: VERSION,
        cards: &deck.cards,
        current_index: 0,
        draft_content: None,
        draft_name: None,
        draft_layouts: None,
    };
    let json = serde_json::to_string(&record).context("Failed to serialize presenter deck")?;
    storage
        .set(slots::PRESENTER, &json)
        .context("Failed to write presenter deck")?;

    info!(cards = deck.cards.len(), "Sent deck to presenter");
    Ok(deck)
}
