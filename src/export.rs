//! `flashcards.json` export

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::{deck::VERSION, export::FILENAME};
use crate::persistence::Persist;
use crate::store::CardStore;
use crate::types::Card;

/// Shape of an exported deck file
#[derive(Debug, Serialize)]
pub struct ExportFile<'a> {
    pub version: u32,
    pub cards: &'a [Card],
}

/// Pretty-printed export JSON for `cards`
pub fn export_json(cards: &[Card]) -> Result<String> {
    serde_json::to_string_pretty(&ExportFile {
        version: VERSION,
        cards,
    })
    .context("Failed to serialize export to JSON")
}

/// Write the store's saved cards (plus any pending draft) to
/// `<dir>/flashcards.json`, returning the path written
pub fn write_export<P: Persist>(store: &CardStore<P>, dir: &Path) -> Result<PathBuf> {
    let cards = store.export_cards();
    let json = export_json(&cards)?;

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {:?}", dir))?;
    let path = dir.join(FILENAME);
    fs::write(&path, json).with_context(|| format!("Failed to write export to {:?}", path))?;

    info!(path = %path.display(), cards = cards.len(), "Exported cards");
    Ok(path)
}
