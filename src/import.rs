//! Decoding of user-supplied deck files
//!
//! Three shapes are accepted: a bare array of cards, `{"cards": [...]}`, or a
//! single card object. [`ImportShape::decode`] is strict about the shape;
//! [`extract_cards`] keeps the lenient behavior older exports rely on.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use crate::normalize::normalize_card;
use crate::types::Card;

/// Keys whose presence marks an object as a single card
const CARD_KEYS: [&str; 3] = ["name", "layouts", "content"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("JSON is neither a card list, a deck, nor a single card")]
    Shapeless,
}

/// The recognized top-level shapes of an import file
#[derive(Debug, Clone, PartialEq)]
pub enum ImportShape {
    /// `[card, ...]`
    List(Vec<Value>),
    /// `{"cards": [card, ...], ...}`
    Deck(Vec<Value>),
    /// `{"name": .., "layouts": .., "content": ..}`
    Single(Value),
}

impl ImportShape {
    /// Classify already-parsed JSON
    pub fn classify(raw: Value) -> Result<Self, ImportError> {
        match raw {
            Value::Array(cards) => Ok(ImportShape::List(cards)),
            Value::Object(mut map) => {
                if let Some(Value::Array(cards)) = map.remove("cards") {
                    return Ok(ImportShape::Deck(cards));
                }
                if CARD_KEYS.iter().any(|key| map.get(*key).is_some_and(|v| !v.is_null())) {
                    return Ok(ImportShape::Single(Value::Object(map)));
                }
                Err(ImportError::Shapeless)
            }
            _ => Err(ImportError::Shapeless),
        }
    }

    /// Parse and classify JSON text
    pub fn decode(text: &str) -> Result<Self, ImportError> {
        let raw: Value = serde_json::from_str(text)?;
        Self::classify(raw)
    }

    /// The raw card values, in file order
    pub fn into_raw_cards(self) -> Vec<Value> {
        match self {
            ImportShape::List(cards) | ImportShape::Deck(cards) => cards,
            ImportShape::Single(card) => vec![card],
        }
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.into_raw_cards().iter().map(normalize_card).collect()
    }
}

/// Pull the raw card list out of imported data, or nothing
pub fn extract_cards(raw: &Value) -> Vec<Value> {
    ImportShape::classify(raw.clone())
        .map(ImportShape::into_raw_cards)
        .unwrap_or_default()
}

/// Decode JSON text leniently: a parsable but shapeless document is an
/// empty deck, only unparsable text is an error
pub fn decode_lenient(text: &str) -> Result<Vec<Value>, ImportError> {
    match ImportShape::decode(text) {
        Ok(shape) => Ok(shape.into_raw_cards()),
        Err(ImportError::Shapeless) => {
            warn!("Imported JSON has no cards, treating it as an empty deck");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

/// Read an import file chosen by the user, returning the raw card values
pub fn read_import_file(path: &Path) -> Result<Vec<Value>, ImportError> {
    let text = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cards = decode_lenient(&text)?;
    info!(path = %path.display(), count = cards.len(), "Imported cards");
    Ok(cards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_cards_shapes() {
        let a = json!({"name": "a"});
        let b = json!({"name": "b"});

        let both = vec![a.clone(), b.clone()];
        assert_eq!(extract_cards(&json!({"cards": both.clone()})), both);
        assert_eq!(extract_cards(&json!(both.clone())), both);
        assert_eq!(extract_cards(&json!({"name": "x"})), vec![json!({"name": "x"})]);
        assert_eq!(extract_cards(&json!({})), Vec::<Value>::new());
    }

    #[test]
    fn test_extract_cards_rejects_scalars_and_non_card_objects() {
        assert!(extract_cards(&json!(null)).is_empty());
        assert!(extract_cards(&json!("cards")).is_empty());
        assert!(extract_cards(&json!({"cards": "nope"})).is_empty());
        assert!(extract_cards(&json!({"title": "deck"})).is_empty());
        assert!(extract_cards(&json!({"name": null})).is_empty());
    }

    #[test]
    fn test_decode_reports_shape() {
        assert!(matches!(ImportShape::decode("[]"), Ok(ImportShape::List(v)) if v.is_empty()));
        assert!(matches!(
            ImportShape::decode(r#"{"version": 1, "cards": []}"#),
            Ok(ImportShape::Deck(_))
        ));
        assert!(matches!(
            ImportShape::decode(r#"{"content": {}}"#),
            Ok(ImportShape::Single(_))
        ));
        assert!(matches!(ImportShape::decode("{}"), Err(ImportError::Shapeless)));
        assert!(matches!(ImportShape::decode("{not json"), Err(ImportError::Parse(_))));
    }

    #[test]
    fn test_decoded_deck_normalizes() {
        let text = r#"{"cards":[{"name":"Dog","content":{"front":{"area-1":{"type":"text","value":"Dog"}}}}]}"#;
        let cards = ImportShape::decode(text).unwrap().into_cards();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].name, "Dog");
        assert_eq!(cards[0].layouts.front, "full");
        assert_eq!(cards[0].content.front["area-1"].item().unwrap().value(), "Dog");
    }

    #[test]
    fn test_decode_lenient_on_shapeless() {
        assert!(decode_lenient(r#"{"title": "nothing here"}"#).unwrap().is_empty());
        assert!(decode_lenient("42").unwrap().is_empty());
        assert!(decode_lenient("").is_err());
    }

    #[test]
    fn test_read_import_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.json");
        std::fs::write(&path, r#"[{"name": "One"}, {"name": "Two"}]"#).unwrap();

        let cards = read_import_file(&path).unwrap();
        assert_eq!(cards, vec![json!({"name": "One"}), json!({"name": "Two"})]);

        let missing = read_import_file(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ImportError::Io { .. })));
    }
}
