//! Presenter mode: circular navigation over a saved deck

use anyhow::Result;
use tracing::{debug, warn};

use crate::constants::{presenter::DEFAULT_STYLE, slots};
use crate::deck::{Deck, Selection};
use crate::persistence::{Persist, Storage};
use crate::store::CardStore;
use crate::types::{Card, Side};

/// Read-only view of a deck with a wrapping cursor and a flip flag
pub struct PresentationCursor<P: Persist> {
    store: CardStore<P>,
    flipped: bool,
}

impl<P: Persist> PresentationCursor<P> {
    /// Wrap a presenter deck; a deck stored without a selection starts on
    /// its first card
    pub fn new(mut deck: Deck, persist: P) -> Self {
        if deck.selection.is_draft() && !deck.cards.is_empty() {
            deck.selection = Selection::Saved(0);
        }
        Self {
            store: CardStore::read_only(deck, persist),
            flipped: false,
        }
    }

    pub fn len(&self) -> usize {
        self.store.cards().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the card on display
    pub fn position(&self) -> Option<usize> {
        self.store.selection().saved()
    }

    pub fn current(&self) -> Option<&Card> {
        self.store.active_card()
    }

    /// Side currently facing the viewer
    pub fn side(&self) -> Side {
        if self.flipped { Side::Back } else { Side::Front }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn flip(&mut self) {
        self.flipped = !self.flipped;
    }

    /// `"3/10"`, or `None` for an empty deck
    pub fn counter(&self) -> Option<String> {
        self.position().map(|index| format!("{}/{}", index + 1, self.len()))
    }

    pub fn next(&mut self) {
        self.step(|index, len| (index + 1) % len);
    }

    pub fn previous(&mut self) {
        self.step(|index, len| (index + len - 1) % len);
    }

    fn step(&mut self, advance: impl Fn(usize, usize) -> usize) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let index = advance(self.position().unwrap_or(0), len);
        debug!(from = ?self.position(), to = index, "Moving presenter cursor");
        self.store.move_selection(Selection::Saved(index));
        self.flipped = false;
    }
}

/// Stylesheet name the presenter uses, defaulting to `minimal`
pub fn load_style<S: Storage>(storage: &S) -> String {
    match storage.get(slots::PRESENTER_STYLE) {
        Ok(Some(style)) if !style.trim().is_empty() => style.trim().to_string(),
        Ok(_) => DEFAULT_STYLE.to_string(),
        Err(e) => {
            warn!(error = ?e, "Unable to read presenter style");
            DEFAULT_STYLE.to_string()
        }
    }
}

/// Remember the presenter stylesheet; a blank name resets to the default
pub fn save_style<S: Storage>(storage: &S, style: &str) -> Result<String> {
    let style = match style.trim() {
        "" => DEFAULT_STYLE,
        style => style,
    };
    storage.set(slots::PRESENTER_STYLE, style)?;
    Ok(style.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{DeckSlot, MemoryStorage, NoPersist};

    fn deck_of(len: usize) -> Deck {
        let cards = (0..len)
            .map(|i| Card {
                name: format!("Card {i}"),
                ..Card::default()
            })
            .collect();
        Deck::new(cards, Selection::Draft)
    }

    #[test]
    fn test_starts_on_first_card() {
        let cursor = PresentationCursor::new(deck_of(3), NoPersist);
        assert_eq!(cursor.position(), Some(0));
        assert_eq!(cursor.counter().as_deref(), Some("1/3"));
        assert_eq!(cursor.current().unwrap().name, "Card 0");
    }

    #[test]
    fn test_next_wraps_around() {
        let mut cursor = PresentationCursor::new(deck_of(4), NoPersist);
        for _ in 0..4 {
            cursor.next();
        }
        assert_eq!(cursor.position(), Some(0));

        cursor.next();
        cursor.next();
        cursor.next();
        cursor.next();
        cursor.previous();
        assert_eq!(cursor.position(), Some(3));
    }

    #[test]
    fn test_previous_undoes_next() {
        let mut cursor = PresentationCursor::new(deck_of(5), NoPersist);
        cursor.next();
        cursor.next();
        let before = cursor.position();
        cursor.next();
        cursor.previous();
        assert_eq!(cursor.position(), before);

        let mut cursor = PresentationCursor::new(deck_of(5), NoPersist);
        cursor.previous();
        assert_eq!(cursor.position(), Some(4));
    }

    #[test]
    fn test_empty_deck_is_a_no_op() {
        let mut cursor = PresentationCursor::new(deck_of(0), NoPersist);
        cursor.next();
        cursor.previous();
        assert_eq!(cursor.position(), None);
        assert_eq!(cursor.counter(), None);
        assert!(cursor.current().is_none());
    }

    #[test]
    fn test_navigation_resets_flip() {
        let mut cursor = PresentationCursor::new(deck_of(2), NoPersist);
        cursor.flip();
        assert_eq!(cursor.side(), Side::Back);
        cursor.next();
        assert!(!cursor.is_flipped());
        assert_eq!(cursor.side(), Side::Front);

        cursor.flip();
        cursor.previous();
        assert!(!cursor.is_flipped());
    }

    #[test]
    fn test_cursor_moves_are_persisted() {
        let storage = MemoryStorage::new();
        let slot = DeckSlot::presenter(storage.clone());
        slot.save(&deck_of(3));

        let mut cursor = PresentationCursor::new(slot.load().unwrap(), slot.clone());
        cursor.next();
        cursor.next();

        let reloaded = slot.load().unwrap();
        assert_eq!(reloaded.selection, Selection::Saved(2));
        assert_eq!(reloaded.cards.len(), 3);
    }

    #[test]
    fn test_style_slot() {
        let storage = MemoryStorage::new();
        assert_eq!(load_style(&storage), "minimal");

        assert_eq!(save_style(&storage, " chalkboard ").unwrap(), "chalkboard");
        assert_eq!(load_style(&storage), "chalkboard");

        assert_eq!(save_style(&storage, "").unwrap(), "minimal");
        assert_eq!(load_style(&storage), "minimal");
    }
}
