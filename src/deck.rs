//! Deck snapshot and selection state

use crate::constants::deck::DRAFT_SENTINEL;
use crate::types::{Card, Layouts, SideContent};

/// Which card edits apply to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// No saved card selected; edits go to the draft
    #[default]
    Draft,
    /// Index into the saved cards
    Saved(usize),
}

impl Selection {
    /// Convert a persisted `currentIndex`, clamping it to the deck
    ///
    /// Negative values and empty decks select the draft, indexes past the
    /// end select the last card.
    pub fn from_index(index: i64, len: usize) -> Self {
        if index < 0 || len == 0 {
            return Selection::Draft;
        }
        let index = usize::try_from(index).unwrap_or(usize::MAX);
        Selection::Saved(index.min(len - 1))
    }

    /// The persisted `currentIndex` form
    pub fn to_index(self) -> i64 {
        match self {
            Selection::Draft => DRAFT_SENTINEL,
            Selection::Saved(index) => i64::try_from(index).unwrap_or(i64::MAX),
        }
    }

    pub fn saved(self) -> Option<usize> {
        match self {
            Selection::Draft => None,
            Selection::Saved(index) => Some(index),
        }
    }

    pub fn is_draft(self) -> bool {
        self == Selection::Draft
    }
}

/// Editable name and layout selection
///
/// Mirrors the selected card while one is selected, otherwise holds the
/// draft's name and layouts. The name is kept as typed, blank included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    pub name: String,
    pub layouts: Layouts,
}

impl Form {
    pub fn from_card(card: &Card) -> Self {
        Self {
            name: card.name.clone(),
            layouts: card.layouts.clone(),
        }
    }
}

/// Everything a deck slot persists
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
    pub selection: Selection,
    pub draft_content: SideContent,
    /// Name and layouts typed for the draft
    pub draft_form: Form,
}

impl Deck {
    pub fn new(cards: Vec<Card>, selection: Selection) -> Self {
        Self {
            cards,
            selection,
            ..Self::default()
        }
    }

    /// The selected saved card, if the selection points at one
    pub fn active_card(&self) -> Option<&Card> {
        self.selection.saved().and_then(|index| self.cards.get(index))
    }
}
