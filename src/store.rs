//! The card store: saved cards, the selection and the unsaved draft
//!
//! Edits go to the selected saved card when there is one, and to the draft
//! otherwise. The store never touches storage itself; every mutation ends by
//! handing a snapshot to the injected [`Persist`].

use tracing::{debug, info};

use crate::deck::{Deck, Form, Selection};
use crate::normalize::{has_content, is_empty_rich_text, normalize_image_url, normalize_layout, normalize_name};
use crate::persistence::Persist;
use crate::types::{Card, ContentItem, Layouts, Side, SideContent};

pub struct CardStore<P: Persist> {
    deck: Deck,
    form: Form,
    read_only: bool,
    persist: P,
}

impl<P: Persist> CardStore<P> {
    /// Empty store with the draft selected
    pub fn new(persist: P) -> Self {
        Self::from_deck(Deck::default(), persist)
    }

    /// Store over a loaded deck; the form picks up the selected card, or the
    /// saved draft form
    pub fn from_deck(deck: Deck, persist: P) -> Self {
        let form = match deck.active_card() {
            Some(card) => Form::from_card(card),
            None => deck.draft_form.clone(),
        };
        Self {
            deck,
            form,
            read_only: false,
            persist,
        }
    }

    /// Store whose content cannot be edited (presenter mode)
    pub fn read_only(deck: Deck, persist: P) -> Self {
        Self {
            read_only: true,
            ..Self::from_deck(deck, persist)
        }
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn cards(&self) -> &[Card] {
        &self.deck.cards
    }

    pub fn selection(&self) -> Selection {
        self.deck.selection
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn active_card(&self) -> Option<&Card> {
        self.deck.active_card()
    }

    fn active_card_mut(&mut self) -> Option<&mut Card> {
        let index = self.deck.selection.saved()?;
        self.deck.cards.get_mut(index)
    }

    /// Content of the selected card, or the draft content
    pub fn active_content(&self) -> &SideContent {
        match self.active_card() {
            Some(card) => &card.content,
            None => &self.deck.draft_content,
        }
    }

    fn active_content_mut(&mut self) -> &mut SideContent {
        match self.deck.selection.saved() {
            Some(index) if index < self.deck.cards.len() => &mut self.deck.cards[index].content,
            _ => &mut self.deck.draft_content,
        }
    }

    fn save(&mut self) {
        self.deck.draft_form = if self.deck.selection.is_draft() {
            self.form.clone()
        } else {
            Form::default()
        };
        self.persist.persist(&self.deck);
    }

    fn writable(&self, operation: &str) -> bool {
        if self.read_only {
            debug!(operation = operation, "Ignoring edit on read-only store");
        }
        !self.read_only
    }

    /// Place `item` in a region of the selected card or the draft
    ///
    /// Image URLs are normalized first. Blank values and empty rich text
    /// leave the region untouched; returns whether anything was written.
    pub fn set_area_content(&mut self, side: Side, region: &str, item: ContentItem) -> bool {
        if !self.writable("set_area_content") {
            return false;
        }
        let item = match item {
            ContentItem::Text(value) => {
                let value = value.trim();
                if is_empty_rich_text(value) {
                    return false;
                }
                ContentItem::Text(value.to_string())
            }
            ContentItem::Image(value) => {
                let value = value.trim();
                if value.is_empty() {
                    return false;
                }
                ContentItem::Image(normalize_image_url(value))
            }
        };
        self.active_content_mut()
            .side_mut(side)
            .insert(region.to_string(), item.into());
        self.save();
        true
    }

    /// Update the form name, renaming the selected card as well
    pub fn set_name(&mut self, value: &str) {
        if !self.writable("set_name") {
            return;
        }
        self.form.name = value.trim().to_string();
        if let Some(card) = self.active_card_mut() {
            card.name = normalize_name(value);
        }
        self.save();
    }

    /// Update the form layout for one side, and the selected card's
    pub fn set_layout(&mut self, side: Side, layout: &str) {
        if !self.writable("set_layout") {
            return;
        }
        let layout = normalize_layout(layout);
        self.form.layouts.set(side, layout.clone());
        if let Some(card) = self.active_card_mut() {
            card.layouts.set(side, layout);
        }
        self.save();
    }

    /// The card the current form and content describe
    pub fn build_card(&self) -> Card {
        Card {
            name: normalize_name(&self.form.name),
            layouts: Layouts {
                front: normalize_layout(&self.form.layouts.front),
                back: normalize_layout(&self.form.layouts.back),
            },
            content: self.active_content().clone(),
        }
    }

    /// Append the form as a new saved card and start a fresh draft
    ///
    /// The new card is not selected. Returns its index.
    pub fn commit_draft(&mut self) -> Option<usize> {
        if !self.writable("commit_draft") {
            return None;
        }
        let card = self.build_card();
        info!(name = %card.name, "Saved card");
        self.deck.cards.push(card);
        self.reset_draft();
        Some(self.deck.cards.len() - 1)
    }

    /// Select a saved card and load it into the form; invalid indexes are ignored
    pub fn select_card(&mut self, index: usize) -> bool {
        let Some(card) = self.deck.cards.get(index) else {
            debug!(index = index, cards = self.deck.cards.len(), "Ignoring selection of missing card");
            return false;
        };
        self.form = Form::from_card(card);
        self.deck.selection = Selection::Saved(index);
        self.save();
        true
    }

    /// Delete a saved card, keeping the selection on the same card
    ///
    /// Removing the selected card falls back to an empty draft form.
    pub fn remove_card(&mut self, index: usize) -> Option<Card> {
        if !self.writable("remove_card") || index >= self.deck.cards.len() {
            return None;
        }
        let removed = self.deck.cards.remove(index);
        match self.deck.selection {
            Selection::Saved(current) if current == index => {
                self.deck.selection = Selection::Draft;
                self.form = Form::default();
            }
            Selection::Saved(current) if current > index => {
                self.deck.selection = Selection::Saved(current - 1);
            }
            _ => {}
        }
        info!(name = %removed.name, index = index, "Removed card");
        self.save();
        Some(removed)
    }

    /// Select the draft and clear its content and the form
    pub fn reset_draft(&mut self) {
        if !self.writable("reset_draft") {
            return;
        }
        self.deck.selection = Selection::Draft;
        self.deck.draft_content = SideContent::default();
        self.form = Form::default();
        self.save();
    }

    /// Whether the unsaved draft holds anything worth keeping
    pub fn has_draft_content(&self) -> bool {
        !self.form.name.trim().is_empty()
            || !self.form.layouts.is_default()
            || has_content(&self.deck.draft_content)
    }

    /// Drop every card and the draft, and remove the persisted state
    pub fn clear_all(&mut self) {
        if !self.writable("clear_all") {
            return;
        }
        self.deck = Deck::default();
        self.form = Form::default();
        self.persist.discard();
        info!("Cleared all cards");
    }

    /// Saved cards plus the pending draft, when it has anything in it
    pub fn export_cards(&self) -> Vec<Card> {
        let mut cards = self.deck.cards.clone();
        if self.deck.selection.is_draft() && self.has_draft_content() {
            cards.push(self.build_card());
        }
        cards
    }

    /// Move the selection without editing anything; used by the presenter cursor
    pub(crate) fn move_selection(&mut self, selection: Selection) {
        self.deck.selection = selection;
        if let Some(card) = self.deck.active_card() {
            self.form = Form::from_card(card);
        }
        self.save();
    }
}
