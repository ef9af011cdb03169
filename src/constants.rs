//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Card shape defaults
pub mod card {
    /// Layout used when a side has no (or a blank) layout id
    pub const DEFAULT_LAYOUT: &str = "full";

    /// Name given to cards whose name is missing or blank
    pub const UNTITLED: &str = "Untitled card";

    /// Heading shown for a card with no name yet (draft form)
    pub const NAME_PLACEHOLDER: &str = "Card Name";

    /// Region used when a caller does not name one
    pub const DEFAULT_REGION: &str = "area-1";
}

/// Persisted deck format
pub mod deck {
    /// Version stamped into every saved and exported deck
    pub const VERSION: u32 = 1;

    /// Persisted `currentIndex` value meaning "editing the draft"
    pub const DRAFT_SENTINEL: i64 = -1;
}

/// Local storage slot keys
pub mod slots {
    /// Builder state (cards, selection, draft content)
    pub const BUILDER: &str = "flashcard-builder-state";

    /// Presenter deck (cards, cursor)
    pub const PRESENTER: &str = "flashcard-presenter-data";

    /// Presenter stylesheet name
    pub const PRESENTER_STYLE: &str = "flashcard-presenter-style";

    /// Extension of slot files on disk
    pub const FILE_EXTENSION: &str = "json";
}

/// Presenter display constants
pub mod presenter {
    /// Style applied when none has been chosen
    pub const DEFAULT_STYLE: &str = "minimal";
}

/// Export file constants
pub mod export {
    /// File name of a downloaded deck
    pub const FILENAME: &str = "flashcards.json";
}

/// Image URL rewriting for media-hosting viewer pages
pub mod media {
    /// Host families whose `File:` viewer pages get rewritten
    pub const HOST_FAMILIES: &[&str] = &["wikipedia.org", "wikimedia.org"];

    /// Direct file-path endpoint; the encoded file name is appended
    pub const FILE_PATH_BASE: &str = "https://commons.wikimedia.org/wiki/Special:FilePath/";
}

/// Configuration file locations
pub mod config {
    /// Directory name under the platform config/data dirs
    pub const APP_DIR: &str = "flashdeck";

    /// Config file name
    pub const FILENAME: &str = "config.json";

    /// Directory (under the data dir) holding storage slots
    pub const STORAGE_DIR: &str = "storage";

    /// Directory (under the data dir) holding default topic decks
    pub const TOPICS_DIR: &str = "flashcards";
}
