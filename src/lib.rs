#![forbid(unsafe_code)]

//! Two-sided flashcard decks: a builder for composing cards and a
//! presenter for stepping through them, both backed by a small
//! key/value store.

pub mod cli;
pub mod config;
pub mod constants;
pub mod deck;
pub mod export;
pub mod import;
pub mod normalize;
pub mod persistence;
pub mod presenter;
pub mod render;
pub mod store;
pub mod types;
