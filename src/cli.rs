//! Command-line front end: `builder` and `present` views over the stored decks

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::card::DEFAULT_REGION;
use crate::deck::Selection;
use crate::export::write_export;
use crate::import::read_import_file;
use crate::persistence::{transfer_to_presenter, DeckSlot, FileStorage, Persist};
use crate::presenter::{load_style, save_style, PresentationCursor};
use crate::render::render_side;
use crate::store::CardStore;
use crate::types::{ContentItem, Side};

#[derive(Parser, Debug)]
#[command(name = "flashdeck", version, about = "Build and present two-sided flashcards")]
pub struct Cli {
    /// Directory holding saved decks (overrides the config file)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compose and edit cards
    #[command(subcommand)]
    Builder(BuilderCommand),
    /// Step through the presenter deck
    #[command(subcommand)]
    Present(PresentCommand),
}

#[derive(Subcommand, Debug)]
pub enum BuilderCommand {
    /// List saved cards and preview the one being edited
    Show,
    /// Set the card name
    Name { name: String },
    /// Choose the layout of one side
    Layout { side: Side, layout: String },
    /// Put rich text (HTML) in a region
    Text {
        side: Side,
        html: String,
        #[arg(long, default_value = DEFAULT_REGION)]
        region: String,
    },
    /// Put an image URL in a region
    Image {
        side: Side,
        url: String,
        #[arg(long, default_value = DEFAULT_REGION)]
        region: String,
    },
    /// Save the draft as a new card and start a fresh one
    Save,
    /// Edit a saved card (1-based)
    Select { number: usize },
    /// Delete a saved card (1-based)
    Remove {
        number: usize,
        /// Confirm the removal
        #[arg(long)]
        yes: bool,
    },
    /// Discard the draft and go back to editing a new card
    Reset,
    /// Remove every saved card
    NewProject {
        /// Confirm removing all cards
        #[arg(long)]
        yes: bool,
    },
    /// Write flashcards.json
    Export {
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Replace the presenter deck with the saved cards
    Send,
    /// Replace the presenter deck with a JSON file
    Build { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum PresentCommand {
    /// Show the current card
    Show {
        /// Show the back instead of the front
        #[arg(long)]
        back: bool,
    },
    /// Move to the next card
    Next,
    /// Move to the previous card
    Prev,
    /// Load a deck from a JSON file
    Load { file: PathBuf },
    /// List the default topics
    Topics,
    /// Load one of the default topics
    Topic { label: String },
    /// Show or change the presenter style
    Style { name: Option<String> },
    /// Interactive kiosk: n/p to move, f to flip, q to quit
    Run,
}

/// Resolved directories and storage for one invocation
pub struct App {
    pub config: Config,
    pub storage: FileStorage,
}

impl App {
    pub fn new(mut config: Config, data_dir: Option<PathBuf>) -> Self {
        if data_dir.is_some() {
            config.data_dir = data_dir;
        }
        let storage = FileStorage::new(config.storage_dir());
        Self { config, storage }
    }

    fn builder_store(&self) -> CardStore<DeckSlot<FileStorage>> {
        let slot = DeckSlot::builder(self.storage.clone());
        let deck = slot.load().unwrap_or_default();
        CardStore::from_deck(deck, slot)
    }

    fn presenter(&self) -> PresentationCursor<DeckSlot<FileStorage>> {
        let slot = DeckSlot::presenter(self.storage.clone());
        let deck = slot.load().unwrap_or_default();
        PresentationCursor::new(deck, slot)
    }
}

pub fn run(app: &App, command: Command, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Builder(command) => run_builder(app, command, out),
        Command::Present(command) => run_present(app, command, input, out),
    }
}

fn card_index(number: usize, len: usize) -> Result<usize> {
    match number.checked_sub(1) {
        Some(index) if index < len => Ok(index),
        _ => Err(anyhow!("No card number {} (there are {} saved cards)", number, len)),
    }
}

fn run_builder(app: &App, command: BuilderCommand, out: &mut dyn Write) -> Result<()> {
    let mut store = app.builder_store();
    match command {
        BuilderCommand::Show => {}
        BuilderCommand::Name { name } => store.set_name(&name),
        BuilderCommand::Layout { side, layout } => store.set_layout(side, &layout),
        BuilderCommand::Text { side, html, region } => {
            if !store.set_area_content(side, &region, ContentItem::Text(html)) {
                warn!(side = %side, region = %region, "Text is empty, region left unchanged");
            }
        }
        BuilderCommand::Image { side, url, region } => {
            if !store.set_area_content(side, &region, ContentItem::Image(url)) {
                warn!(side = %side, region = %region, "Image URL is empty, region left unchanged");
            }
        }
        BuilderCommand::Save => {
            if let Some(index) = store.commit_draft() {
                writeln!(out, "Saved card {}: {}", index + 1, store.cards()[index].name)?;
            }
        }
        BuilderCommand::Select { number } => {
            let index = card_index(number, store.cards().len())?;
            store.select_card(index);
        }
        BuilderCommand::Remove { number, yes } => {
            let index = card_index(number, store.cards().len())?;
            if !yes {
                bail!("Removing card {} needs --yes", number);
            }
            if let Some(card) = store.remove_card(index) {
                writeln!(out, "Removed card {}: {}", number, card.name)?;
            }
        }
        BuilderCommand::Reset => store.reset_draft(),
        BuilderCommand::NewProject { yes } => {
            if !yes {
                bail!("This will remove any saved cards; pass --yes to confirm");
            }
            store.clear_all();
            writeln!(out, "Started a new project")?;
            return Ok(());
        }
        BuilderCommand::Export { out: dir } => {
            let path = write_export(&store, &dir)?;
            writeln!(out, "Exported {} card(s) to {}", store.export_cards().len(), path.display())?;
            return Ok(());
        }
        BuilderCommand::Send => {
            let raw = store
                .export_cards()
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<Vec<Value>, _>>()
                .context("Failed to serialize cards for the presenter")?;
            let deck = transfer_to_presenter(&app.storage, &raw)?;
            writeln!(out, "Sent {} card(s) to the presenter", deck.cards.len())?;
            return Ok(());
        }
        BuilderCommand::Build { file } => {
            let raw = read_import_file(&file)?;
            let deck = transfer_to_presenter(&app.storage, &raw)?;
            writeln!(out, "Sent {} card(s) to the presenter", deck.cards.len())?;
            return Ok(());
        }
    }
    write_builder_view(&store, out)
}

fn write_builder_view<P: Persist>(store: &CardStore<P>, out: &mut dyn Write) -> Result<()> {
    if store.cards().is_empty() {
        writeln!(out, "No saved cards yet.")?;
    }
    for (index, card) in store.cards().iter().enumerate() {
        let marker = if store.selection() == Selection::Saved(index) { '*' } else { ' ' };
        writeln!(out, "{marker} {}. {}", index + 1, card.name)?;
    }
    match store.selection() {
        Selection::Draft => writeln!(out, "\nEditing new card")?,
        Selection::Saved(index) => writeln!(out, "\nEditing card {}", index + 1)?,
    }

    let form = store.form();
    let content = store.active_content();
    for side in Side::BOTH {
        write!(
            out,
            "{}",
            render_side(&form.name, side, form.layouts.get(side), content.side(side))
        )?;
    }
    Ok(())
}

fn run_present(
    app: &App,
    command: PresentCommand,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    let mut cursor = app.presenter();
    match command {
        PresentCommand::Show { back } => {
            if back {
                cursor.flip();
            }
        }
        PresentCommand::Next => cursor.next(),
        PresentCommand::Prev => cursor.previous(),
        PresentCommand::Load { file } => {
            let raw = read_import_file(&file)?;
            transfer_to_presenter(&app.storage, &raw)?;
            cursor = app.presenter();
        }
        PresentCommand::Topics => {
            for topic in &app.config.topics {
                writeln!(out, "{}  ({})", topic.label, app.config.topic_path(topic).display())?;
            }
            return Ok(());
        }
        PresentCommand::Topic { label } => {
            let topic = app
                .config
                .find_topic(&label)
                .ok_or_else(|| anyhow!("Unknown topic '{}'", label))?;
            let path = app.config.topic_path(topic);
            let raw = read_import_file(&path)
                .with_context(|| format!("Unable to load default flashcards '{}'", topic.label))?;
            transfer_to_presenter(&app.storage, &raw)?;
            info!(topic = %topic.label, "Loaded default topic");
            cursor = app.presenter();
        }
        PresentCommand::Style { name } => {
            let style = match name {
                Some(name) => save_style(&app.storage, &name)?,
                None => load_style(&app.storage),
            };
            writeln!(out, "Presenter style: {style}")?;
            return Ok(());
        }
        PresentCommand::Run => return run_kiosk(app, cursor, input, out),
    }
    write_presenter_view(&cursor, out)
}

fn write_presenter_view<P: Persist>(cursor: &PresentationCursor<P>, out: &mut dyn Write) -> Result<()> {
    let (Some(card), Some(counter)) = (cursor.current(), cursor.counter()) else {
        writeln!(out, "No flashcards loaded. Load a JSON file or pick a topic.")?;
        return Ok(());
    };
    let side = cursor.side();
    writeln!(out, "[{counter}]")?;
    write!(
        out,
        "{}",
        render_side(&card.name, side, card.layouts.get(side), card.content.side(side))
    )?;
    Ok(())
}

fn run_kiosk<P: Persist>(
    app: &App,
    mut cursor: PresentationCursor<P>,
    input: &mut dyn BufRead,
    out: &mut dyn Write,
) -> Result<()> {
    info!(style = %load_style(&app.storage), cards = cursor.len(), "Starting presenter");
    write_presenter_view(&cursor, out)?;

    let mut line = String::new();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "n" | "next" | "" => cursor.next(),
            "p" | "prev" => cursor.previous(),
            "f" | "flip" => cursor.flip(),
            "q" | "quit" => break,
            other => {
                writeln!(out, "Unknown command '{other}' (n, p, f, q)")?;
                continue;
            }
        }
        write_presenter_view(&cursor, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Storage;
    use std::io::Cursor;

    fn app(dir: &std::path::Path) -> App {
        App::new(Config::default(), Some(dir.to_path_buf()))
    }

    fn exec(app: &App, args: &[&str]) -> Result<String> {
        exec_with_input(app, args, "")
    }

    fn exec_with_input(app: &App, args: &[&str], input: &str) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("flashdeck").chain(args.iter().copied()))?;
        let mut input = Cursor::new(input.as_bytes().to_vec());
        let mut out = Vec::new();
        run(app, cli.command, &mut input, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_builder_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        exec(&app, &["builder", "name", "Dog"]).unwrap();
        exec(&app, &["builder", "text", "front", "<h3>Dog</h3>"]).unwrap();
        exec(&app, &["builder", "image", "back", "https://en.wikipedia.org/wiki/File:Dog.jpg", "--region", "area-2"])
            .unwrap();
        let out = exec(&app, &["builder", "save"]).unwrap();
        assert!(out.starts_with("Saved card 1: Dog"));
        assert!(out.contains("Editing new card"));

        let out = exec(&app, &["builder", "select", "1"]).unwrap();
        assert!(out.contains("* 1. Dog"));
        assert!(out.contains("area-1: Dog"));
        assert!(out.contains("area-2: [image] https://commons.wikimedia.org/wiki/Special:FilePath/Dog.jpg"));
    }

    #[test]
    fn test_remove_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        exec(&app, &["builder", "save"]).unwrap();

        assert!(exec(&app, &["builder", "remove", "1"]).is_err());
        assert!(exec(&app, &["builder", "remove", "2", "--yes"]).is_err());
        let out = exec(&app, &["builder", "remove", "1", "--yes"]).unwrap();
        assert!(out.contains("Removed card 1"));
        assert!(out.contains("No saved cards yet."));
    }

    #[test]
    fn test_new_project_clears_slot() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        exec(&app, &["builder", "name", "Dog"]).unwrap();
        exec(&app, &["builder", "save"]).unwrap();

        assert!(exec(&app, &["builder", "new-project"]).is_err());
        exec(&app, &["builder", "new-project", "--yes"]).unwrap();
        assert_eq!(app.storage.get(crate::constants::slots::BUILDER).unwrap(), None);
        assert!(exec(&app, &["builder", "show"]).unwrap().contains("No saved cards yet."));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        exec(&app, &["builder", "name", "Dog"]).unwrap();
        exec(&app, &["builder", "save"]).unwrap();
        exec(&app, &["builder", "name", "Pending"]).unwrap();

        let out_dir = dir.path().join("out");
        let out = exec(&app, &["builder", "export", "--out", out_dir.to_str().unwrap()]).unwrap();
        assert!(out.contains("Exported 2 card(s)"));
        assert!(out_dir.join("flashcards.json").exists());
    }

    #[test]
    fn test_send_and_navigate() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        for name in ["One", "Two", "Three"] {
            exec(&app, &["builder", "name", name]).unwrap();
            exec(&app, &["builder", "save"]).unwrap();
        }
        let out = exec(&app, &["builder", "send"]).unwrap();
        assert!(out.contains("Sent 3 card(s)"));

        assert!(exec(&app, &["present", "show"]).unwrap().starts_with("[1/3]\nOne"));
        assert!(exec(&app, &["present", "prev"]).unwrap().starts_with("[3/3]\nThree"));
        assert!(exec(&app, &["present", "next"]).unwrap().starts_with("[1/3]\nOne"));
        assert!(exec(&app, &["present", "show", "--back"]).unwrap().contains("(back, layout: full)"));
    }

    #[test]
    fn test_build_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        let file = dir.path().join("deck.json");
        std::fs::write(
            &file,
            r#"{"cards":[{"name":"Dog","content":{"front":{"area-1":{"type":"text","value":"Dog"}}}}]}"#,
        )
        .unwrap();

        exec(&app, &["builder", "build", file.to_str().unwrap()]).unwrap();
        let out = exec(&app, &["present", "show"]).unwrap();
        assert_eq!(out, "[1/1]\nDog (front, layout: full)\n  area-1: Dog\n");
    }

    #[test]
    fn test_present_empty_and_topics() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        assert!(exec(&app, &["present", "show"]).unwrap().starts_with("No flashcards loaded"));

        let topics = dir.path().join("flashcards");
        std::fs::create_dir_all(&topics).unwrap();
        std::fs::write(topics.join("flashcards-opposites.json"), r#"[{"name": "Hot"}, {"name": "Cold"}]"#)
            .unwrap();

        assert!(exec(&app, &["present", "topics"]).unwrap().contains("Opposites"));
        assert!(exec(&app, &["present", "topic", "Planets"]).is_err());
        assert!(exec(&app, &["present", "topic", "Clocks: Learning Time"]).is_err());
        assert!(exec(&app, &["present", "topic", "opposites"]).unwrap().starts_with("[1/2]\nHot"));
    }

    #[test]
    fn test_style() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        assert_eq!(exec(&app, &["present", "style"]).unwrap(), "Presenter style: minimal\n");
        exec(&app, &["present", "style", "chalkboard"]).unwrap();
        assert_eq!(exec(&app, &["present", "style"]).unwrap(), "Presenter style: chalkboard\n");
    }

    #[test]
    fn test_kiosk_loop() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());
        let file = dir.path().join("deck.json");
        std::fs::write(&file, r#"[{"name": "A"}, {"name": "B"}]"#).unwrap();
        exec(&app, &["present", "load", file.to_str().unwrap()]).unwrap();

        let out = exec_with_input(&app, &["present", "run"], "n\nf\nx\nq\n").unwrap();
        assert!(out.contains("[2/2]\nB (front"));
        assert!(out.contains("[2/2]\nB (back"));
        assert!(out.contains("Unknown command 'x'"));

        // Kiosk moves are remembered
        assert!(exec(&app, &["present", "show"]).unwrap().starts_with("[2/2]"));
    }
}
