//! Application configuration
//!
//! A small JSON file in the platform config directory. Every field has a
//! default so older or hand-written files keep loading.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::config::{APP_DIR, FILENAME, STORAGE_DIR, TOPICS_DIR};

/// A bundled deck the presenter can load by name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub label: String,
    /// Deck file, relative to the topics directory unless absolute
    pub path: PathBuf,
}

/// Where a loaded config came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// No file existed; defaults were written
    Created,
    Existing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Overrides the platform data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Overrides `<data_dir>/flashcards`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics_dir: Option<PathBuf>,
    #[serde(default = "default_topics")]
    pub topics: Vec<Topic>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_topics() -> Vec<Topic> {
    vec![
        Topic {
            label: "Clocks: Learning Time".to_string(),
            path: PathBuf::from("flashcards-clock-learning-time.json"),
        },
        Topic {
            label: "Opposites".to_string(),
            path: PathBuf::from("flashcards-opposites.json"),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: default_log_level(),
            topics_dir: None,
            topics: default_topics(),
        }
    }
}

impl Config {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(APP_DIR);
        path.push(FILENAME);
        path
    }

    /// Load the config file, writing a default one on first run
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        Self::open(config_path).map(|(config, _)| config)
    }

    /// Like [`Config::load_from`], also reporting whether the file was created
    pub fn open(config_path: &Path) -> Result<(Self, ConfigSource)> {
        if !config_path.exists() {
            info!("Config file not found, creating default config at {:?}", config_path);
            let config = Config::default();
            config.save_to(config_path)?;
            return Ok((config, ConfigSource::Created));
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {:?}", config_path))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON from {:?}", config_path))?;

        info!("Loaded config with {} topic(s)", config.topics.len());
        Ok((config, ConfigSource::Existing))
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config to JSON")?;
        fs::write(config_path, json)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;
        info!("Saved config to {:?}", config_path);
        Ok(())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push(APP_DIR);
            path
        })
    }

    /// Where the storage slot files live
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir().join(STORAGE_DIR)
    }

    pub fn topics_dir(&self) -> PathBuf {
        self.topics_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join(TOPICS_DIR))
    }

    /// Look a topic up by label, ignoring case
    pub fn find_topic(&self, label: &str) -> Option<&Topic> {
        let label = label.trim();
        self.topics
            .iter()
            .find(|topic| topic.label.eq_ignore_ascii_case(label))
    }

    pub fn topic_path(&self, topic: &Topic) -> PathBuf {
        if topic.path.is_absolute() {
            topic.path.clone()
        } else {
            self.topics_dir().join(&topic.path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_creates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/config.json");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());

        // Second load reads the file written by the first
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_open_reports_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let (_, source) = Config::open(&path).unwrap();
        assert_eq!(source, ConfigSource::Created);
        let (_, source) = Config::open(&path).unwrap();
        assert_eq!(source, ConfigSource::Existing);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"log_level": "debug"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.topics.len(), 2);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ nope").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_directories_follow_data_dir() {
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/decks")),
            ..Config::default()
        };
        assert_eq!(config.storage_dir(), PathBuf::from("/tmp/decks/storage"));
        assert_eq!(config.topics_dir(), PathBuf::from("/tmp/decks/flashcards"));

        let config = Config {
            topics_dir: Some(PathBuf::from("/srv/topics")),
            ..config
        };
        assert_eq!(config.topics_dir(), PathBuf::from("/srv/topics"));
    }

    #[test]
    fn test_find_topic() {
        let config = Config {
            topics_dir: Some(PathBuf::from("/srv/topics")),
            ..Config::default()
        };
        let topic = config.find_topic(" opposites ").unwrap();
        assert_eq!(topic.label, "Opposites");
        assert_eq!(
            config.topic_path(topic),
            PathBuf::from("/srv/topics/flashcards-opposites.json")
        );
        assert!(config.find_topic("Planets").is_none());
    }
}
