//! Durable storage for words and tags
//!
//! Directory layout:
//! ```text
//! {data_dir}/
//! ├── words.json   # Object of word records keyed by id
//! └── tags.json    # Object of tags keyed by id
//! ```
//!
//! Both collections are loaded once and kept in memory. Every mutation is
//! written through before it returns; if the write fails the in-memory change
//! is rolled back so memory and disk never disagree.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::models::*;
use crate::persist::write_atomic;
use crate::review::{calculate_next_review_at, initialize_review_params_at, ReviewOutcome};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Word not found: {0}")]
    WordNotFound(Uuid),

    #[error("Tag not found: {0}")]
    TagNotFound(Uuid),

    #[error("Invalid input: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

const WORDS_FILE: &str = "words.json";
const TAGS_FILE: &str = "tags.json";

/// Owner of all word and tag state
pub struct WordStore {
    data_dir: PathBuf,
    words: HashMap<Uuid, WordRecord>,
    tags: HashMap<Uuid, Tag>,
}

fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<HashMap<Uuid, T>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(HashMap::new());
    }
    Ok(serde_json::from_str(&content)?)
}

fn write_collection<T: Serialize>(path: &Path, items: &HashMap<Uuid, T>) -> Result<()> {
    write_atomic(path, &serde_json::to_string_pretty(items)?)?;
    Ok(())
}

impl WordStore {
    /// Open (or create) the store rooted at `data_dir`
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;

        let words = load_collection(&data_dir.join(WORDS_FILE))?;
        let tags = load_collection(&data_dir.join(TAGS_FILE))?;
        log::info!(
            "Opened word store at {:?}: {} words, {} tags",
            data_dir,
            words.len(),
            tags.len()
        );

        Ok(Self {
            data_dir,
            words,
            tags,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // ==================== Persistence ====================

    /// Apply a change to one word and persist, undoing it if the write fails.
    /// Returns the previous value.
    fn commit_word(&mut self, id: Uuid, next: Option<WordRecord>) -> Result<Option<WordRecord>> {
        let previous = match next {
            Some(record) => self.words.insert(id, record),
            None => self.words.remove(&id),
        };

        if let Err(e) = write_collection(&self.data_dir.join(WORDS_FILE), &self.words) {
            log::warn!("Failed to persist words, rolling back {}: {}", id, e);
            match previous {
                Some(old) => {
                    self.words.insert(id, old);
                }
                None => {
                    self.words.remove(&id);
                }
            }
            return Err(e);
        }

        Ok(previous)
    }

    fn commit_tag(&mut self, id: Uuid, next: Option<Tag>) -> Result<Option<Tag>> {
        let previous = match next {
            Some(tag) => self.tags.insert(id, tag),
            None => self.tags.remove(&id),
        };

        if let Err(e) = write_collection(&self.data_dir.join(TAGS_FILE), &self.tags) {
            log::warn!("Failed to persist tags, rolling back {}: {}", id, e);
            match previous {
                Some(old) => {
                    self.tags.insert(id, old);
                }
                None => {
                    self.tags.remove(&id);
                }
            }
            return Err(e);
        }

        Ok(previous)
    }

    fn ensure_tags_exist(&self, tag_ids: &BTreeSet<Uuid>) -> Result<()> {
        match tag_ids.iter().find(|id| !self.tags.contains_key(id)) {
            Some(missing) => Err(StoreError::TagNotFound(*missing)),
            None => Ok(()),
        }
    }

    // ==================== Word Operations ====================

    /// All words, optionally filtered by a case-insensitive substring of
    /// text or meaning. Order is unspecified.
    pub fn get_all(&self, filter: Option<&str>) -> Vec<WordRecord> {
        let needle = filter
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty());

        match needle {
            Some(needle) => self
                .words
                .values()
                .filter(|w| w.matches(&needle))
                .cloned()
                .collect(),
            None => self.words.values().cloned().collect(),
        }
    }

    pub fn get(&self, id: Uuid) -> Result<&WordRecord> {
        self.words.get(&id).ok_or(StoreError::WordNotFound(id))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words with `next_review_at <= as_of`, oldest due first
    pub fn get_due(&self, as_of: DateTime<Utc>) -> Vec<WordRecord> {
        let mut due: Vec<WordRecord> = self
            .words
            .values()
            .filter(|w| w.is_due_at(as_of))
            .cloned()
            .collect();
        due.sort_by(|a, b| a.next_review_at.cmp(&b.next_review_at));
        due
    }

    pub fn due_count(&self, as_of: DateTime<Utc>) -> usize {
        self.words.values().filter(|w| w.is_due_at(as_of)).count()
    }

    pub fn review_stats(&self, as_of: DateTime<Utc>) -> ReviewStats {
        let mut stats = ReviewStats::default();
        for word in self.words.values() {
            stats.count(word, as_of);
        }
        stats
    }

    /// Save a newly captured word with a fresh schedule
    pub fn save_word(&mut self, word: NewWord, now: DateTime<Utc>) -> Result<WordRecord> {
        if word.text.trim().is_empty() {
            return Err(StoreError::Validation("Word text must not be empty".to_string()));
        }
        self.ensure_tags_exist(&word.tag_ids)?;

        let record = WordRecord::new(word, initialize_review_params_at(now), now);
        self.commit_word(record.id, Some(record.clone()))?;
        log::info!("Saved word '{}' ({})", record.text, record.id);
        Ok(record)
    }

    /// Insert a record, or merge its content into an existing one.
    ///
    /// An existing record keeps its id, creation time and schedule; only
    /// review outcomes may move a schedule once a word is stored.
    pub fn upsert(&mut self, record: WordRecord) -> Result<WordRecord> {
        if record.text.trim().is_empty() {
            return Err(StoreError::Validation("Word text must not be empty".to_string()));
        }
        self.ensure_tags_exist(&record.tag_ids)?;

        let stored = match self.words.get(&record.id) {
            Some(existing) => {
                let mut merged = existing.clone();
                merged.merge_content(record);
                merged
            }
            None => {
                let mut fresh = record;
                fresh.next_review_at = fresh.next_review_at.max(fresh.created_at);
                fresh
            }
        };

        self.commit_word(stored.id, Some(stored.clone()))?;
        Ok(stored)
    }

    /// Apply a partial content update
    pub fn update(&mut self, id: Uuid, updates: WordUpdate) -> Result<WordRecord> {
        let mut word = self.get(id)?.clone();

        if let Some(text) = updates.text {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(StoreError::Validation("Word text must not be empty".to_string()));
            }
            word.text = text;
        }
        if let Some(meaning) = updates.meaning {
            word.meaning = meaning;
        }
        if let Some(pronunciation) = updates.pronunciation {
            word.pronunciation = pronunciation;
        }
        if let Some(part_of_speech) = updates.part_of_speech {
            word.part_of_speech = part_of_speech;
        }
        if let Some(example) = updates.example {
            word.example = example;
        }
        if let Some(tag_ids) = updates.tag_ids {
            self.ensure_tags_exist(&tag_ids)?;
            word.tag_ids = tag_ids;
        }

        self.commit_word(id, Some(word.clone()))?;
        Ok(word)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<WordRecord> {
        if !self.words.contains_key(&id) {
            return Err(StoreError::WordNotFound(id));
        }
        let removed = self
            .commit_word(id, None)?
            .ok_or(StoreError::WordNotFound(id))?;
        log::info!("Deleted word '{}' ({})", removed.text, id);
        Ok(removed)
    }

    /// Record a review outcome. This is the only path that moves a schedule.
    pub fn apply_review(
        &mut self,
        id: Uuid,
        outcome: ReviewOutcome,
        now: DateTime<Utc>,
    ) -> Result<WordRecord> {
        let mut word = self.get(id)?.clone();
        let params = calculate_next_review_at(word.review_count as i64, outcome, now);
        word.apply_schedule(params);

        self.commit_word(id, Some(word.clone()))?;
        log::debug!(
            "Reviewed '{}' as {:?}: rank {}, next in {}d",
            word.text,
            outcome,
            word.review_count,
            word.interval
        );
        Ok(word)
    }

    /// Replace a word's tags
    pub fn set_word_tags(&mut self, id: Uuid, tag_ids: BTreeSet<Uuid>) -> Result<WordRecord> {
        self.ensure_tags_exist(&tag_ids)?;
        let mut word = self.get(id)?.clone();
        word.tag_ids = tag_ids;
        self.commit_word(id, Some(word.clone()))?;
        Ok(word)
    }

    /// Merge tags into a word's existing set
    pub fn add_word_tags(&mut self, id: Uuid, tag_ids: BTreeSet<Uuid>) -> Result<WordRecord> {
        self.ensure_tags_exist(&tag_ids)?;
        let mut word = self.get(id)?.clone();
        word.tag_ids.extend(tag_ids);
        self.commit_word(id, Some(word.clone()))?;
        Ok(word)
    }

    // ==================== Tag Operations ====================

    /// All tags, oldest first
    pub fn list_tags(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.name.cmp(&b.name)));
        tags
    }

    pub fn get_tag(&self, id: Uuid) -> Result<&Tag> {
        self.tags.get(&id).ok_or(StoreError::TagNotFound(id))
    }

    pub fn create_tag(&mut self, name: &str, color: &str, now: DateTime<Utc>) -> Result<Tag> {
        let tag = Tag::new(name, color, now).map_err(StoreError::Validation)?;
        self.commit_tag(tag.id, Some(tag.clone()))?;
        log::info!("Created tag '{}' ({})", tag.name, tag.id);
        Ok(tag)
    }

    pub fn update_tag(&mut self, id: Uuid, name: Option<&str>, color: Option<&str>) -> Result<Tag> {
        let mut tag = self.get_tag(id)?.clone();
        if let Some(name) = name {
            tag.name = normalize_tag_name(name).map_err(StoreError::Validation)?;
        }
        if let Some(color) = color {
            tag.color = normalize_color(color).map_err(StoreError::Validation)?;
        }
        self.commit_tag(id, Some(tag.clone()))?;
        Ok(tag)
    }

    /// Delete a tag and detach it from every word. Returns how many words
    /// were detached.
    pub fn delete_tag(&mut self, id: Uuid) -> Result<usize> {
        self.get_tag(id)?;

        let tagged: Vec<Uuid> = self
            .words
            .values()
            .filter(|w| w.tag_ids.contains(&id))
            .map(|w| w.id)
            .collect();

        let previous_words = self.words.clone();
        for word_id in &tagged {
            if let Some(word) = self.words.get_mut(word_id) {
                word.tag_ids.remove(&id);
            }
        }
        if !tagged.is_empty() {
            if let Err(e) = write_collection(&self.data_dir.join(WORDS_FILE), &self.words) {
                self.words = previous_words;
                return Err(e);
            }
        }

        if let Err(e) = self.commit_tag(id, None) {
            if !tagged.is_empty() {
                self.words = previous_words;
                if let Err(restore) = write_collection(&self.data_dir.join(WORDS_FILE), &self.words) {
                    log::error!("Failed to restore words after tag delete failed: {}", restore);
                }
            }
            return Err(e);
        }
        log::info!("Deleted tag {} (detached from {} words)", id, tagged.len());
        Ok(tagged.len())
    }
}
