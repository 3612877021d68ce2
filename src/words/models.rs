//! Data models for saved words and tags

use std::collections::BTreeSet;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::review::{truncate_to_millis, ReviewParams, DEFAULT_EASE_FACTOR, LAST_INDEX};

/// Maximum tag name length, in characters
pub const MAX_TAG_NAME_CHARS: usize = 20;

/// Where in the original page a word was captured.
///
/// `path` and `offset` locate the text node directly; `prefix` and `suffix`
/// hold the surrounding text for fuzzy relocation when the page changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceAnchor {
    pub path: String,
    pub offset: u32,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

/// A captured vocabulary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub id: Uuid,
    pub text: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub source_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<SourceAnchor>,
    /// Rank on the interval ladder
    #[serde(default)]
    pub review_count: u32,
    /// Days until the next review
    pub interval: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub next_review_at: DateTime<Utc>,
    #[serde(default = "default_ease_factor")]
    pub ease_factor: f32,
    #[serde(default)]
    pub tag_ids: BTreeSet<Uuid>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

fn default_ease_factor() -> f32 {
    DEFAULT_EASE_FACTOR
}

impl WordRecord {
    pub fn new(word: NewWord, params: ReviewParams, now: DateTime<Utc>) -> Self {
        let now = truncate_to_millis(now);
        Self {
            id: Uuid::new_v4(),
            text: word.text.trim().to_string(),
            meaning: word.meaning,
            pronunciation: word.pronunciation,
            part_of_speech: word.part_of_speech,
            example: word.example,
            source_url: word.source_url,
            source_title: word.source_title,
            anchor: word.anchor,
            review_count: params.review_count,
            interval: params.interval,
            next_review_at: truncate_to_millis(params.next_review_at).max(now),
            ease_factor: DEFAULT_EASE_FACTOR,
            tag_ids: word.tag_ids,
            created_at: now,
        }
    }

    /// Check if the word is due for review at `as_of`
    pub fn is_due_at(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review_at <= as_of
    }

    pub fn is_due(&self) -> bool {
        self.is_due_at(Utc::now())
    }

    /// Case-insensitive substring match over text and meaning.
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.text.to_lowercase().contains(needle) || self.meaning.to_lowercase().contains(needle)
    }

    /// Overwrite the schedule fields. Only the store's review path calls this.
    pub(crate) fn apply_schedule(&mut self, params: ReviewParams) {
        self.review_count = params.review_count;
        self.interval = params.interval;
        self.next_review_at = truncate_to_millis(params.next_review_at).max(self.created_at);
    }

    /// Copy every user-editable field from `other`, keeping identity and schedule
    pub(crate) fn merge_content(&mut self, other: WordRecord) {
        self.text = other.text;
        self.meaning = other.meaning;
        self.pronunciation = other.pronunciation;
        self.part_of_speech = other.part_of_speech;
        self.example = other.example;
        self.source_url = other.source_url;
        self.source_title = other.source_title;
        self.anchor = other.anchor;
        self.tag_ids = other.tag_ids;
    }
}

/// Fields for a word being saved for the first time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWord {
    pub text: String,
    #[serde(default)]
    pub meaning: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub example: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub source_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<SourceAnchor>,
    #[serde(default)]
    pub tag_ids: BTreeSet<Uuid>,
}

impl NewWord {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = meaning.into();
        self
    }
}

/// Partial update of a word's content.
///
/// Schedule fields are deliberately absent; payloads that carry them are
/// rejected when decoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WordUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meaning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_ids: Option<BTreeSet<Uuid>>,
}

impl WordUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A user-defined label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    /// Always `#rrggbb`
    pub color: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Tag {
    /// Build a tag from raw user input, validating name and color
    pub fn new(name: &str, color: &str, now: DateTime<Utc>) -> Result<Self, String> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: normalize_tag_name(name)?,
            color: normalize_color(color)?,
            created_at: truncate_to_millis(now),
        })
    }
}

/// Trim a tag name and check its length
pub fn normalize_tag_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err("Tag name must not be empty".to_string());
    }
    if len > MAX_TAG_NAME_CHARS {
        return Err(format!(
            "Tag name must be at most {} characters, got {}",
            MAX_TAG_NAME_CHARS, len
        ));
    }
    Ok(trimmed.to_string())
}

fn hex_color_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^#([0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
    })
}

/// Validate a hex color, expanding `#rgb` to `#rrggbb` and lowercasing
pub fn normalize_color(color: &str) -> Result<String, String> {
    let color = color.trim();
    let caps = hex_color_regex()
        .captures(color)
        .ok_or_else(|| format!("Invalid hex color '{}'", color))?;
    let digits = caps[1].to_lowercase();

    if digits.len() == 3 {
        let expanded: String = digits.chars().flat_map(|c| [c, c]).collect();
        Ok(format!("#{}", expanded))
    } else {
        Ok(format!("#{}", digits))
    }
}

/// Review progress across all saved words
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_words: usize,
    pub due_words: usize,
    /// Never remembered yet
    pub new_words: usize,
    pub learning_words: usize,
    /// At the top of the ladder
    pub mastered_words: usize,
}

impl ReviewStats {
    pub(crate) fn count(&mut self, word: &WordRecord, as_of: DateTime<Utc>) {
        self.total_words += 1;
        match word.review_count {
            0 => self.new_words += 1,
            n if n >= LAST_INDEX => self.mastered_words += 1,
            _ => self.learning_words += 1,
        }
        if word.is_due_at(as_of) {
            self.due_words += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::initialize_review_params_at;

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#FF8800").unwrap(), "#ff8800");
        assert_eq!(normalize_color("#abc").unwrap(), "#aabbcc");
        assert_eq!(normalize_color(" #123456 ").unwrap(), "#123456");
        assert!(normalize_color("ff8800").is_err());
        assert!(normalize_color("#ff88").is_err());
        assert!(normalize_color("#gggggg").is_err());
    }

    #[test]
    fn test_normalize_tag_name() {
        assert_eq!(normalize_tag_name("  verbs ").unwrap(), "verbs");
        assert!(normalize_tag_name("   ").is_err());
        assert!(normalize_tag_name(&"x".repeat(21)).is_err());
        // Length is counted in characters, not bytes
        assert!(normalize_tag_name(&"é".repeat(20)).is_ok());
    }

    #[test]
    fn test_word_update_rejects_schedule_fields() {
        let ok: Result<WordUpdate, _> = serde_json::from_str(r#"{"meaning":"to run"}"#);
        assert_eq!(ok.unwrap().meaning.as_deref(), Some("to run"));

        let rejected: Result<WordUpdate, _> = serde_json::from_str(r#"{"nextReviewAt":0}"#);
        assert!(rejected.is_err());
        let rejected: Result<WordUpdate, _> = serde_json::from_str(r#"{"reviewCount":3}"#);
        assert!(rejected.is_err());
    }

    #[test]
    fn test_word_record_wire_format() {
        let now = Utc::now();
        let word = WordRecord::new(
            NewWord::new(" serendipity ").with_meaning("happy accident"),
            initialize_review_params_at(now),
            now,
        );
        assert_eq!(word.text, "serendipity");

        let json = serde_json::to_value(&word).unwrap();
        assert_eq!(json["reviewCount"], 0);
        assert_eq!(json["nextReviewAt"], (now.timestamp_millis() + 86_400_000));
        assert_eq!(json["createdAt"], now.timestamp_millis());
        assert!(json["tagIds"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_timestamps_survive_wire_round_trip() {
        let now = Utc::now();
        let word = WordRecord::new(NewWord::new("exact"), initialize_review_params_at(now), now);
        let decoded: WordRecord =
            serde_json::from_str(&serde_json::to_string(&word).unwrap()).unwrap();
        assert_eq!(decoded, word);

        let tag = Tag::new("exact", "#fff", now).unwrap();
        let decoded: Tag = serde_json::from_str(&serde_json::to_string(&tag).unwrap()).unwrap();
        assert_eq!(decoded, tag);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let now = Utc::now();
        let word = WordRecord::new(
            NewWord::new("Ephemeral").with_meaning("Lasting a short time"),
            initialize_review_params_at(now),
            now,
        );
        assert!(word.matches("pheme"));
        assert!(word.matches("short"));
        assert!(!word.matches("long"));
    }
}
