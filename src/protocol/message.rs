//! Message types, their payloads and their result shapes
//!
//! Every message type is declared exactly once in the `message_types!` table
//! below, next to the payload struct it carries and the type its handler
//! returns. A type without a payload and result cannot be declared.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::review::ReviewOutcome;
use crate::settings::{Settings, SettingsUpdate};
use crate::words::{NewWord, ReviewStats, Tag, WordRecord, WordUpdate};

/// A typed request. Implemented only through `message_types!`.
pub trait Command: Serialize + DeserializeOwned + Send + 'static {
    const TYPE: MessageType;
    type Output: Serialize + DeserializeOwned + Send + 'static;
}

macro_rules! message_types {
    ($( $(#[$doc:meta])* $name:ident => $wire:literal : $output:ty; )+) => {
        /// Closed set of message types understood by the background context
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum MessageType {
            $( $(#[$doc])* #[serde(rename = $wire)] $name, )+
        }

        impl MessageType {
            pub const ALL: &'static [MessageType] = &[$(MessageType::$name),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(MessageType::$name => $wire,)+
                }
            }
        }

        impl FromStr for MessageType {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(MessageType::$name),)+
                    other => Err(format!("unknown message type '{}'", other)),
                }
            }
        }

        $(
            impl Command for $name {
                const TYPE: MessageType = MessageType::$name;
                type Output = $output;
            }
        )+
    };
}

message_types! {
    /// Every word, optionally filtered
    GetWords => "GET_WORDS": Vec<WordRecord>;
    GetWord => "GET_WORD": WordRecord;
    SaveWord => "SAVE_WORD": WordRecord;
    /// Words whose review time has passed
    GetDueWords => "GET_DUE_WORDS": Vec<WordRecord>;
    GetDueCount => "GET_DUE_COUNT": usize;
    UpdateWord => "UPDATE_WORD": bool;
    DeleteWord => "DELETE_WORD": bool;
    /// Record a review outcome and reschedule
    ReviewWord => "REVIEW_WORD": bool;
    GetReviewStats => "GET_REVIEW_STATS": ReviewStats;
    GetTags => "GET_TAGS": Vec<Tag>;
    CreateTag => "CREATE_TAG": Tag;
    UpdateTag => "UPDATE_TAG": Tag;
    /// Delete a tag and detach it from every word
    DeleteTag => "DELETE_TAG": bool;
    /// Replace a word's tags
    SetWordTags => "SET_WORD_TAGS": bool;
    /// Merge tags into a word's existing tags
    AddWordTags => "ADD_WORD_TAGS": bool;
    GetSettings => "GET_SETTINGS": Settings;
    UpdateSettings => "UPDATE_SETTINGS": Settings;
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Payloads ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetWords {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

impl GetWords {
    pub fn all() -> Self {
        Self { search_query: None }
    }

    pub fn matching(query: impl Into<String>) -> Self {
        Self {
            search_query: Some(query.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetWord {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveWord(pub NewWord);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDueWords;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetDueCount;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateWord {
    pub id: Uuid,
    pub updates: WordUpdate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteWord {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWord {
    pub word_id: Uuid,
    pub result: ReviewOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetReviewStats;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTags;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTag {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTag {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTag {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetWordTags {
    pub word_id: Uuid,
    pub tag_ids: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddWordTags {
    pub word_id: Uuid,
    pub tag_ids: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSettings(pub SettingsUpdate);

// ==================== Envelope ====================

/// What actually crosses a context boundary.
///
/// The type is kept as a raw string so the receiver can answer unknown types
/// with a structured error instead of failing to parse. Payload-less
/// messages carry `null` (or omit `payload`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub payload: JsonValue,
}

impl Envelope {
    pub fn for_command<C: Command>(command: &C) -> Result<Self, serde_json::Error> {
        Ok(Self {
            message_type: C::TYPE.as_str().to_string(),
            payload: serde_json::to_value(command)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_round_trip() {
        for message_type in MessageType::ALL {
            let parsed: MessageType = message_type.as_str().parse().unwrap();
            assert_eq!(parsed, *message_type);

            let json = serde_json::to_value(message_type).unwrap();
            assert_eq!(json, serde_json::json!(message_type.as_str()));
        }
        assert!("FLY_TO_MOON".parse::<MessageType>().is_err());
    }

    #[test]
    fn test_envelope_shapes() {
        let envelope = Envelope::for_command(&GetWords::matching("cat")).unwrap();
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            serde_json::json!({ "type": "GET_WORDS", "payload": { "searchQuery": "cat" } })
        );

        let envelope = Envelope::for_command(&GetDueCount).unwrap();
        assert_eq!(envelope.message_type, "GET_DUE_COUNT");
        assert!(envelope.payload.is_null());

        let id = Uuid::new_v4();
        let envelope = Envelope::for_command(&ReviewWord {
            word_id: id,
            result: ReviewOutcome::Forgotten,
        })
        .unwrap();
        assert_eq!(
            envelope.payload,
            serde_json::json!({ "wordId": id.to_string(), "result": "forgotten" })
        );
    }

    #[test]
    fn test_envelope_without_payload() {
        let envelope: Envelope = serde_json::from_str(r#"{"type":"GET_TAGS"}"#).unwrap();
        assert!(envelope.payload.is_null());
        assert!(serde_json::from_value::<GetTags>(envelope.payload).is_ok());
    }
}
