//! Error kinds and the response union carried across contexts

use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::settings::SettingsError;
use crate::words::StoreError;

/// Closed set of failure kinds visible to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The referenced id does not exist
    NotFound,
    /// Persistence failed underneath a handler
    StorageError,
    /// Malformed payload or invalid field value
    ValidationError,
    /// The source page could not be reached to locate a word
    PageInaccessible,
    /// No handler is registered for the message type
    HandlerNotFound,
    /// The receiving context could not be reached
    TransportError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "NOT_FOUND",
            Self::StorageError => "STORAGE_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::PageInaccessible => "PAGE_INACCESSIBLE",
            Self::HandlerNotFound => "HANDLER_NOT_FOUND",
            Self::TransportError => "TRANSPORT_ERROR",
        };
        f.write_str(s)
    }
}

/// Error body of a failed response, also the error type handlers return
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TransportError, message)
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::WordNotFound(_) | StoreError::TagNotFound(_) => ErrorCode::NotFound,
            StoreError::Validation(_) => ErrorCode::ValidationError,
            StoreError::Io(_) | StoreError::Json(_) => ErrorCode::StorageError,
        };
        Self::new(code, err.to_string())
    }
}

impl From<SettingsError> for CommandError {
    fn from(err: SettingsError) -> Self {
        let code = match &err {
            SettingsError::Invalid(_) => ErrorCode::ValidationError,
            SettingsError::Io(_) | SettingsError::Json(_) => ErrorCode::StorageError,
        };
        Self::new(code, err.to_string())
    }
}

/// Failures of the transport itself, as opposed to handler failures
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Receiving context is gone")]
    Disconnected,

    #[error("Receiving context dropped the request without replying")]
    NoResponse,

    #[error("Failed to encode request: {0}")]
    Encode(serde_json::Error),

    #[error("Failed to decode response: {0}")]
    Decode(serde_json::Error),
}

impl From<TransportError> for CommandError {
    fn from(err: TransportError) -> Self {
        Self::transport(err.to_string())
    }
}

/// Outcome of one request.
///
/// On the wire this is `{"success": true, "data": ...}` or
/// `{"success": false, "error": {"code": ..., "message": ...}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Response<T> {
    Success(T),
    Failure(CommandError),
}

impl<T> Response<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn into_result(self) -> Result<T, CommandError> {
        match self {
            Self::Success(data) => Ok(data),
            Self::Failure(error) => Err(error),
        }
    }

    pub fn ok(self) -> Option<T> {
        self.into_result().ok()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        match self {
            Self::Success(data) => Response::Success(f(data)),
            Self::Failure(error) => Response::Failure(error),
        }
    }
}

impl<T> From<Result<T, CommandError>> for Response<T> {
    fn from(result: Result<T, CommandError>) -> Self {
        match result {
            Ok(data) => Self::Success(data),
            Err(error) => Self::Failure(error),
        }
    }
}

impl<T: Serialize> Serialize for Response<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Response", 2)?;
        match self {
            Self::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            Self::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
struct RawResponse<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<CommandError>,
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Response<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawResponse::<T>::deserialize(deserializer)?;
        match (raw.success, raw.data, raw.error) {
            (true, Some(data), _) => Ok(Self::Success(data)),
            (true, None, _) => Err(de::Error::missing_field("data")),
            (false, _, Some(error)) => Ok(Self::Failure(error)),
            (false, _, None) => Err(de::Error::missing_field("error")),
        }
    }
}
