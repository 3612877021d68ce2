//! Routing of incoming envelopes to registered handlers

use std::collections::HashMap;

use serde_json::Value as JsonValue;
use thiserror::Error;

use super::error::{CommandError, ErrorCode, Response};
use super::message::{Command, Envelope, MessageType};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DispatchError {
    #[error("A handler is already registered for {0}")]
    AlreadyRegistered(MessageType),
}

type ErasedHandler<S> =
    Box<dyn Fn(&mut S, JsonValue) -> Result<JsonValue, CommandError> + Send + Sync>;

/// Maps each message type to exactly one handler over context state `S`.
///
/// Handlers run synchronously against `&mut S` and never yield, so each one
/// observes and writes state without interleaving with other messages.
pub struct Dispatcher<S> {
    handlers: HashMap<MessageType, ErasedHandler<S>>,
}

impl<S> Default for Dispatcher<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Dispatcher<S> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for `C`. A second registration for the same
    /// message type is rejected.
    pub fn register<C, F>(&mut self, handler: F) -> Result<&mut Self, DispatchError>
    where
        C: Command,
        F: Fn(&mut S, C) -> Result<C::Output, CommandError> + Send + Sync + 'static,
    {
        if self.handlers.contains_key(&C::TYPE) {
            return Err(DispatchError::AlreadyRegistered(C::TYPE));
        }

        let erased: ErasedHandler<S> = Box::new(move |state, payload| {
            let command: C = serde_json::from_value(payload).map_err(|e| {
                CommandError::validation(format!("Invalid payload for {}: {}", C::TYPE, e))
            })?;
            let output = handler(state, command)?;
            serde_json::to_value(output).map_err(|e| {
                CommandError::transport(format!("Failed to encode {} result: {}", C::TYPE, e))
            })
        });

        self.handlers.insert(C::TYPE, erased);
        Ok(self)
    }

    pub fn is_registered(&self, message_type: MessageType) -> bool {
        self.handlers.contains_key(&message_type)
    }

    /// Message types that have no handler yet
    pub fn missing(&self) -> Vec<MessageType> {
        MessageType::ALL
            .iter()
            .copied()
            .filter(|t| !self.is_registered(*t))
            .collect()
    }

    /// Handle a decoded envelope, always producing a response
    pub fn dispatch_envelope(&self, state: &mut S, envelope: Envelope) -> Response<JsonValue> {
        let handler = envelope
            .message_type
            .parse::<MessageType>()
            .ok()
            .and_then(|t| self.handlers.get(&t));

        let Some(handler) = handler else {
            log::warn!("No handler registered for {}", envelope.message_type);
            return Response::Failure(CommandError::new(
                ErrorCode::HandlerNotFound,
                format!("No handler registered for '{}'", envelope.message_type),
            ));
        };

        let result = handler(state, envelope.payload);
        if let Err(e) = &result {
            log::debug!("{} failed: {}", envelope.message_type, e);
        }
        result.into()
    }

    /// Handle a serialized envelope and return the serialized response
    pub fn dispatch(&self, state: &mut S, raw: &str) -> String {
        let response = match serde_json::from_str::<Envelope>(raw) {
            Ok(envelope) => self.dispatch_envelope(state, envelope),
            Err(e) => Response::Failure(CommandError::validation(format!(
                "Malformed envelope: {}",
                e
            ))),
        };

        // Serializing a JsonValue only fails on non-string map keys
        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(
                r#"{{"success":false,"error":{{"code":"TRANSPORT_ERROR","message":"{}"}}}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::message::{DeleteWord, GetDueCount, GetWords};
    use uuid::Uuid;

    #[derive(Default)]
    struct Counter {
        calls: usize,
    }

    fn count_handler(state: &mut Counter, _: GetDueCount) -> Result<usize, CommandError> {
        state.calls += 1;
        Ok(state.calls)
    }

    fn decode<T: serde::de::DeserializeOwned>(raw: &str) -> Response<T> {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_dispatch_registered() {
        let mut dispatcher = Dispatcher::<Counter>::new();
        dispatcher.register(count_handler).unwrap();

        let mut state = Counter::default();
        let raw = dispatcher.dispatch(&mut state, r#"{"type":"GET_DUE_COUNT","payload":null}"#);
        assert_eq!(decode::<usize>(&raw), Response::Success(1));
        assert_eq!(state.calls, 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut dispatcher = Dispatcher::<Counter>::new();
        dispatcher.register(count_handler).unwrap();
        let second = dispatcher.register(|_: &mut Counter, _: GetDueCount| Ok(0));
        assert_eq!(
            second.err(),
            Some(DispatchError::AlreadyRegistered(MessageType::GetDueCount))
        );
    }

    #[test]
    fn test_unregistered_type_is_handler_not_found() {
        let mut dispatcher = Dispatcher::<Counter>::new();
        dispatcher.register(count_handler).unwrap();
        let mut state = Counter::default();

        // Known type without a handler
        let raw = dispatcher.dispatch(&mut state, r#"{"type":"GET_WORDS","payload":{}}"#);
        let error = decode::<Vec<String>>(&raw).into_result().unwrap_err();
        assert_eq!(error.code, ErrorCode::HandlerNotFound);

        // Type outside the enumeration
        let raw = dispatcher.dispatch(&mut state, r#"{"type":"MAKE_COFFEE"}"#);
        let error = decode::<bool>(&raw).into_result().unwrap_err();
        assert_eq!(error.code, ErrorCode::HandlerNotFound);
        assert_eq!(state.calls, 0);
    }

    #[test]
    fn test_bad_payload_is_validation_error() {
        let mut dispatcher = Dispatcher::<Counter>::new();
        dispatcher
            .register(|_: &mut Counter, _: DeleteWord| Ok(true))
            .unwrap();
        let mut state = Counter::default();

        let raw = dispatcher.dispatch(&mut state, r#"{"type":"DELETE_WORD","payload":{"id":7}}"#);
        let error = decode::<bool>(&raw).into_result().unwrap_err();
        assert_eq!(error.code, ErrorCode::ValidationError);

        let raw = dispatcher.dispatch(&mut state, "not json");
        let error = decode::<bool>(&raw).into_result().unwrap_err();
        assert_eq!(error.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_handler_error_passes_through() {
        let mut dispatcher = Dispatcher::<Counter>::new();
        dispatcher
            .register(|_: &mut Counter, cmd: DeleteWord| -> Result<bool, CommandError> {
                Err(CommandError::new(ErrorCode::NotFound, format!("{} missing", cmd.id)))
            })
            .unwrap();
        let mut state = Counter::default();

        let envelope = Envelope::for_command(&DeleteWord { id: Uuid::new_v4() }).unwrap();
        let response = dispatcher.dispatch_envelope(&mut state, envelope);
        assert_eq!(response.into_result().unwrap_err().code, ErrorCode::NotFound);
    }

    #[test]
    fn test_missing_lists_unhandled_types() {
        let mut dispatcher = Dispatcher::<Counter>::new();
        assert_eq!(dispatcher.missing().len(), MessageType::ALL.len());
        dispatcher
            .register(|_: &mut Counter, _: GetWords| Ok(Vec::new()))
            .unwrap();
        assert!(!dispatcher.missing().contains(&MessageType::GetWords));
    }
}
