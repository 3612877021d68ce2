//! Typed sending side of the protocol

use std::sync::Arc;

use super::error::{CommandError, Response, TransportError};
use super::message::{Command, Envelope};
use super::transport::Transport;

/// Sends typed commands to another context.
///
/// Cheap to clone; every clone shares the same transport. Responses to
/// concurrent calls may complete in any order.
#[derive(Clone)]
pub struct MessageClient {
    transport: Arc<dyn Transport>,
}

impl MessageClient {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn from_shared(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send a command, keeping transport failures separate from handler
    /// failures
    pub async fn try_send<C: Command>(
        &self,
        command: C,
    ) -> Result<Response<C::Output>, TransportError> {
        let envelope = Envelope::for_command(&command).map_err(TransportError::Encode)?;
        let raw = serde_json::to_string(&envelope).map_err(TransportError::Encode)?;

        let reply = self.transport.round_trip(raw).await?;
        serde_json::from_str(&reply).map_err(TransportError::Decode)
    }

    /// Send a command. Transport failures come back as a `TRANSPORT_ERROR`
    /// failure, so callers handle a single shape.
    pub async fn send<C: Command>(&self, command: C) -> Response<C::Output> {
        match self.try_send(command).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("{} could not be delivered: {}", C::TYPE, e);
                Response::Failure(CommandError::from(e))
            }
        }
    }
}
