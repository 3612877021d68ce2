//! Transports between isolated contexts, and the receiving context's loop
//!
//! Contexts share nothing: a request crosses as a serialized envelope and
//! comes back as a serialized response. The background context is a tokio
//! task that owns its state outright and handles one message at a time.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::dispatcher::Dispatcher;
use super::error::TransportError;

/// Carries one serialized request to another context and its reply back.
///
/// There is no timeout: if the receiving handler never finishes, neither
/// does the call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, envelope: String) -> Result<String, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn round_trip(&self, envelope: String) -> Result<String, TransportError> {
        (**self).round_trip(envelope).await
    }
}

/// Messages accepted by a context loop
#[derive(Debug)]
pub enum ContextMessage {
    /// A serialized envelope and where to send the serialized response
    Request {
        envelope: String,
        reply: oneshot::Sender<String>,
    },
    /// Stop after the messages already queued ahead of this one
    Shutdown,
}

/// Transport into a context running [`spawn_context`]
#[derive(Clone)]
pub struct ChannelTransport {
    sender: mpsc::Sender<ContextMessage>,
}

impl ChannelTransport {
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed()
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn round_trip(&self, envelope: String) -> Result<String, TransportError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(ContextMessage::Request { envelope, reply })
            .await
            .map_err(|_| TransportError::Disconnected)?;
        response.await.map_err(|_| TransportError::NoResponse)
    }
}

/// Handle to a running context
pub struct ContextHandle<S> {
    transport: ChannelTransport,
    task: JoinHandle<S>,
}

impl<S> ContextHandle<S> {
    /// A transport into this context; clone it for every sender
    pub fn transport(&self) -> ChannelTransport {
        self.transport.clone()
    }

    /// Ask the context to stop and wait for it, returning its state.
    /// Returns `None` if the context task panicked.
    pub async fn shutdown(self) -> Option<S> {
        let _ = self.transport.sender.send(ContextMessage::Shutdown).await;
        match self.task.await {
            Ok(state) => Some(state),
            Err(e) => {
                log::error!("Context task ended abnormally: {}", e);
                None
            }
        }
    }
}

/// Start a context that owns `state` and answers envelopes with `dispatcher`.
///
/// Messages are handled strictly one after another in arrival order. The loop
/// ends on [`ContextMessage::Shutdown`] or once every transport is dropped.
pub fn spawn_context<S>(state: S, dispatcher: Dispatcher<S>, capacity: usize) -> ContextHandle<S>
where
    S: Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let task = tokio::spawn(async move { context_loop(state, dispatcher, rx).await });

    ContextHandle {
        transport: ChannelTransport { sender: tx },
        task,
    }
}

async fn context_loop<S>(
    mut state: S,
    dispatcher: Dispatcher<S>,
    mut receiver: mpsc::Receiver<ContextMessage>,
) -> S {
    log::info!("Context started");

    while let Some(message) = receiver.recv().await {
        match message {
            ContextMessage::Request { envelope, reply } => {
                let response = dispatcher.dispatch(&mut state, &envelope);
                if reply.send(response).is_err() {
                    log::debug!("Sender went away before its response was ready");
                }
            }
            ContextMessage::Shutdown => {
                log::info!("Context: Shutting down");
                break;
            }
        }
    }

    state
}
