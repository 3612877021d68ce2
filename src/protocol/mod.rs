//! Typed request/response messaging between isolated contexts
//!
//! This module provides:
//! - The closed set of message types with their payload and result shapes
//! - The response union and error kinds
//! - A dispatcher mapping each type to one handler
//! - An async transport abstraction and the channel-backed context loop
//! - A typed client for the sending side
//!
//! Handlers must not send messages back into their own context; they only
//! receive the context state, never a client, so this cannot deadlock.

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod transport;

pub use client::MessageClient;
pub use dispatcher::{DispatchError, Dispatcher};
pub use error::{CommandError, ErrorCode, Response, TransportError};
pub use message::*;
pub use transport::{spawn_context, ChannelTransport, ContextHandle, ContextMessage, Transport};
