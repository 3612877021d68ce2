//! UI-side consumers of the message protocol
//!
//! Both consumers issue repeated requests whose responses can arrive out of
//! order, so both tag each request with an id from a [`RequestSequence`] and
//! only apply the response if no newer request was issued since.

pub mod badge;
pub mod search;

use std::sync::atomic::{AtomicU64, Ordering};

pub use badge::DueBadge;
pub use search::{SearchController, SearchView, DEFAULT_DEBOUNCE};

/// Monotonic request ids for a latest-wins staleness guard
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new id, making every earlier id stale
    pub fn next(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, id: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == id
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A transport that parks every request until the test answers it

    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde::Serialize;
    use tokio::sync::oneshot;

    use crate::protocol::{Envelope, Response, Transport, TransportError};

    pub struct PendingRequest {
        pub envelope: Envelope,
        reply: oneshot::Sender<String>,
    }

    impl PendingRequest {
        pub fn search_query(&self) -> Option<String> {
            self.envelope
                .payload
                .get("searchQuery")
                .and_then(|q| q.as_str())
                .map(str::to_string)
        }

        pub fn respond<T: Serialize>(self, response: Response<T>) {
            let raw = serde_json::to_string(&response).unwrap();
            let _ = self.reply.send(raw);
        }
    }

    #[derive(Default)]
    pub struct ScriptedTransport {
        pending: Mutex<Vec<PendingRequest>>,
    }

    impl ScriptedTransport {
        /// Remove and return every request received so far, oldest first
        pub fn take(&self) -> Vec<PendingRequest> {
            std::mem::take(&mut *self.pending.lock().unwrap())
        }

        pub fn len(&self) -> usize {
            self.pending.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn round_trip(&self, envelope: String) -> Result<String, TransportError> {
            let (reply, response) = oneshot::channel();
            let envelope = serde_json::from_str(&envelope).map_err(TransportError::Decode)?;
            self.pending
                .lock()
                .unwrap()
                .push(PendingRequest { envelope, reply });
            response.await.map_err(|_| TransportError::NoResponse)
        }
    }

    /// Let spawned tasks run until they block; time auto-advances when paused
    pub async fn settle() {
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_id_is_current() {
        let sequence = RequestSequence::new();
        let first = sequence.next();
        assert!(sequence.is_current(first));

        let second = sequence.next();
        assert!(second > first);
        assert!(!sequence.is_current(first));
        assert!(sequence.is_current(second));
    }
}
