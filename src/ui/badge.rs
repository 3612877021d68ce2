//! Due-word badge shown on the extension icon

use std::sync::atomic::{AtomicUsize, Ordering};

use super::RequestSequence;
use crate::protocol::{GetDueCount, MessageClient, Response};

/// Counts above this are shown as "99+"
pub const MAX_BADGE_COUNT: usize = 99;

pub struct DueBadge {
    client: MessageClient,
    sequence: RequestSequence,
    count: AtomicUsize,
}

impl DueBadge {
    pub fn new(client: MessageClient) -> Self {
        Self {
            client,
            sequence: RequestSequence::new(),
            count: AtomicUsize::new(0),
        }
    }

    /// Create a badge and load its first count
    pub async fn mount(client: MessageClient) -> Self {
        let badge = Self::new(client);
        badge.refresh().await;
        badge
    }

    /// Ask the background context for the due count.
    ///
    /// A failed request is treated as zero due words. Returns the count now
    /// shown, which is unchanged if a newer refresh overtook this one.
    pub async fn refresh(&self) -> usize {
        let request_id = self.sequence.next();

        let due = match self.client.send(GetDueCount).await {
            Response::Success(count) => count,
            Response::Failure(error) => {
                log::warn!("Could not load due count, showing none: {}", error);
                0
            }
        };

        if self.sequence.is_current(request_id) {
            self.count.store(due, Ordering::SeqCst);
        }
        self.count()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Badge text, or `None` when nothing is due and the badge is hidden
    pub fn label(&self) -> Option<String> {
        badge_label(self.count())
    }
}

pub fn badge_label(count: usize) -> Option<String> {
    match count {
        0 => None,
        n if n > MAX_BADGE_COUNT => Some(format!("{}+", MAX_BADGE_COUNT)),
        n => Some(n.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::testing::{settle, ScriptedTransport};
    use crate::words::NewWord;
    use crate::{Background, BackgroundState};
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_badge_label() {
        assert_eq!(badge_label(0), None);
        assert_eq!(badge_label(7).as_deref(), Some("7"));
        assert_eq!(badge_label(99).as_deref(), Some("99"));
        assert_eq!(badge_label(100).as_deref(), Some("99+"));
    }

    #[tokio::test]
    async fn test_mount_shows_due_words() {
        let temp = TempDir::new().unwrap();
        let mut state = BackgroundState::open(temp.path().to_path_buf()).unwrap();
        let week_ago = Utc::now() - Duration::days(7);
        for text in ["ephemeral", "laconic", "sonder"] {
            state.words.save_word(NewWord::new(text), week_ago).unwrap();
        }
        state.words.save_word(NewWord::new("fresh"), Utc::now()).unwrap();

        let background = Background::start(state, 8).unwrap();
        let badge = DueBadge::mount(background.client()).await;

        assert_eq!(badge.count(), 3);
        assert_eq!(badge.label().as_deref(), Some("3"));
        background.shutdown().await;
    }

    #[tokio::test]
    async fn test_unreachable_background_shows_nothing() {
        let temp = TempDir::new().unwrap();
        let state = BackgroundState::open(temp.path().to_path_buf()).unwrap();
        let background = Background::start(state, 8).unwrap();
        let client = background.client();
        background.shutdown().await;

        let badge = DueBadge::mount(client).await;
        assert_eq!(badge.count(), 0);
        assert_eq!(badge.label(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_refresh_is_ignored() {
        let script = Arc::new(ScriptedTransport::default());
        let badge = Arc::new(DueBadge::new(MessageClient::from_shared(script.clone())));

        let older = tokio::spawn({
            let badge = Arc::clone(&badge);
            async move { badge.refresh().await }
        });
        settle().await;
        let newer = tokio::spawn({
            let badge = Arc::clone(&badge);
            async move { badge.refresh().await }
        });
        settle().await;

        let mut requests = script.take();
        assert_eq!(requests.len(), 2);
        let second = requests.pop().unwrap();
        let first = requests.pop().unwrap();

        second.respond(Response::Success(5usize));
        assert_eq!(newer.await.unwrap(), 5);

        first.respond(Response::Success(40usize));
        assert_eq!(older.await.unwrap(), 5);
        assert_eq!(badge.count(), 5);
    }
}
