//! Broadcast of committed appends for long-polling readers.
//!
//! Built on `tokio::sync::broadcast`. Publishing with no subscribers is a
//! no-op. Notifications only say "something new exists"; readers always
//! re-read the log, so a lagged receiver loses nothing.

use tokio::sync::broadcast;
use uuid::Uuid;

/// Emitted after a message is durably appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageCommitted {
    pub session_id: Uuid,
    pub message_id: u64,
}

/// Multi-consumer notifier shared by every session.
#[derive(Clone)]
pub struct MessageNotifier {
    sender: broadcast::Sender<MessageCommitted>,
}

impl MessageNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every notification published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<MessageCommitted> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: MessageCommitted) {
        let _ = self.sender.send(event);
    }
}

impl Default for MessageNotifier {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl std::fmt::Debug for MessageNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageNotifier")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}
