//! Per-viewer delivery bookmark.
//!
//! A `DeliveryCursor` remembers the last message id a viewer has received
//! from a session. Fetching through it returns only newer messages and
//! advances the position to the newest one returned.

use futures_util::TryStreamExt;
use peerline_types::chat::ChatMessage;
use peerline_types::error::ChatError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::log::{MessageLog, since};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryCursor {
    pub session_id: Uuid,
    position: u64,
}

impl DeliveryCursor {
    /// A cursor that has seen nothing yet.
    pub fn new(session_id: Uuid) -> Self {
        Self::at(session_id, 0)
    }

    /// A cursor resumed from a client-held "last seen" id.
    pub fn at(session_id: Uuid, position: u64) -> Self {
        Self {
            session_id,
            position,
        }
    }

    /// Id of the newest message already delivered through this cursor.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Read every message after the current position and advance past them.
    ///
    /// On error the position is left unchanged, so a retry re-delivers.
    pub async fn fetch<L: MessageLog>(&mut self, log: &L) -> Result<Vec<ChatMessage>, ChatError> {
        let messages: Vec<ChatMessage> = since(log, self.session_id, self.position)
            .try_collect()
            .await?;
        self.advance(&messages);
        Ok(messages)
    }

    fn advance(&mut self, delivered: &[ChatMessage]) {
        if let Some(last) = delivered.last() {
            self.position = self.position.max(last.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::memory::InMemoryChatStore;
    use crate::chat::store::SessionStore;
    use peerline_types::chat::{MessageRole, MessageSource, SessionType};

    #[tokio::test]
    async fn fetch_returns_only_new_messages() {
        let store = InMemoryChatStore::new();
        let session = store.create(SessionType::Peer, None, None).await.unwrap();
        let mut cursor = DeliveryCursor::new(session.session_id);

        store
            .append(&session.session_id, MessageRole::User, MessageSource::Peer, "one")
            .await
            .unwrap();
        let first = cursor.fetch(&store).await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(cursor.position(), 1);

        assert!(cursor.fetch(&store).await.unwrap().is_empty());
        assert_eq!(cursor.position(), 1);

        store
            .append(&session.session_id, MessageRole::Peer, MessageSource::Peer, "two")
            .await
            .unwrap();
        let second = cursor.fetch(&store).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].content, "two");
        assert_eq!(cursor.position(), 2);
    }

    #[tokio::test]
    async fn cursors_are_independent_per_viewer() {
        let store = InMemoryChatStore::new();
        let session = store.create(SessionType::Peer, None, None).await.unwrap();
        let mut user = DeliveryCursor::new(session.session_id);
        let mut advocate = DeliveryCursor::new(session.session_id);

        store
            .append(&session.session_id, MessageRole::User, MessageSource::Peer, "hi")
            .await
            .unwrap();
        assert_eq!(user.fetch(&store).await.unwrap().len(), 1);

        store
            .append(&session.session_id, MessageRole::Peer, MessageSource::Peer, "hello")
            .await
            .unwrap();
        assert_eq!(advocate.fetch(&store).await.unwrap().len(), 2);
        assert_eq!(user.fetch(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn fetch_error_keeps_position() {
        let store = InMemoryChatStore::new();
        let mut cursor = DeliveryCursor::at(Uuid::now_v7(), 4);
        assert_eq!(cursor.fetch(&store).await.unwrap_err(), ChatError::NotFound);
        assert_eq!(cursor.position(), 4);
    }
}
