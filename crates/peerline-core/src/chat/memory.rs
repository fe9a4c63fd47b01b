//! In-memory implementation of [`MessageLog`] and [`SessionStore`].
//!
//! Each session lives behind its own `RwLock`, so appends to one session
//! never contend with another. The `DashMap` guard is only held long enough
//! to clone the per-session `Arc`, never across an await.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use peerline_types::chat::{
    ChatMessage, ChatSession, MessageRole, MessageSource, SessionStatus, SessionType,
};
use peerline_types::error::ChatError;
use uuid::Uuid;

use super::log::{MessageLog, can_mark_read, next_timestamp, normalize_content, now_micros};
use super::store::SessionStore;

#[derive(Debug)]
struct SessionEntry {
    session: ChatSession,
    messages: Vec<ChatMessage>,
}

type Slot = Arc<RwLock<SessionEntry>>;

/// Process-local chat storage, shared by cloning.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChatStore {
    sessions: Arc<DashMap<Uuid, Slot>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, session_id: &Uuid) -> Result<Slot, ChatError> {
        self.sessions
            .get(session_id)
            .map(|r| Arc::clone(r.value()))
            .ok_or(ChatError::NotFound)
    }
}

impl MessageLog for InMemoryChatStore {
    async fn append(
        &self,
        session_id: &Uuid,
        role: MessageRole,
        source: MessageSource,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        let content = normalize_content(content)?;
        let slot = self.slot(session_id)?;
        let mut entry = slot.write().expect("session lock poisoned");

        if entry.session.status == SessionStatus::Closed {
            return Err(ChatError::SessionClosed);
        }

        let previous = entry.messages.last();
        let message = ChatMessage {
            id: previous.map_or(1, |m| m.id + 1),
            session_id: *session_id,
            role,
            source,
            content: content.to_string(),
            created_at: next_timestamp(previous.map(|m| m.created_at), entry.session.created_at),
            read_at: None,
        };
        entry.messages.push(message.clone());
        Ok(message)
    }

    async fn read_after(
        &self,
        session_id: &Uuid,
        after_id: u64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        let slot = self.slot(session_id)?;
        let entry = slot.read().expect("session lock poisoned");
        // Ids are dense from 1, so `after_id` is also the index of the next message.
        let start = usize::try_from(after_id).unwrap_or(usize::MAX);
        Ok(entry
            .messages
            .iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn latest(&self, session_id: &Uuid) -> Result<Option<ChatMessage>, ChatError> {
        let slot = self.slot(session_id)?;
        let entry = slot.read().expect("session lock poisoned");
        Ok(entry.messages.last().cloned())
    }

    async fn mark_read(
        &self,
        session_id: &Uuid,
        message_id: u64,
        reader: MessageRole,
    ) -> Result<ChatMessage, ChatError> {
        let slot = self.slot(session_id)?;
        let mut entry = slot.write().expect("session lock poisoned");
        let session_type = entry.session.session_type;
        let message = entry
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or(ChatError::NotFound)?;

        if can_mark_read(message, session_type, reader) {
            message.read_at = Some(now_micros());
        }
        Ok(message.clone())
    }
}

impl SessionStore for InMemoryChatStore {
    async fn create(
        &self,
        session_type: SessionType,
        user_id: Option<String>,
        peer_advocate_id: Option<String>,
    ) -> Result<ChatSession, ChatError> {
        if peer_advocate_id.is_some() && session_type != SessionType::Peer {
            return Err(ChatError::InvalidInput(
                "only peer sessions can have an advocate".to_string(),
            ));
        }

        let now = now_micros();
        let session = ChatSession {
            session_id: Uuid::now_v7(),
            user_id,
            session_type,
            peer_advocate_id,
            status: SessionStatus::Open,
            created_at: now,
            updated_at: now,
            last_message_at: None,
        };

        self.sessions.insert(
            session.session_id,
            Arc::new(RwLock::new(SessionEntry {
                session: session.clone(),
                messages: Vec::new(),
            })),
        );
        Ok(session)
    }

    async fn get(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        let slot = self.slot(session_id)?;
        let entry = slot.read().expect("session lock poisoned");
        Ok(entry.session.clone())
    }

    async fn close(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        let slot = self.slot(session_id)?;
        let mut entry = slot.write().expect("session lock poisoned");
        if entry.session.status == SessionStatus::Open {
            entry.session.status = SessionStatus::Closed;
            entry.session.updated_at = now_micros().max(entry.session.updated_at);
        }
        Ok(entry.session.clone())
    }

    async fn touch(&self, session_id: &Uuid, at: DateTime<Utc>) -> Result<(), ChatError> {
        let slot = self.slot(session_id)?;
        let mut entry = slot.write().expect("session lock poisoned");
        if entry.session.last_message_at.is_none_or(|last| at > last) {
            entry.session.last_message_at = Some(at);
            entry.session.updated_at = at.max(entry.session.updated_at);
        }
        Ok(())
    }

    async fn assign_advocate(
        &self,
        session_id: &Uuid,
        advocate_id: &str,
    ) -> Result<ChatSession, ChatError> {
        let slot = self.slot(session_id)?;
        let mut entry = slot.write().expect("session lock poisoned");
        let session = &mut entry.session;

        if session.session_type != SessionType::Peer {
            return Err(ChatError::InvalidInput(
                "only peer sessions can be claimed".to_string(),
            ));
        }
        match session.peer_advocate_id.as_deref() {
            Some(current) if current == advocate_id => return Ok(session.clone()),
            Some(_) => return Err(ChatError::AlreadyAssigned),
            None => {}
        }
        if session.status == SessionStatus::Closed {
            return Err(ChatError::SessionClosed);
        }

        session.peer_advocate_id = Some(advocate_id.to_string());
        session.updated_at = now_micros().max(session.updated_at);
        Ok(session.clone())
    }

    async fn list_open(&self) -> Result<Vec<ChatSession>, ChatError> {
        let mut open: Vec<ChatSession> = self
            .sessions
            .iter()
            .map(|r| Arc::clone(r.value()))
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(|slot| {
                let entry = slot.read().expect("session lock poisoned");
                entry.session.is_open().then(|| entry.session.clone())
            })
            .collect();
        open.sort_by_key(|s| (s.created_at, s.session_id));
        Ok(open)
    }
}
