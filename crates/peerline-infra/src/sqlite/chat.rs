//! SQLite chat repository implementation.
//!
//! Implements `MessageLog` and `SessionStore` from `peerline-core` using sqlx
//! with split read/write pools: raw queries, private Row structs, reads on the
//! reader pool, writes on the single-connection writer pool.
//!
//! An append is one writer transaction (status check, highest-seq read,
//! insert), so id assignment and insert commit or roll back together.

use chrono::{DateTime, SecondsFormat, Utc};
use peerline_core::chat::log::{
    MessageLog, can_mark_read, next_timestamp, normalize_content, now_micros,
};
use peerline_core::chat::store::SessionStore;
use peerline_types::chat::{
    ChatMessage, ChatSession, MessageRole, MessageSource, SessionStatus, SessionType,
};
use peerline_types::error::{ChatError, RepositoryError};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageLog` and `SessionStore`.
#[derive(Clone)]
pub struct SqliteChatRepository {
    pool: DatabasePool,
}

impl SqliteChatRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn fetch_session(&self, session_id: &Uuid) -> Result<Option<ChatSession>, ChatError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|row| {
            ChatSessionRow::from_row(&row)
                .map_err(query_err)?
                .into_session()
        })
        .transpose()
    }

    async fn fetch_message(
        &self,
        session_id: &Uuid,
        message_id: u64,
    ) -> Result<Option<ChatMessage>, ChatError> {
        let row = sqlx::query("SELECT * FROM chat_messages WHERE session_id = ? AND seq = ?")
            .bind(session_id.to_string())
            .bind(message_id as i64)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.map(|row| {
            ChatMessageRow::from_row(&row)
                .map_err(query_err)?
                .into_message()
        })
        .transpose()
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain ChatSession.
struct ChatSessionRow {
    id: String,
    user_id: Option<String>,
    session_type: String,
    peer_advocate_id: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
    last_message_at: Option<String>,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            session_type: row.try_get("session_type")?,
            peer_advocate_id: row.try_get("peer_advocate_id")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            last_message_at: row.try_get("last_message_at")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, ChatError> {
        let session_id = Uuid::parse_str(&self.id)
            .map_err(|e| invalid_row(format!("invalid session id: {e}")))?;
        let session_type: SessionType = self.session_type.parse().map_err(invalid_row)?;
        let status: SessionStatus = self.status.parse().map_err(invalid_row)?;

        Ok(ChatSession {
            session_id,
            user_id: self.user_id,
            session_type,
            peer_advocate_id: self.peer_advocate_id,
            status,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            last_message_at: self
                .last_message_at
                .as_deref()
                .map(parse_datetime)
                .transpose()?,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain ChatMessage.
struct ChatMessageRow {
    session_id: String,
    seq: i64,
    role: String,
    source: String,
    content: String,
    created_at: String,
    read_at: Option<String>,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            session_id: row.try_get("session_id")?,
            seq: row.try_get("seq")?,
            role: row.try_get("role")?,
            source: row.try_get("source")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            read_at: row.try_get("read_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, ChatError> {
        let session_id = Uuid::parse_str(&self.session_id)
            .map_err(|e| invalid_row(format!("invalid session_id: {e}")))?;
        let role: MessageRole = self.role.parse().map_err(invalid_row)?;
        let source: MessageSource = self.source.parse().map_err(invalid_row)?;

        Ok(ChatMessage {
            id: self.seq as u64,
            session_id,
            role,
            source,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
            read_at: self.read_at.as_deref().map(parse_datetime).transpose()?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn query_err(e: sqlx::Error) -> ChatError {
    RepositoryError::Query(e.to_string()).into()
}

fn invalid_row(msg: String) -> ChatError {
    RepositoryError::Query(msg).into()
}

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, ChatError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| invalid_row(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so string comparison in SQL is chronological.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// MessageLog implementation
// ---------------------------------------------------------------------------

impl MessageLog for SqliteChatRepository {
    async fn append(
        &self,
        session_id: &Uuid,
        role: MessageRole,
        source: MessageSource,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        let content = normalize_content(content)?;
        let sid = session_id.to_string();

        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let session_row = sqlx::query("SELECT status, created_at FROM chat_sessions WHERE id = ?")
            .bind(&sid)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_err)?
            .ok_or(ChatError::NotFound)?;

        let status: String = session_row.try_get("status").map_err(query_err)?;
        if status.parse::<SessionStatus>().map_err(invalid_row)? == SessionStatus::Closed {
            return Err(ChatError::SessionClosed);
        }
        let session_created: String = session_row.try_get("created_at").map_err(query_err)?;

        let last = sqlx::query(
            "SELECT seq, created_at FROM chat_messages WHERE session_id = ? ORDER BY seq DESC LIMIT 1",
        )
        .bind(&sid)
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_err)?;

        let (previous_seq, previous_at) = match last {
            Some(row) => {
                let seq: i64 = row.try_get("seq").map_err(query_err)?;
                let at: String = row.try_get("created_at").map_err(query_err)?;
                (seq as u64, Some(parse_datetime(&at)?))
            }
            None => (0, None),
        };

        let message = ChatMessage {
            id: previous_seq + 1,
            session_id: *session_id,
            role,
            source,
            content: content.to_string(),
            created_at: next_timestamp(previous_at, parse_datetime(&session_created)?),
            read_at: None,
        };

        sqlx::query(
            r#"INSERT INTO chat_messages (session_id, seq, role, source, content, created_at, read_at)
               VALUES (?, ?, ?, ?, ?, ?, NULL)"#,
        )
        .bind(&sid)
        .bind(message.id as i64)
        .bind(message.role.to_string())
        .bind(message.source.to_string())
        .bind(&message.content)
        .bind(format_datetime(&message.created_at))
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        tx.commit().await.map_err(query_err)?;

        Ok(message)
    }

    async fn read_after(
        &self,
        session_id: &Uuid,
        after_id: u64,
        limit: usize,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        if self.fetch_session(session_id).await?.is_none() {
            return Err(ChatError::NotFound);
        }

        let rows = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? AND seq > ? ORDER BY seq ASC LIMIT ?",
        )
        .bind(session_id.to_string())
        .bind(after_id.min(i64::MAX as u64) as i64)
        .bind(limit.min(i64::MAX as usize) as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row).map_err(query_err)?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn latest(&self, session_id: &Uuid) -> Result<Option<ChatMessage>, ChatError> {
        let row = sqlx::query(
            "SELECT * FROM chat_messages WHERE session_id = ? ORDER BY seq DESC LIMIT 1",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_err)?;

        row.map(|row| ChatMessageRow::from_row(&row).map_err(query_err)?.into_message())
            .transpose()
    }

    async fn mark_read(
        &self,
        session_id: &Uuid,
        message_id: u64,
        reader: MessageRole,
    ) -> Result<ChatMessage, ChatError> {
        let session_type = self
            .fetch_session(session_id)
            .await?
            .ok_or(ChatError::NotFound)?
            .session_type;
        let message = self
            .fetch_message(session_id, message_id)
            .await?
            .ok_or(ChatError::NotFound)?;

        if !can_mark_read(&message, session_type, reader) {
            return Ok(message);
        }

        // `read_at IS NULL` keeps a racing reader from resetting the first receipt.
        sqlx::query(
            r#"UPDATE chat_messages SET read_at = ?
               WHERE session_id = ? AND seq = ? AND read_at IS NULL"#,
        )
        .bind(format_datetime(&now_micros()))
        .bind(session_id.to_string())
        .bind(message_id as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        self.fetch_message(session_id, message_id)
            .await?
            .ok_or(ChatError::NotFound)
    }
}

// ---------------------------------------------------------------------------
// SessionStore implementation
// ---------------------------------------------------------------------------

impl SessionStore for SqliteChatRepository {
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

        sqlx::query(
            r#"INSERT INTO chat_sessions (id, user_id, session_type, peer_advocate_id, status, created_at, updated_at, last_message_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, NULL)"#,
        )
        .bind(session.session_id.to_string())
        .bind(&session.user_id)
        .bind(session.session_type.to_string())
        .bind(&session.peer_advocate_id)
        .bind(session.status.to_string())
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.updated_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        Ok(session)
    }

    async fn get(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        self.fetch_session(session_id)
            .await?
            .ok_or(ChatError::NotFound)
    }

    async fn close(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        sqlx::query(
            r#"UPDATE chat_sessions SET status = 'closed', updated_at = MAX(updated_at, ?)
               WHERE id = ? AND status = 'open'"#,
        )
        .bind(format_datetime(&now_micros()))
        .bind(session_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        // Zero rows affected means either already closed or missing; the read decides.
        self.get(session_id).await
    }

    async fn touch(&self, session_id: &Uuid, at: DateTime<Utc>) -> Result<(), ChatError> {
        let at = format_datetime(&at);
        let result = sqlx::query(
            r#"UPDATE chat_sessions
               SET last_message_at = ?1, updated_at = MAX(updated_at, ?1)
               WHERE id = ?2 AND (last_message_at IS NULL OR last_message_at < ?1)"#,
        )
        .bind(&at)
        .bind(session_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 && self.fetch_session(session_id).await?.is_none() {
            return Err(ChatError::NotFound);
        }
        Ok(())
    }

    async fn assign_advocate(
        &self,
        session_id: &Uuid,
        advocate_id: &str,
    ) -> Result<ChatSession, ChatError> {
        let session = self.get(session_id).await?;

        if session.session_type != SessionType::Peer {
            return Err(ChatError::InvalidInput(
                "only peer sessions can be claimed".to_string(),
            ));
        }
        match session.peer_advocate_id.as_deref() {
            Some(current) if current == advocate_id => return Ok(session),
            Some(_) => return Err(ChatError::AlreadyAssigned),
            None => {}
        }
        if !session.is_open() {
            return Err(ChatError::SessionClosed);
        }

        let result = sqlx::query(
            r#"UPDATE chat_sessions SET peer_advocate_id = ?, updated_at = MAX(updated_at, ?)
               WHERE id = ? AND peer_advocate_id IS NULL AND status = 'open'"#,
        )
        .bind(advocate_id)
        .bind(format_datetime(&now_micros()))
        .bind(session_id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        let updated = self.get(session_id).await?;
        if result.rows_affected() == 0 {
            // Lost a race with another claim or a close.
            return match updated.peer_advocate_id.as_deref() {
                Some(current) if current == advocate_id => Ok(updated),
                Some(_) => Err(ChatError::AlreadyAssigned),
                None => Err(ChatError::SessionClosed),
            };
        }
        Ok(updated)
    }

    async fn list_open(&self) -> Result<Vec<ChatSession>, ChatError> {
        let rows = sqlx::query(
            "SELECT * FROM chat_sessions WHERE status = 'open' ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row = ChatSessionRow::from_row(row).map_err(query_err)?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_support::test_pool;
    use futures_util::TryStreamExt;
    use peerline_core::chat::log::since;

    async fn repo_with_session(session_type: SessionType) -> (SqliteChatRepository, ChatSession) {
        let repo = SqliteChatRepository::new(test_pool().await);
        let session = repo.create(session_type, None, None).await.unwrap();
        (repo, session)
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let repo = SqliteChatRepository::new(test_pool().await);

        let created = repo
            .create(SessionType::Peer, Some("u-42".to_string()), Some("A1".to_string()))
            .await
            .unwrap();
        assert_eq!(created.status, SessionStatus::Open);
        assert_eq!(created.created_at, created.updated_at);

        let found = repo.get(&created.session_id).await.unwrap();
        assert_eq!(found, created);
        assert_eq!(found.user_id.as_deref(), Some("u-42"));
        assert_eq!(found.peer_advocate_id.as_deref(), Some("A1"));
        assert!(found.last_message_at.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_session_is_not_found() {
        let repo = SqliteChatRepository::new(test_pool().await);
        assert_eq!(repo.get(&Uuid::now_v7()).await.unwrap_err(), ChatError::NotFound);
    }

    #[tokio::test]
    async fn test_agent_session_rejects_advocate() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let err = repo
            .create(SessionType::Agent, None, Some("A1".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_append_and_read_in_order() {
        let (repo, session) = repo_with_session(SessionType::Peer).await;

        let first = repo
            .append(&session.session_id, MessageRole::User, MessageSource::Peer, "  Hello ")
            .await
            .unwrap();
        let second = repo
            .append(&session.session_id, MessageRole::Peer, MessageSource::Peer, "Hi, how can I help?")
            .await
            .unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(first.content, "Hello");
        assert_eq!(second.id, 2);
        assert!(second.created_at > first.created_at);
        assert!(first.created_at >= session.created_at);

        let messages: Vec<ChatMessage> = since(&repo, session.session_id, 0)
            .try_collect()
            .await
            .unwrap();
        assert_eq!(messages, vec![first.clone(), second.clone()]);

        let after_first = repo.read_after(&session.session_id, 1, 10).await.unwrap();
        assert_eq!(after_first, vec![second.clone()]);
        assert_eq!(repo.latest(&session.session_id).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_append_to_closed_session_fails() {
        let (repo, session) = repo_with_session(SessionType::Peer).await;
        repo.append(&session.session_id, MessageRole::User, MessageSource::Peer, "one")
            .await
            .unwrap();

        repo.close(&session.session_id).await.unwrap();
        let err = repo
            .append(&session.session_id, MessageRole::User, MessageSource::Peer, "two")
            .await
            .unwrap_err();
        assert_eq!(err, ChatError::SessionClosed);

        let messages = repo.read_after(&session.session_id, 0, 10).await.unwrap();
        assert_eq!(messages.len(), 1);
    }

    #[tokio::test]
    async fn test_append_rejects_blank_and_unknown() {
        let (repo, session) = repo_with_session(SessionType::Peer).await;
        let blank = repo
            .append(&session.session_id, MessageRole::User, MessageSource::Peer, "\n\t ")
            .await
            .unwrap_err();
        assert_eq!(blank, ChatError::EmptyContent);

        let missing = repo
            .append(&Uuid::now_v7(), MessageRole::User, MessageSource::Peer, "hi")
            .await
            .unwrap_err();
        assert_eq!(missing, ChatError::NotFound);

        let read_missing = repo.read_after(&Uuid::now_v7(), 0, 10).await.unwrap_err();
        assert_eq!(read_missing, ChatError::NotFound);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_serialized() {
        let (repo, session) = repo_with_session(SessionType::Peer).await;

        let mut handles = Vec::new();
        for i in 0..20 {
            let repo = repo.clone();
            let sid = session.session_id;
            handles.push(tokio::spawn(async move {
                repo.append(&sid, MessageRole::User, MessageSource::Peer, &format!("m{i}"))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let messages: Vec<ChatMessage> = since(&repo, session.session_id, 0)
            .try_collect()
            .await
            .unwrap();
        let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
        assert!(messages.windows(2).all(|w| w[0].created_at < w[1].created_at));
    }

    #[tokio::test]
    async fn test_mark_read_once_by_recipient() {
        let (repo, session) = repo_with_session(SessionType::Peer).await;
        let msg = repo
            .append(&session.session_id, MessageRole::Peer, MessageSource::Peer, "hello")
            .await
            .unwrap();

        let own = repo
            .mark_read(&session.session_id, msg.id, MessageRole::Peer)
            .await
            .unwrap();
        assert!(own.read_at.is_none());

        let read = repo
            .mark_read(&session.session_id, msg.id, MessageRole::User)
            .await
            .unwrap();
        let again = repo
            .mark_read(&session.session_id, msg.id, MessageRole::User)
            .await
            .unwrap();
        assert!(read.read_at.is_some());
        assert_eq!(read.read_at, again.read_at);

        let missing = repo
            .mark_read(&session.session_id, 42, MessageRole::User)
            .await
            .unwrap_err();
        assert_eq!(missing, ChatError::NotFound);
    }

    #[tokio::test]
    async fn test_mark_read_ignores_roles_outside_the_session() {
        let (repo, session) = repo_with_session(SessionType::Peer).await;
        let msg = repo
            .append(&session.session_id, MessageRole::User, MessageSource::Peer, "hi")
            .await
            .unwrap();

        let outsider = repo
            .mark_read(&session.session_id, msg.id, MessageRole::Agent)
            .await
            .unwrap();
        assert!(outsider.read_at.is_none());

        let stored = repo.latest(&session.session_id).await.unwrap().unwrap();
        assert!(stored.read_at.is_none());

        let recipient = repo
            .mark_read(&session.session_id, msg.id, MessageRole::Peer)
            .await
            .unwrap();
        assert!(recipient.read_at.is_some());
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (repo, session) = repo_with_session(SessionType::Agent).await;
        let first = repo.close(&session.session_id).await.unwrap();
        let second = repo.close(&session.session_id).await.unwrap();
        assert_eq!(first.status, SessionStatus::Closed);
        assert_eq!(first, second);

        assert_eq!(
            repo.close(&Uuid::now_v7()).await.unwrap_err(),
            ChatError::NotFound
        );
    }

    #[tokio::test]
    async fn test_touch_moves_forward_only() {
        let (repo, session) = repo_with_session(SessionType::Peer).await;
        let later = session.created_at + chrono::Duration::seconds(30);

        repo.touch(&session.session_id, later).await.unwrap();
        repo.touch(&session.session_id, session.created_at).await.unwrap();

        let found = repo.get(&session.session_id).await.unwrap();
        assert_eq!(found.last_message_at, Some(later));
        assert_eq!(found.updated_at, later);

        assert_eq!(
            repo.touch(&Uuid::now_v7(), later).await.unwrap_err(),
            ChatError::NotFound
        );
    }

    #[tokio::test]
    async fn test_assign_advocate_rules() {
        let (repo, session) = repo_with_session(SessionType::Peer).await;

        let claimed = repo.assign_advocate(&session.session_id, "A1").await.unwrap();
        assert_eq!(claimed.peer_advocate_id.as_deref(), Some("A1"));
        assert!(repo.assign_advocate(&session.session_id, "A1").await.is_ok());
        assert_eq!(
            repo.assign_advocate(&session.session_id, "A2").await.unwrap_err(),
            ChatError::AlreadyAssigned
        );

        let closed = repo.create(SessionType::Peer, None, None).await.unwrap();
        repo.close(&closed.session_id).await.unwrap();
        assert_eq!(
            repo.assign_advocate(&closed.session_id, "A1").await.unwrap_err(),
            ChatError::SessionClosed
        );
    }

    #[tokio::test]
    async fn test_list_open_sessions() {
        let repo = SqliteChatRepository::new(test_pool().await);
        let a = repo.create(SessionType::Peer, None, None).await.unwrap();
        let b = repo.create(SessionType::Agent, None, None).await.unwrap();
        repo.close(&a.session_id).await.unwrap();

        let open = repo.list_open().await.unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].session_id, b.session_id);
    }

    #[test]
    fn test_datetime_format_is_fixed_width() {
        let dt = DateTime::parse_from_rfc3339("2026-10-16T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_datetime(&dt), "2026-10-16T09:00:00.000000Z");
        assert_eq!(parse_datetime(&format_datetime(&dt)).unwrap(), dt);
    }
}
