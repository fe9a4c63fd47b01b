//! MessageLog trait definition and ordered-read helpers.
//!
//! The log is the append-only, strictly ordered record of messages per
//! session. Implementations assign ids and timestamps inside the same
//! critical section as the insert, so every reader observes one total order.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use futures_util::Stream;
use peerline_types::chat::{ChatMessage, MessageRole, MessageSource, SessionType};
use peerline_types::error::ChatError;
use uuid::Uuid;

/// Page size used when streaming a session's history.
pub const READ_PAGE_SIZE: usize = 100;

/// Repository trait for the per-session message log.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait MessageLog: Send + Sync {
    /// Append a message to an open session.
    ///
    /// Fails with `NotFound` for an unknown session, `SessionClosed` for a
    /// closed one and `EmptyContent` for blank text. On success the message
    /// carries the next sequence id (starting at 1) and a timestamp strictly
    /// after the previous message in the session. Does not touch session
    /// metadata.
    fn append(
        &self,
        session_id: &Uuid,
        role: MessageRole,
        source: MessageSource,
        content: &str,
    ) -> impl std::future::Future<Output = Result<ChatMessage, ChatError>> + Send;

    /// Up to `limit` messages with `id > after_id`, ascending by id.
    fn read_after(
        &self,
        session_id: &Uuid,
        after_id: u64,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, ChatError>> + Send;

    /// The newest message of a session, if any.
    fn latest(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ChatMessage>, ChatError>> + Send;

    /// Record that `reader` has seen a message.
    ///
    /// Sets `read_at` only when it is unset and `reader` is not the author.
    /// Already-read messages and self-reads are returned unchanged.
    fn mark_read(
        &self,
        session_id: &Uuid,
        message_id: u64,
        reader: MessageRole,
    ) -> impl std::future::Future<Output = Result<ChatMessage, ChatError>> + Send;
}

/// Lazily stream every message with `id > after_id`, in ascending id order.
///
/// Pages through [`MessageLog::read_after`]; the stream ends once a short page
/// is returned. Calling it again with the same arguments restarts the read.
pub fn since<L: MessageLog>(
    log: &L,
    session_id: Uuid,
    after_id: u64,
) -> impl Stream<Item = Result<ChatMessage, ChatError>> + Send + '_ {
    async_stream::try_stream! {
        let mut cursor = after_id;
        loop {
            let page = log.read_after(&session_id, cursor, READ_PAGE_SIZE).await?;
            let short = page.len() < READ_PAGE_SIZE;
            for message in page {
                cursor = message.id;
                yield message;
            }
            if short {
                break;
            }
        }
    }
}

/// Trim message text, rejecting blank content.
pub fn normalize_content(content: &str) -> Result<&str, ChatError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ChatError::EmptyContent);
    }
    Ok(trimmed)
}

/// Current time at the precision the log stores (microseconds).
pub fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Timestamp for the next message of a session.
///
/// Never earlier than `floor` (the session's creation time) and always
/// strictly after `previous`: if the clock has not moved past the previous
/// message, the previous time is bumped by one microsecond.
pub fn next_timestamp(previous: Option<DateTime<Utc>>, floor: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros().max(floor);
    match previous {
        Some(prev) if now <= prev => prev + Duration::microseconds(1),
        _ => now,
    }
}

/// The role a message written by `author` is addressed to.
///
/// User messages go to the session's counterpart (the agent or the peer
/// advocate); everything the counterpart writes goes to the user.
pub fn recipient_of(author: MessageRole, session_type: SessionType) -> MessageRole {
    match (author, session_type) {
        (MessageRole::User, SessionType::Agent) => MessageRole::Agent,
        (MessageRole::User, SessionType::Peer) => MessageRole::Peer,
        _ => MessageRole::User,
    }
}

/// Whether `reader` is allowed to set `read_at` on `message`.
///
/// Only the recipient side of an unread message may; authors and roles
/// outside the session never can.
pub fn can_mark_read(message: &ChatMessage, session_type: SessionType, reader: MessageRole) -> bool {
    message.read_at.is_none() && reader == recipient_of(message.role, session_type)
}
