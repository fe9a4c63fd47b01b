//! SessionStore trait definition.
//!
//! Session records and their valid transitions. Follows the same RPITIT
//! pattern as [`MessageLog`](super::log::MessageLog).

use chrono::{DateTime, Utc};
use peerline_types::chat::{ChatSession, SessionType};
use peerline_types::error::ChatError;
use uuid::Uuid;

/// Repository trait for chat session records.
///
/// Implementations live in peerline-infra (`SqliteChatRepository`) and in
/// [`InMemoryChatStore`](super::memory::InMemoryChatStore).
pub trait SessionStore: Send + Sync {
    /// Create an open session with a fresh id and `created_at = updated_at = now`.
    fn create(
        &self,
        session_type: SessionType,
        user_id: Option<String>,
        peer_advocate_id: Option<String>,
    ) -> impl std::future::Future<Output = Result<ChatSession, ChatError>> + Send;

    /// Get a session by id, failing with `NotFound` if absent.
    fn get(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<ChatSession, ChatError>> + Send;

    /// Transition a session to `closed`. Closing a closed session is a no-op.
    fn close(
        &self,
        session_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<ChatSession, ChatError>> + Send;

    /// Move `last_message_at` and `updated_at` forward to `at`.
    ///
    /// A value older than the stored `last_message_at` is ignored.
    fn touch(
        &self,
        session_id: &Uuid,
        at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<(), ChatError>> + Send;

    /// Set the advocate of an open, unassigned peer session.
    ///
    /// Re-assigning the same advocate succeeds unchanged; a different one
    /// fails with `AlreadyAssigned`.
    fn assign_advocate(
        &self,
        session_id: &Uuid,
        advocate_id: &str,
    ) -> impl std::future::Future<Output = Result<ChatSession, ChatError>> + Send;

    /// All sessions still open, oldest first.
    fn list_open(&self) -> impl std::future::Future<Output = Result<Vec<ChatSession>, ChatError>> + Send;
}
