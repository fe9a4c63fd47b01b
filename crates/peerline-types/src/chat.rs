//! Chat session and message types for Peerline.
//!
//! These types model peer-support conversations between an anonymous user
//! and either an automated agent or a human peer advocate. Wire
//! serialization is camelCase with absent optionals omitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Which kind of counterpart a session talks to. Fixed at creation.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (session_type IN ('agent', 'peer'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Agent,
    Peer,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Agent => write!(f, "agent"),
            SessionType::Peer => write!(f, "peer"),
        }
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "agent" => Ok(SessionType::Agent),
            "peer" => Ok(SessionType::Peer),
            other => Err(format!("invalid session type: '{other}'")),
        }
    }
}

/// Lifecycle status of a chat session.
///
/// The only transition is `Open -> Closed`; nothing leaves `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Open,
    Closed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Open => write!(f, "open"),
            SessionStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(SessionStatus::Open),
            "closed" => Ok(SessionStatus::Closed),
            other => Err(format!("invalid session status: '{other}'")),
        }
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Agent,
    Peer,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Agent => write!(f, "agent"),
            MessageRole::Peer => write!(f, "peer"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "agent" => Ok(MessageRole::Agent),
            "peer" => Ok(MessageRole::Peer),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// The conversation channel a message belongs to.
///
/// Always equal to the owning session's [`SessionType`]; the author is
/// carried separately by [`MessageRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageSource {
    Agent,
    Peer,
}

impl MessageSource {
    /// The source every message in a session of `session_type` carries.
    pub fn for_session(session_type: SessionType) -> Self {
        match session_type {
            SessionType::Agent => MessageSource::Agent,
            SessionType::Peer => MessageSource::Peer,
        }
    }

    /// Whether this source is the channel of `session_type`.
    pub fn matches(self, session_type: SessionType) -> bool {
        self == Self::for_session(session_type)
    }
}

impl fmt::Display for MessageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageSource::Agent => write!(f, "agent"),
            MessageSource::Peer => write!(f, "peer"),
        }
    }
}

impl FromStr for MessageSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "agent" => Ok(MessageSource::Agent),
            "peer" => Ok(MessageSource::Peer),
            other => Err(format!("invalid message source: '{other}'")),
        }
    }
}

/// A bounded conversation between one user and an agent or peer advocate.
///
/// `peer_advocate_id` is only ever set on `Peer` sessions. Sessions are never
/// deleted by the chat core; closing is the terminal transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub session_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub session_type: SessionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_advocate_id: Option<String>,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Timestamp of the newest message; `None` until the first append.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_at: Option<DateTime<Utc>>,
}

impl ChatSession {
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }
}

/// A single message within a chat session.
///
/// `id` is the per-session sequence number assigned by the message log,
/// starting at 1. Within a session, `id` order and `created_at` order agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: u64,
    pub session_id: Uuid,
    pub role: MessageRole,
    pub source: MessageSource,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Set once by the recipient side; never reset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
