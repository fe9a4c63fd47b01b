//! Session manager orchestrating session lifecycle and message delivery.
//!
//! `SessionManager` is the boundary callers talk to. It coordinates the
//! `MessageLog`, the `SessionStore` and the `AdvocateDirectory`, and owns the
//! cross-cutting rules: validation before anything reaches the log, per-session
//! serialization of writes, and `lastMessageAt` bookkeeping after each append.

use std::time::Duration;

use futures_util::TryStreamExt;
use peerline_types::chat::{
    ChatMessage, ChatSession, MessageRole, MessageSource, SessionType,
};
use peerline_types::config::ChatConfig;
use peerline_types::error::ChatError;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::advocate::assignment::AssignmentPolicy;
use crate::advocate::directory::AdvocateDirectory;
use crate::chat::cursor::DeliveryCursor;
use crate::chat::lock::SessionLocks;
use crate::chat::log::{MessageLog, can_mark_read, normalize_content, since};
use crate::chat::notify::{MessageCommitted, MessageNotifier};
use crate::chat::store::SessionStore;

/// Outcome of [`SessionManager::start_session`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResult {
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_advocate_id: Option<String>,
}

/// Coordinates sessions, messages and advocate assignment.
///
/// Generic over the storage ports to maintain clean architecture
/// (peerline-core never depends on peerline-infra).
pub struct SessionManager<L: MessageLog, S: SessionStore, D: AdvocateDirectory> {
    log: L,
    store: S,
    directory: D,
    policy: AssignmentPolicy,
    locks: SessionLocks,
    notifier: MessageNotifier,
    config: ChatConfig,
}

impl<L: MessageLog, S: SessionStore, D: AdvocateDirectory> SessionManager<L, S, D> {
    /// Create a manager with default chat limits.
    pub fn new(log: L, store: S, directory: D) -> Self {
        Self::with_config(log, store, directory, ChatConfig::default())
    }

    pub fn with_config(log: L, store: S, directory: D, config: ChatConfig) -> Self {
        Self {
            log,
            store,
            directory,
            policy: AssignmentPolicy::new(),
            locks: SessionLocks::new(),
            notifier: MessageNotifier::default(),
            config,
        }
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn notifier(&self) -> &MessageNotifier {
        &self.notifier
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    // --- Session lifecycle ---

    /// Open a new session.
    ///
    /// Agent sessions never carry an advocate. Peer sessions are assigned by
    /// the policy over the directory's current snapshot; when nobody is
    /// available (or the directory cannot be read) the session is created
    /// unassigned so it can be claimed later.
    #[tracing::instrument(name = "chat.start_session", skip_all, fields(chat.session_type = %session_type))]
    pub async fn start_session(
        &self,
        session_type: SessionType,
        user_id: Option<String>,
        preferred_advocate_id: Option<String>,
    ) -> Result<StartSessionResult, ChatError> {
        let user_id = normalize_optional_id("userId", user_id)?;
        let preferred = normalize_optional_id("peerAdvocateId", preferred_advocate_id)?;

        let advocate_id = match session_type {
            SessionType::Agent => {
                if preferred.is_some() {
                    return Err(ChatError::InvalidInput(
                        "agent sessions cannot request a peer advocate".to_string(),
                    ));
                }
                None
            }
            SessionType::Peer => self.assign_advocate(preferred.as_deref()).await,
        };

        let session = self
            .store
            .create(session_type, user_id, advocate_id)
            .await?;

        info!(
            session_id = %session.session_id,
            advocate = session.peer_advocate_id.as_deref().unwrap_or("-"),
            "Session started"
        );

        Ok(StartSessionResult {
            session_id: session.session_id,
            peer_advocate_id: session.peer_advocate_id,
        })
    }

    async fn assign_advocate(&self, preferred: Option<&str>) -> Option<String> {
        let snapshot = match self.directory.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Advocate directory unavailable; starting unassigned peer session");
                return None;
            }
        };

        let chosen = self.policy.assign(&snapshot, preferred);
        if chosen.is_none() {
            warn!(
                candidates = snapshot.len(),
                "No peer advocate available; starting unassigned peer session"
            );
        }
        chosen
    }

    /// Get a session by id.
    pub async fn get_session(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        self.store.get(session_id).await
    }

    /// Close a session. Safe to call repeatedly.
    #[tracing::instrument(name = "chat.close_session", skip_all, fields(chat.session_id = %session_id))]
    pub async fn close_session(&self, session_id: &Uuid) -> Result<ChatSession, ChatError> {
        let _guard = self.locks.acquire(*session_id).await;
        let session = self.store.close(session_id).await?;
        info!(session_id = %session_id, "Session closed");
        Ok(session)
    }

    /// Let an advocate take over an unassigned peer session.
    #[tracing::instrument(
        name = "chat.claim_session",
        skip_all,
        fields(chat.session_id = %session_id, chat.advocate_id = %advocate_id)
    )]
    pub async fn claim_session(
        &self,
        session_id: &Uuid,
        advocate_id: &str,
    ) -> Result<ChatSession, ChatError> {
        let advocate_id = advocate_id.trim();
        if advocate_id.is_empty() {
            return Err(ChatError::InvalidInput("advocateId must not be empty".to_string()));
        }

        let _guard = self.locks.acquire(*session_id).await;
        let session = self.store.assign_advocate(session_id, advocate_id).await?;
        info!(session_id = %session_id, advocate = advocate_id, "Session claimed");
        Ok(session)
    }

    // --- Messages ---

    /// Validate and append a message, then bump the session's timestamps.
    ///
    /// The append and the touch run inside the session's write lock, so
    /// `last_message_at` follows commit order. A failed touch is logged and
    /// does not undo the committed message.
    #[tracing::instrument(
        name = "chat.post_message",
        skip_all,
        fields(
            chat.session_id = %session_id,
            chat.role = %role,
            chat.message_id = tracing::field::Empty
        )
    )]
    pub async fn post_message(
        &self,
        session_id: &Uuid,
        role: MessageRole,
        source: MessageSource,
        content: &str,
    ) -> Result<ChatMessage, ChatError> {
        let content = self.validate_content(content)?;

        let _guard = self.locks.acquire(*session_id).await;

        let session = self.store.get(session_id).await?;
        if !session.is_open() {
            return Err(ChatError::SessionClosed);
        }
        check_author(&session, role, source)?;

        let message = self.log.append(session_id, role, source, content).await?;
        tracing::Span::current().record("chat.message_id", message.id);
        debug!(session_id = %session_id, message_id = message.id, "Message appended");

        if let Err(e) = self.store.touch(session_id, message.created_at).await {
            warn!(
                session_id = %session_id,
                message_id = message.id,
                error = %e,
                "Failed to update session timestamps after append"
            );
        }

        self.notifier.publish(MessageCommitted {
            session_id: *session_id,
            message_id: message.id,
        });

        Ok(message)
    }

    fn validate_content<'a>(&self, content: &'a str) -> Result<&'a str, ChatError> {
        let content = normalize_content(content)?;
        let max = self.config.max_message_chars;
        if content.chars().count() > max {
            return Err(ChatError::InvalidInput(format!(
                "message exceeds {max} characters"
            )));
        }
        Ok(content)
    }

    /// Messages after the cursor's position, advancing the cursor.
    pub async fn fetch_since(
        &self,
        cursor: &mut DeliveryCursor,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        self.store.get(&cursor.session_id).await?;
        cursor.fetch(&self.log).await
    }

    /// Like [`fetch_since`](Self::fetch_since), but waits up to `wait` for a
    /// new message when nothing is pending.
    ///
    /// A pure read: dropping the future at any point has no side effects.
    pub async fn wait_since(
        &self,
        cursor: &mut DeliveryCursor,
        wait: Duration,
    ) -> Result<Vec<ChatMessage>, ChatError> {
        // Subscribe before the first read so a commit in between is not missed.
        let mut events = self.notifier.subscribe();

        let messages = self.fetch_since(cursor).await?;
        if !messages.is_empty() || wait.is_zero() {
            return Ok(messages);
        }

        let deadline = tokio::time::Instant::now() + wait;
        loop {
            match tokio::time::timeout_at(deadline, events.recv()).await {
                Err(_elapsed) => return Ok(Vec::new()),
                Ok(Ok(event)) => {
                    if event.session_id != cursor.session_id
                        || event.message_id <= cursor.position()
                    {
                        continue;
                    }
                }
                Ok(Err(RecvError::Lagged(skipped))) => {
                    debug!(skipped, "Long-poll receiver lagged; re-reading log");
                }
                Ok(Err(RecvError::Closed)) => return Ok(Vec::new()),
            }

            let messages = cursor.fetch(&self.log).await?;
            if !messages.is_empty() {
                return Ok(messages);
            }
        }
    }

    /// Mark a message read on behalf of `reader`.
    ///
    /// Only the recipient side sets `read_at`. Self-reads, reads by a role
    /// outside the session and repeated reads return the message unchanged.
    pub async fn mark_read(
        &self,
        session_id: &Uuid,
        message_id: u64,
        reader: MessageRole,
    ) -> Result<ChatMessage, ChatError> {
        self.log.mark_read(session_id, message_id, reader).await
    }

    /// Unread messages addressed to `viewer`.
    ///
    /// Always 0 for a role that is not a party to the session.
    pub async fn unread_count(
        &self,
        session_id: &Uuid,
        viewer: MessageRole,
    ) -> Result<u64, ChatError> {
        let session_type = self.store.get(session_id).await?.session_type;
        since(&self.log, *session_id, 0)
            .try_fold(0u64, |count, message| async move {
                Ok(if can_mark_read(&message, session_type, viewer) {
                    count + 1
                } else {
                    count
                })
            })
            .await
    }

    // --- Reconciliation ---

    /// Recompute `last_message_at` from the log if the session lags behind it.
    ///
    /// Returns `true` when the session record was updated.
    pub async fn reconcile(&self, session_id: &Uuid) -> Result<bool, ChatError> {
        let _guard = self.locks.acquire(*session_id).await;

        let session = self.store.get(session_id).await?;
        let Some(latest) = self.log.latest(session_id).await? else {
            return Ok(false);
        };

        if session
            .last_message_at
            .is_some_and(|at| at >= latest.created_at)
        {
            return Ok(false);
        }

        self.store.touch(session_id, latest.created_at).await?;
        info!(session_id = %session_id, message_id = latest.id, "Reconciled session timestamps");
        Ok(true)
    }

    /// Reconcile every open session. Returns how many were repaired.
    pub async fn reconcile_open(&self) -> Result<usize, ChatError> {
        let mut repaired = 0;
        for session in self.store.list_open().await? {
            match self.reconcile(&session.session_id).await {
                Ok(true) => repaired += 1,
                Ok(false) => {}
                Err(e) => warn!(
                    session_id = %session.session_id,
                    error = %e,
                    "Reconciliation failed"
                ),
            }
        }
        Ok(repaired)
    }
}

/// Enforce the role/source rules: `source` is the session's channel, and the
/// non-user author must be the session's counterpart.
fn check_author(
    session: &ChatSession,
    role: MessageRole,
    source: MessageSource,
) -> Result<(), ChatError> {
    if !source.matches(session.session_type) {
        return Err(ChatError::InvalidInput(format!(
            "source '{source}' does not match {} session",
            session.session_type
        )));
    }
    let allowed = match (session.session_type, role) {
        (_, MessageRole::User) => true,
        (SessionType::Agent, MessageRole::Agent) => true,
        (SessionType::Peer, MessageRole::Peer) => true,
        _ => false,
    };
    if !allowed {
        return Err(ChatError::InvalidInput(format!(
            "role '{role}' cannot post in a {} session",
            session.session_type
        )));
    }
    Ok(())
}

fn normalize_optional_id(field: &str, value: Option<String>) -> Result<Option<String>, ChatError> {
    match value {
        None => Ok(None),
        Some(v) => {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                Err(ChatError::InvalidInput(format!("{field} must not be blank")))
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
    }
}
