//! Chat session HTTP handlers.
//!
//! Endpoints:
//! - POST /api/peer-chat/start             - Start a peer session
//! - POST /api/agent-chat/start            - Start an agent session
//! - GET  /api/peer-chat/{id}              - Get a session
//! - POST /api/peer-chat/{id}/message      - Post a message
//! - GET  /api/peer-chat/{id}/messages     - Fetch (or long-poll) messages after a cursor
//! - POST /api/peer-chat/{id}/close        - Close a session
//! - POST /api/peer-chat/{id}/read         - Mark a message read
//! - POST /api/peer-chat/{id}/claim        - Claim an unassigned peer session
//! - GET  /api/peer-chat/{id}/unread       - Unread count for a viewer
//!
//! The per-session routes are also mounted under `/api/agent-chat/{id}`.

use std::time::Duration;

use axum::Json;
use axum::extract::{Path, State};
use serde::Deserialize;
use serde_json::{Value, json};

use peerline_core::chat::cursor::DeliveryCursor;
use peerline_core::chat::manager::StartSessionResult;
use peerline_types::chat::{MessageRole, MessageSource, SessionType};

use crate::http::error::AppError;
use crate::http::extract::{ApiJson, ApiQuery, OptionalJson, parse_session_id};
use crate::state::AppState;

/// Request body for starting a peer session.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StartPeerRequest {
    pub user_id: Option<String>,
    pub peer_advocate_id: Option<String>,
}

/// Request body for starting an agent session.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StartAgentRequest {
    pub user_id: Option<String>,
}

/// Request body for posting a message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub content: String,
    pub from: MessageRole,
    /// Defaults to the session's channel.
    pub source: Option<MessageSource>,
}

/// Query parameters for message fetches.
#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    #[serde(default)]
    pub after: u64,
    /// Long-poll timeout in seconds, clamped to `chat.long_poll_max_secs`.
    #[serde(default)]
    pub wait: u64,
}

/// Request body for read receipts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub message_id: u64,
    pub reader_role: MessageRole,
}

/// Request body for claiming a session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub advocate_id: String,
}

/// Query parameters for the unread count.
#[derive(Debug, Deserialize)]
pub struct UnreadQuery {
    pub viewer: MessageRole,
}

/// POST /api/peer-chat/start - Start a peer session.
pub async fn start_peer_session(
    State(state): State<AppState>,
    OptionalJson(req): OptionalJson<StartPeerRequest>,
) -> Result<Json<StartSessionResult>, AppError> {
    let result = state
        .chat
        .start_session(SessionType::Peer, req.user_id, req.peer_advocate_id)
        .await?;
    Ok(Json(result))
}

/// POST /api/agent-chat/start - Start an agent session.
pub async fn start_agent_session(
    State(state): State<AppState>,
    OptionalJson(req): OptionalJson<StartAgentRequest>,
) -> Result<Json<StartSessionResult>, AppError> {
    let result = state
        .chat
        .start_session(SessionType::Agent, req.user_id, None)
        .await?;
    Ok(Json(result))
}

/// GET /api/peer-chat/{id} - Get a session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let sid = parse_session_id(&session_id)?;
    let session = state.chat.get_session(&sid).await?;
    Ok(Json(json!({ "session": session })))
}

/// POST /api/peer-chat/{id}/message - Post a message.
pub async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiJson(req): ApiJson<PostMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let sid = parse_session_id(&session_id)?;

    let source = match req.source {
        Some(source) => source,
        None => MessageSource::for_session(state.chat.get_session(&sid).await?.session_type),
    };

    let message = state
        .chat
        .post_message(&sid, req.from, source, &req.content)
        .await?;
    Ok(Json(json!({ "ok": true, "message": message })))
}

/// GET /api/peer-chat/{id}/messages?after={id}&wait={secs} - Fetch messages.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiQuery(query): ApiQuery<MessagesQuery>,
) -> Result<Json<Value>, AppError> {
    let sid = parse_session_id(&session_id)?;
    let wait = Duration::from_secs(query.wait.min(state.config.chat.long_poll_max_secs));

    let mut cursor = DeliveryCursor::at(sid, query.after);
    let messages = state.chat.wait_since(&mut cursor, wait).await?;
    Ok(Json(json!({ "messages": messages })))
}

/// POST /api/peer-chat/{id}/close - Close a session.
pub async fn close_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let sid = parse_session_id(&session_id)?;
    state.chat.close_session(&sid).await?;
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/peer-chat/{id}/read - Mark a message read.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiJson(req): ApiJson<MarkReadRequest>,
) -> Result<Json<Value>, AppError> {
    let sid = parse_session_id(&session_id)?;
    let message = state
        .chat
        .mark_read(&sid, req.message_id, req.reader_role)
        .await?;
    Ok(Json(json!({ "message": message })))
}

/// POST /api/peer-chat/{id}/claim - Claim an unassigned peer session.
pub async fn claim_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiJson(req): ApiJson<ClaimRequest>,
) -> Result<Json<Value>, AppError> {
    let sid = parse_session_id(&session_id)?;
    let session = state.chat.claim_session(&sid, &req.advocate_id).await?;
    Ok(Json(json!({ "ok": true, "session": session })))
}

/// GET /api/peer-chat/{id}/unread?viewer={role} - Unread count for a viewer.
pub async fn unread_count(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ApiQuery(query): ApiQuery<UnreadQuery>,
) -> Result<Json<Value>, AppError> {
    let sid = parse_session_id(&session_id)?;
    let unread = state.chat.unread_count(&sid, query.viewer).await?;
    Ok(Json(json!({ "unread": unread })))
}
