//! HTTP/REST API layer for Peerline.
//!
//! Axum-based JSON API under `/api/peer-chat` and `/api/agent-chat`, with
//! CORS and request tracing.

pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
