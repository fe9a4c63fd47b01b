//! Shared domain types for Peerline.
//!
//! This crate contains the types used across the peer-support chat service:
//! sessions, messages, advocates, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod advocate;
pub mod chat;
pub mod config;
pub mod error;
