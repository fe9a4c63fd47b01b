//! Chat session coordination and storage trait definitions for Peerline.
//!
//! This crate defines the "ports" (repository traits) that the infrastructure
//! layer implements, plus the session manager built on top of them. It
//! depends only on `peerline-types` -- never on `peerline-infra` or any
//! database/IO crate.

pub mod advocate;
pub mod chat;
