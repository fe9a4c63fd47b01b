//! Peer-support chat core.
//!
//! Storage ports (`MessageLog`, `SessionStore`), the `SessionManager` that
//! coordinates them, per-viewer `DeliveryCursor`s, and an in-memory backend.

pub mod cursor;
pub mod lock;
pub mod log;
pub mod manager;
pub mod memory;
pub mod notify;
pub mod store;
