//! Peer advocate records as seen by the chat core.
//!
//! Advocates are owned by an external directory; the chat core only reads a
//! snapshot of their availability and load when assigning a new session.

use serde::{Deserialize, Serialize};

/// One advocate entry from the advocate directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerAdvocate {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub available: bool,
    /// Number of open peer sessions currently assigned to this advocate.
    pub current_open_session_count: u32,
}

impl PeerAdvocate {
    pub fn new(id: impl Into<String>, available: bool, current_open_session_count: u32) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            available,
            current_open_session_count,
        }
    }
}
