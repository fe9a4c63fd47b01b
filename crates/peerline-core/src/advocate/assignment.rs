//! Peer advocate assignment for new peer sessions.
//!
//! A pure decision over an availability snapshot: the policy never mutates
//! advocate state and gives the same answer for the same input.

use peerline_types::advocate::PeerAdvocate;

/// Picks the advocate for a new `peer` session.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssignmentPolicy;

impl AssignmentPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Choose an advocate id, or `None` when nobody is available.
    ///
    /// A `preferred` advocate wins if it is among the available candidates.
    /// Otherwise the available advocate with the fewest open sessions is
    /// chosen, ties broken by ascending id.
    pub fn assign(&self, candidates: &[PeerAdvocate], preferred: Option<&str>) -> Option<String> {
        let available = candidates.iter().filter(|a| a.available);

        if let Some(preferred) = preferred {
            if available.clone().any(|a| a.id == preferred) {
                return Some(preferred.to_string());
            }
        }

        available
            .min_by(|a, b| {
                a.current_open_session_count
                    .cmp(&b.current_open_session_count)
                    .then_with(|| a.id.cmp(&b.id))
            })
            .map(|a| a.id.clone())
    }
}
