//! AdvocateDirectory trait definition.
//!
//! The directory is an external collaborator: the chat core reads an
//! availability snapshot from it and never writes advocate profile data.

use peerline_types::advocate::PeerAdvocate;
use peerline_types::error::RepositoryError;

/// Read-only view of peer advocates and their current load.
pub trait AdvocateDirectory: Send + Sync {
    /// Every known advocate with availability and open-session count.
    fn snapshot(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<PeerAdvocate>, RepositoryError>> + Send;
}
