//! Peer advocate lookup and assignment.
//!
//! Defines the `AdvocateDirectory` port and the pure `AssignmentPolicy`
//! used when opening peer sessions.

pub mod assignment;
pub mod directory;
