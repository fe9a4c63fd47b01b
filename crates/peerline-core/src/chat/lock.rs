//! Per-session exclusive sections.
//!
//! Writers on the same session queue on one async mutex; different sessions
//! never share a lock. Reads do not take these locks.
//!
//! Entries only live while someone holds or waits for them: the last guard
//! to drop removes its session's entry, so ids that never match a session
//! (or sessions that go quiet) leave nothing behind.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

type LockMap = DashMap<Uuid, Arc<Mutex<()>>>;

/// Registry of per-session write locks.
#[derive(Debug, Clone, Default)]
pub struct SessionLocks {
    inner: Arc<LockMap>,
}

/// Exclusive access to one session, held until dropped.
#[derive(Debug)]
pub struct SessionGuard {
    session_id: Uuid,
    registry: Arc<LockMap>,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        // Two references mean only the map and this guard know the mutex:
        // nobody is queued, so the entry can go. The check runs under the
        // shard lock that `acquire` clones under, so no waiter can slip in.
        self.registry
            .remove_if(&self.session_id, |_, lock| Arc::strong_count(lock) <= 2);
    }
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `session_id`.
    ///
    /// The map guard is dropped before awaiting the mutex.
    pub async fn acquire(&self, session_id: Uuid) -> SessionGuard {
        let lock = Arc::clone(
            &self
                .inner
                .entry(session_id)
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        );
        SessionGuard {
            session_id,
            registry: Arc::clone(&self.inner),
            _guard: lock.lock_owned().await,
        }
    }

    /// Number of sessions currently locked or waited on.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
