//! Per-principal mutual exclusion
//!
//! A provisioning call reads a principal and then conditionally writes it.
//! Two calls for the same principal interleaving between the read and the
//! write would lose one update, so the read-modify-write sequence runs under
//! a lock keyed by server and principal. Calls for different principals
//! never contend.

use std::pin::Pin;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Server id and principal name
type LockKey = (String, String);
type LockTable = Arc<DashMap<LockKey, Arc<Mutex<()>>>>;

#[derive(Debug, Clone, Default)]
pub struct PrincipalLocks {
    table: LockTable,
}

impl PrincipalLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one principal on one server
    pub async fn acquire(&self, server_id: &str, principal: &str) -> PrincipalGuard {
        let key = (server_id.to_string(), principal.to_string());
        let mutex = self
            .table
            .entry(key.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone();

        let mut waiting = Waiting {
            lock: Box::pin(mutex.lock_owned()),
            release: Release {
                key,
                table: self.table.clone(),
            },
        };
        let guard = waiting.lock.as_mut().await;

        let Waiting { lock, release } = waiting;
        drop(lock);

        PrincipalGuard {
            _guard: guard,
            _release: release,
        }
    }

    /// Number of principals currently locked or waited on
    pub fn active(&self) -> usize {
        self.table.len()
    }
}

/// Held for the duration of one read-modify-write sequence
pub struct PrincipalGuard {
    // field order matters: the mutex is unlocked before the entry is released
    _guard: OwnedMutexGuard<()>,
    _release: Release,
}

/// A pending lock. Dropping it before it resolves releases the entry too.
struct Waiting<F> {
    lock: Pin<Box<F>>,
    release: Release,
}

/// Drops the table entry once no call holds or waits on it
struct Release {
    key: LockKey,
    table: LockTable,
}

impl Drop for Release {
    fn drop(&mut self) {
        self.table
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
