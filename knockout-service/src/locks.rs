use knockout_core::TournamentId;

use parking_lot::{Mutex, RwLock};

use std::collections::HashMap;
use std::sync::Arc;

/// Hands out one mutex per tournament.
///
/// Every mutating bracket operation takes the lock of its tournament for
/// the duration of the call; two concurrent result reports or reopens on
/// the same tournament would otherwise double-advance a winner or corrupt
/// slot state. Locks are created on first use and kept for the lifetime of
/// the service; an entry is a single `Arc` and never evicted.
#[derive(Debug, Default)]
pub struct TournamentLocks {
    inner: RwLock<HashMap<TournamentId, Arc<Mutex<()>>>>,
}

impl TournamentLocks {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the lock guarding `tournament`, creating it on first use.
    pub fn get(&self, tournament: TournamentId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.inner.read().get(&tournament) {
            return lock.clone();
        }

        let mut locks = self.inner.write();
        locks.entry(tournament).or_default().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::TournamentLocks;

    use knockout_core::TournamentId;

    use std::sync::Arc;

    #[test]
    fn test_same_lock_per_tournament() {
        let locks = TournamentLocks::new();

        let a = locks.get(TournamentId(1));
        let b = locks.get(TournamentId(1));
        let c = locks.get(TournamentId(2));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
