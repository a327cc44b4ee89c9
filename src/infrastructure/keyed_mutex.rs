use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-key exclusive locking within one process.
///
/// Grants one critical section per distinct key at a time. Lock entries are
/// created lazily on first use and never removed; the intended key space
/// (account identifiers) has bounded cardinality.
///
/// The internal table lock only covers the O(1) lookup/insert, never the
/// wait on the per-key lock itself, so contention on one key cannot stall
/// callers of unrelated keys.
///
/// This reduces contention on the database-level lock; it does not provide
/// cross-process exclusion.
pub struct KeyedMutex<K> {
    locks: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K: Eq + Hash> KeyedMutex<K> {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquires the lock for `key`, waiting until no other holder remains.
    ///
    /// The returned guard releases on drop, on every exit path including
    /// panic and task cancellation.
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let entry = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(key).or_default())
        };
        entry.lock_owned().await
    }
}

impl<K: Eq + Hash> Default for KeyedMutex<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let mutex = Arc::new(KeyedMutex::new());
        let counter = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..50 {
            let mutex = Arc::clone(&mutex);
            let counter = Arc::clone(&counter);
            handles.push(tokio::spawn(async move {
                let _guard = mutex.lock("account-1").await;
                // Non-atomic read-modify-write: only safe if the lock holds.
                let seen = counter.load(Ordering::SeqCst);
                tokio::task::yield_now().await;
                counter.store(seen + 1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 50);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let mutex = Arc::new(KeyedMutex::new());

        let _held = mutex.lock("account-1").await;

        // A different key must be acquirable while "account-1" is held.
        let other = tokio::time::timeout(Duration::from_secs(1), mutex.lock("account-2")).await;
        assert!(other.is_ok(), "unrelated key was blocked");
    }

    #[tokio::test]
    async fn test_guard_releases_on_drop() {
        let mutex = KeyedMutex::new();

        {
            let _guard = mutex.lock("account-1").await;
        }
        let reacquired =
            tokio::time::timeout(Duration::from_secs(1), mutex.lock("account-1")).await;
        assert!(reacquired.is_ok(), "lock was not released on drop");
    }

    #[tokio::test]
    async fn test_guard_releases_on_panic() {
        let mutex = Arc::new(KeyedMutex::new());

        let mutex_clone = Arc::clone(&mutex);
        let task = tokio::spawn(async move {
            let _guard = mutex_clone.lock("account-1").await;
            panic!("holder panics while locked");
        });
        assert!(task.await.is_err());

        let reacquired =
            tokio::time::timeout(Duration::from_secs(1), mutex.lock("account-1")).await;
        assert!(reacquired.is_ok(), "lock leaked across a panic");
    }
}
