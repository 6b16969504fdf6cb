//! # In-Process Entry Store
//!
//! A string-keyed map guarded by a single reader/writer lock, with a
//! per-entry deadline checked on every read and a periodic sweep that
//! reclaims memory held by entries whose deadline has passed.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Upper bound used when `now + ttl` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// A stored value and the instant from which it is no longer valid.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn new(value: String, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self { value, expires_at }
    }

    fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Concurrency-safe TTL map.
///
/// Reads share the lock; `set`, `delete` and the sweep take it exclusively.
/// Nothing here awaits or performs I/O.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`, valid until `now + ttl`.
    ///
    /// A zero `ttl` stores an entry that is already expired.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let entry = Entry::new(value.into(), ttl);
        self.entries.write().insert(key.into(), entry);
    }

    /// Value for `key` if present and not yet expired.
    ///
    /// Absent and expired keys are indistinguishable.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .map(|entry| entry.value.clone())
    }

    /// Remove `key`. Absent keys are a no-op.
    pub fn delete(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Physically remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    /// Number of physically held entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Start the background sweep on the current Tokio runtime.
    ///
    /// The task holds only a weak reference, so it also stops on its own
    /// once the last strong reference to the store is dropped.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero or if called outside a Tokio runtime.
    pub fn spawn_sweeper(self: &Arc<Self>, interval: Duration) -> Sweeper {
        assert!(!interval.is_zero(), "sweep interval must be non-zero");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(sweep_task(Arc::downgrade(self), interval, shutdown_rx));

        tracing::debug!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "Expiry sweeper started"
        );

        Sweeper {
            shutdown_tx,
            handle: Some(handle),
        }
    }
}

async fn sweep_task(
    store: Weak<MemoryStore>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(store) = store.upgrade() else {
                    tracing::debug!("Store dropped, sweeper exiting");
                    break;
                };
                let removed = store.purge_expired();
                if removed > 0 {
                    tracing::debug!(removed, remaining = store.len(), "Swept expired entries");
                }
            }
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
}

/// Handle to a running sweep task.
///
/// Call [`Sweeper::shutdown`] for an orderly stop; dropping the handle
/// aborts the task instead.
#[derive(Debug)]
pub struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Signal the task to stop and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Expiry sweeper terminated abnormally");
            }
        }
        tracing::debug!("Expiry sweeper stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::{Fake, Faker};

    #[tokio::test(start_paused = true)]
    async fn test_set_then_get() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::from_secs(10));
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_resets_value_and_deadline() {
        let store = MemoryStore::new();
        store.set("k", "old", Duration::from_secs(1));
        store.set("k", "new", Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert_eq!(store.get("k").as_deref(), Some("new"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_not_returned_before_sweep() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::from_secs(2));

        tokio::time::advance(Duration::from_secs(2)).await;

        // exactly at the deadline counts as expired
        assert_eq!(store.get("k"), None);
        // still physically present because nothing swept
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_is_immediately_expired() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::ZERO);
        assert_eq!(store.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_ttl_does_not_overflow() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::MAX);
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("k", "v", Duration::from_secs(60));

        store.delete("k");
        assert_eq!(store.get("k"), None);

        store.delete("k");
        store.delete("never-set");
        assert_eq!(store.get("never-set"), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired_only_drops_expired() {
        let store = MemoryStore::new();
        store.set("short", "1", Duration::from_secs(1));
        store.set("long", "2", Duration::from_secs(60));

        tokio::time::advance(Duration::from_secs(5)).await;

        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("long").as_deref(), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_reclaims_and_shuts_down() {
        let store = Arc::new(MemoryStore::new());
        store.set("short", "1", Duration::from_millis(500));
        store.set("long", "2", Duration::from_secs(60));

        let sweeper = store.spawn_sweeper(Duration::from_secs(1));

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.len(), 1);
        assert!(!sweeper.is_finished());

        sweeper.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_exits_when_store_dropped() {
        let store = Arc::new(MemoryStore::new());
        let sweeper = store.spawn_sweeper(Duration::from_secs(1));
        drop(store);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(sweeper.is_finished());
    }

    #[test]
    fn test_concurrent_writers_on_distinct_keys() {
        let store = Arc::new(MemoryStore::new());
        let pairs: Vec<(String, String)> = (0..64)
            .map(|i| (format!("key-{i}"), Faker.fake::<String>()))
            .collect();

        let handles: Vec<_> = pairs
            .iter()
            .cloned()
            .map(|(key, value)| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.set(key, value, Duration::from_secs(300)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), pairs.len());
        for (key, value) in &pairs {
            assert_eq!(store.get(key).as_ref(), Some(value));
        }
    }
}
