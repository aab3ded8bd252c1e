//! Registry of in-flight operations keyed by operation kind.
//!
//! The first caller for a key starts the operation and stores a shared
//! handle to it; every caller arriving before it settles gets a clone of
//! that handle and therefore the same output. The slot is cleared from
//! inside the operation, after it produced its output and before any waiter
//! observes it, so a new operation for the same key can only start once the
//! previous one has settled.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;

/// Cloneable handle to an in-flight operation.
pub type FlightHandle<T> = Shared<BoxFuture<'static, T>>;

/// Outcome of [`SingleFlight::join`].
pub enum Joined<T: Clone> {
    /// The caller started a new operation.
    Started(FlightHandle<T>),
    /// An operation was already running; the caller shares it.
    Shared(FlightHandle<T>),
}

impl<T: Clone> Joined<T> {
    /// Returns true if this caller started the operation.
    #[cfg(test)]
    #[must_use]
    pub const fn is_leader(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    /// Returns the handle to await.
    #[cfg(test)]
    #[must_use]
    pub fn into_handle(self) -> FlightHandle<T> {
        match self {
            Self::Started(handle) | Self::Shared(handle) => handle,
        }
    }
}

struct Slot<T: Clone> {
    id: u64,
    handle: FlightHandle<T>,
}

type Slots<K, T> = Arc<Mutex<HashMap<K, Slot<T>>>>;

/// Single-flight registry.
pub struct SingleFlight<K, T: Clone> {
    slots: Slots<K, T>,
    next_id: AtomicU64,
}

impl<K, T> SingleFlight<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Joins the operation running under `key`, or starts one with `start`.
    ///
    /// `start` is only called when no operation is active. It runs while the
    /// registry lock is held, so it must only build the future and not touch
    /// this registry.
    pub fn join<F, Fut>(&self, key: K, start: F) -> Joined<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(&key) {
            return Joined::Shared(slot.handle.clone());
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.slots);
        let slot_key = key.clone();
        let operation = start();
        let handle = async move {
            let output = operation.await;
            let mut slots = registry.lock();
            if slots.get(&slot_key).is_some_and(|slot| slot.id == id) {
                slots.remove(&slot_key);
            }
            output
        }
        .boxed()
        .shared();

        slots.insert(
            key,
            Slot {
                id,
                handle: handle.clone(),
            },
        );
        Joined::Started(handle)
    }

    /// Joins or starts the operation and waits for its output.
    #[cfg(test)]
    pub async fn run<F, Fut>(&self, key: K, start: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        self.join(key, start).into_handle().await
    }

    /// Returns true while an operation is registered under `key`.
    #[must_use]
    pub fn is_active(&self, key: &K) -> bool {
        self.slots.lock().contains_key(key)
    }

    /// Number of operations currently registered.
    #[cfg(test)]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.lock().len()
    }
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T: Clone> std::fmt::Debug for SingleFlight<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlight")
            .field("active", &self.slots.lock().len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_execution() {
        let flights: SingleFlight<&'static str, u32> = SingleFlight::new();
        let executions = Arc::new(AtomicUsize::new(0));

        let calls = (0..5).map(|_| {
            let executions = Arc::clone(&executions);
            flights.run("refresh", move || async move {
                executions.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                7
            })
        });
        let results = futures::future::join_all(calls).await;

        assert_eq!(results, vec![7; 5]);
        assert_eq!(executions.load(Ordering::SeqCst), 1);
        assert!(!flights.is_active(&"refresh"));
    }

    #[tokio::test]
    async fn test_slot_is_cleared_after_settling() {
        let flights: SingleFlight<&'static str, u32> = SingleFlight::new();

        let first = flights.run("refresh", || async { 1 }).await;
        let second = flights.run("refresh", || async { 2 }).await;

        assert_eq!((first, second), (1, 2));
        assert_eq!(flights.active_count(), 0);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let flights: SingleFlight<&'static str, u32> = SingleFlight::new();

        let a = flights.join("a", || async { 1 });
        let b = flights.join("b", || async { 2 });
        assert!(a.is_leader());
        assert!(b.is_leader());
        assert_eq!(flights.active_count(), 2);

        assert_eq!(a.into_handle().await, 1);
        assert_eq!(b.into_handle().await, 2);
        assert_eq!(flights.active_count(), 0);
    }

    #[tokio::test]
    async fn test_late_joiner_shares_handle() {
        let flights: SingleFlight<&'static str, u32> = SingleFlight::new();

        let built_twice = AtomicUsize::new(0);
        let leader = flights.join("refresh", || async { 1 });
        let follower = flights.join("refresh", || {
            built_twice.fetch_add(1, Ordering::SeqCst);
            async { 2 }
        });
        assert!(leader.is_leader());
        assert!(!follower.is_leader());
        assert_eq!(built_twice.load(Ordering::SeqCst), 0);
        assert!(flights.is_active(&"refresh"));

        assert_eq!(follower.into_handle().await, 1);
        assert!(!flights.is_active(&"refresh"));
        assert_eq!(leader.into_handle().await, 1);
    }

    #[tokio::test]
    async fn test_dropped_leader_does_not_abandon_flight() {
        let flights: SingleFlight<&'static str, u32> = SingleFlight::new();

        drop(flights.join("refresh", || async { 5 }));
        assert!(flights.is_active(&"refresh"));

        let value = flights.run("refresh", || async { 6 }).await;
        assert_eq!(value, 5);
        assert!(!flights.is_active(&"refresh"));
    }
}
