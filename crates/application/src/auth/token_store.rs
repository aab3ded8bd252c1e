//! In-memory access token storage.
//!
//! The store holds at most one token and never persists it. Every clone is
//! a handle onto the same slot, so the session context can hand it to the
//! HTTP pipeline and to the route gate while keeping a single writer.
//!
//! Each write advances a [`Generation`]. A writer that read the generation
//! earlier can commit conditionally, so an outcome computed against an old
//! session never overwrites a login, logout or invalidation made since.

use std::sync::Arc;

use ledger_domain::AccessToken;
use parking_lot::Mutex;
use tokio::sync::watch;

/// Version of the store's contents, advanced by every write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generation(u64);

#[derive(Debug)]
struct Slot {
    value: watch::Sender<Option<AccessToken>>,
    generation: Mutex<u64>,
}

impl Slot {
    /// Writes `value` if `expected` is `None` or still current.
    fn write(&self, expected: Option<Generation>, value: Option<AccessToken>) -> Option<bool> {
        let mut generation = self.generation.lock();
        if expected.is_some_and(|Generation(seen)| seen != *generation) {
            return None;
        }
        *generation += 1;
        Some(self.value.send_replace(value).is_some())
    }
}

/// Shared, volatile holder of the current access token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    slot: Arc<Slot>,
}

impl TokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (value, _) = watch::channel(None);
        Self {
            slot: Arc::new(Slot {
                value,
                generation: Mutex::new(0),
            }),
        }
    }

    /// Stores a token, replacing any previous one.
    pub fn set(&self, token: AccessToken) {
        self.slot.write(None, Some(token));
    }

    /// Returns the current token, if any.
    #[must_use]
    pub fn get(&self) -> Option<AccessToken> {
        self.slot.value.borrow().clone()
    }

    /// Drops the current token. Returns true if one was held.
    pub fn clear(&self) -> bool {
        self.slot.write(None, None).unwrap_or(false)
    }

    /// Returns the generation of the current contents.
    #[must_use]
    pub fn generation(&self) -> Generation {
        Generation(*self.slot.generation.lock())
    }

    /// Stores `token` only if nothing was written since `seen`.
    ///
    /// Returns true if the token was stored.
    pub fn set_if_current(&self, seen: Generation, token: AccessToken) -> bool {
        self.slot.write(Some(seen), Some(token)).is_some()
    }

    /// Drops the token only if nothing was written since `seen`.
    ///
    /// Returns true if the store was cleared.
    pub fn clear_if_current(&self, seen: Generation) -> bool {
        self.slot.write(Some(seen), None).is_some()
    }

    /// Returns true if a token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.slot.value.borrow().is_some()
    }

    /// Subscribes to token changes.
    ///
    /// Views use this to re-run the route gate when the session is cleared
    /// or restored.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<AccessToken>> {
        self.slot.value.subscribe()
    }
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn token(value: &str) -> AccessToken {
        AccessToken::new(value).unwrap()
    }

    #[test]
    fn test_store_and_get_token() {
        let store = TokenStore::new();
        assert_eq!(store.get(), None);

        store.set(token("access123"));
        assert_eq!(store.get(), Some(token("access123")));
        assert!(store.is_authenticated());
    }

    #[test]
    fn test_set_overwrites_previous_token() {
        let store = TokenStore::new();
        store.set(token("first"));
        store.set(token("second"));
        assert_eq!(store.get(), Some(token("second")));
    }

    #[test]
    fn test_clear() {
        let store = TokenStore::new();
        assert!(!store.clear());

        store.set(token("access123"));
        assert!(store.clear());
        assert_eq!(store.get(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let store = TokenStore::new();
        let reader = store.clone();
        store.set(token("shared"));
        assert_eq!(reader.get(), Some(token("shared")));
        reader.clear();
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = TokenStore::new();
        let mut rx = store.subscribe();

        store.set(token("fresh"));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Some(token("fresh")));

        store.clear();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), None);
    }

    #[test]
    fn test_conditional_writes_respect_later_writes() {
        let store = TokenStore::new();
        let seen = store.generation();

        store.set(token("login"));
        assert!(!store.clear_if_current(seen));
        assert_eq!(store.get(), Some(token("login")));

        let seen = store.generation();
        store.clear();
        assert!(!store.set_if_current(seen, token("late")));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_conditional_write_commits_when_untouched() {
        let store = TokenStore::new();
        let seen = store.generation();

        assert!(store.set_if_current(seen, token("fresh")));
        assert_eq!(store.get(), Some(token("fresh")));
        assert_ne!(store.generation(), seen);
    }
}
