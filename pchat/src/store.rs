//! Conversation storage contracts, the in-memory store, and per-session turn locks.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};

use pcommon::SessionId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::{ChatError, DEFAULT_HISTORY_CAPACITY, History, Turn};

pub type ChatFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ConversationStore: Send + Sync {
    /// Ordered turns of `session_id`, oldest first; empty for unknown sessions.
    fn load<'a>(&'a self, session_id: &'a SessionId) -> ChatFuture<'a, Result<Vec<Turn>, ChatError>>;

    /// Appends `turns` as one unit, then applies the capacity bound.
    fn append<'a>(
        &'a self,
        session_id: &'a SessionId,
        turns: Vec<Turn>,
    ) -> ChatFuture<'a, Result<(), ChatError>>;
}

#[derive(Debug)]
pub struct InMemoryConversationStore {
    sessions: Mutex<HashMap<SessionId, History>>,
    capacity: usize,
}

impl Default for InMemoryConversationStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn session_count(&self) -> Result<usize, ChatError> {
        Ok(self.sessions()?.len())
    }

    fn sessions(&self) -> Result<MutexGuard<'_, HashMap<SessionId, History>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|_| ChatError::store("conversation store lock poisoned"))
    }
}

impl ConversationStore for InMemoryConversationStore {
    fn load<'a>(&'a self, session_id: &'a SessionId) -> ChatFuture<'a, Result<Vec<Turn>, ChatError>> {
        Box::pin(async move {
            let sessions = self.sessions()?;
            Ok(sessions
                .get(session_id)
                .map(History::snapshot)
                .unwrap_or_default())
        })
    }

    fn append<'a>(
        &'a self,
        session_id: &'a SessionId,
        turns: Vec<Turn>,
    ) -> ChatFuture<'a, Result<(), ChatError>> {
        Box::pin(async move {
            let mut sessions = self.sessions()?;
            sessions
                .entry(session_id.clone())
                .or_insert_with(|| History::with_capacity(self.capacity))
                .extend(turns);
            Ok(())
        })
    }
}

/// One async lock per session so a turn's load, route and append never
/// interleave with another turn of the same session.
///
/// A session's entry lives only while some turn holds or waits for it.
#[derive(Debug, Default)]
pub struct SessionLocks {
    locks: Mutex<HashMap<SessionId, Arc<AsyncMutex<()>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, session_id: &SessionId) -> Result<SessionGuard<'_>, ChatError> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|_| ChatError::store("session lock table poisoned"))?;
            Arc::clone(locks.entry(session_id.clone()).or_default())
        };
        let lease = Lease {
            locks: self,
            session_id: session_id.clone(),
            lock: Some(Arc::clone(&lock)),
        };

        Ok(SessionGuard {
            _guard: lock.lock_owned().await,
            _lease: lease,
        })
    }
}

/// Held for the duration of one turn.
#[derive(Debug)]
pub struct SessionGuard<'a> {
    // Field order matters: the mutex is released before the lease is counted.
    _guard: OwnedMutexGuard<()>,
    _lease: Lease<'a>,
}

/// Claim on a table entry; the last claim to go removes the entry. Dropping
/// a lease of a cancelled `acquire` counts too.
#[derive(Debug)]
struct Lease<'a> {
    locks: &'a SessionLocks,
    session_id: SessionId,
    lock: Option<Arc<AsyncMutex<()>>>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        // Clones happen under the table lock, so this count cannot race them.
        let Ok(mut locks) = self.locks.locks.lock() else {
            return;
        };
        drop(self.lock.take());
        if locks
            .get(&self.session_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.session_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn sessions_have_independent_histories() {
        let store = InMemoryConversationStore::with_capacity(4);
        let alice = SessionId::new("alice");
        let bob = SessionId::new("bob");

        store
            .append(&alice, vec![Turn::user("hi"), Turn::assistant("hello")])
            .await
            .expect("append");

        assert_eq!(store.load(&alice).await.expect("load").len(), 2);
        assert!(store.load(&bob).await.expect("load").is_empty());
        assert_eq!(store.session_count().expect("count"), 1);
    }

    #[tokio::test]
    async fn appends_share_the_store_capacity() {
        let store = InMemoryConversationStore::with_capacity(2);
        let session = SessionId::default();

        store
            .append(&session, vec![Turn::user("1"), Turn::assistant("2")])
            .await
            .expect("append");
        store
            .append(&session, vec![Turn::user("3"), Turn::assistant("4")])
            .await
            .expect("append");

        assert_eq!(
            store.load(&session).await.expect("load"),
            vec![Turn::user("3"), Turn::assistant("4")]
        );
    }

    fn tracked_sessions(locks: &SessionLocks) -> usize {
        locks.locks.lock().expect("lock table").len()
    }

    #[tokio::test]
    async fn released_session_locks_leave_no_entries() {
        let locks = SessionLocks::new();

        for index in 0..1000 {
            let guard = locks
                .acquire(&SessionId::new(format!("session-{index}")))
                .await
                .expect("lock");
            drop(guard);
        }

        assert_eq!(tracked_sessions(&locks), 0);
    }

    #[tokio::test]
    async fn waiting_turns_keep_the_session_entry() {
        let locks = Arc::new(SessionLocks::new());
        let session = SessionId::new("busy");
        let held = locks.acquire(&session).await.expect("first lock");

        let waiter = {
            let locks = Arc::clone(&locks);
            let session = session.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&session).await.expect("second lock");
                tracked_sessions(&locks)
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        assert_eq!(waiter.await.expect("task joins"), 1);
        assert_eq!(tracked_sessions(&locks), 0);
    }

    #[tokio::test]
    async fn abandoned_waits_release_their_entry() {
        let locks = SessionLocks::new();
        let session = SessionId::new("busy");
        let held = locks.acquire(&session).await.expect("first lock");

        let abandoned =
            tokio::time::timeout(Duration::from_millis(20), locks.acquire(&session)).await;
        assert!(abandoned.is_err(), "same session must wait");

        drop(held);
        assert_eq!(tracked_sessions(&locks), 0);
    }

    #[tokio::test]
    async fn session_lock_serializes_the_same_session_only() {
        let locks = Arc::new(SessionLocks::new());
        let session = SessionId::new("s");

        let held = locks.acquire(&session).await.expect("first lock");

        let other = tokio::time::timeout(
            Duration::from_millis(50),
            locks.acquire(&SessionId::new("other")),
        )
        .await;
        assert!(other.is_ok(), "different session must not wait");

        let contended = {
            let locks = Arc::clone(&locks);
            let session = session.clone();
            tokio::spawn(async move { locks.acquire(&session).await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contended.is_finished(), "same session must wait");

        drop(held);
        contended
            .await
            .expect("task joins")
            .expect("lock acquired after release");
    }
}
