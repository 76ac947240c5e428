//! In-process session store for `actix-session`.
//!
//! Session state stays on the server in a map keyed by a random session key.
//! The cookie carries only that key. Entries expire after their TTL; expired
//! entries are dropped when read and swept whenever a new session is saved.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use actix_session::storage::{LoadError, SaveError, SessionKey, SessionStore, UpdateError};
use actix_web::cookie::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

type SessionState = HashMap<String, String>;

#[derive(Debug)]
struct StoredSession {
    state: SessionState,
    /// `None` when the TTL overflows `Instant`; such entries never expire.
    expires_at: Option<Instant>,
}

impl StoredSession {
    fn new(state: SessionState, ttl: &Duration) -> Self {
        Self {
            state,
            expires_at: expiry(ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

// Negative TTLs count as already expired.
fn expiry(ttl: &Duration) -> Option<Instant> {
    let ttl = std::time::Duration::try_from(*ttl).unwrap_or_default();
    Instant::now().checked_add(ttl)
}

fn key_str(session_key: &SessionKey) -> &str {
    session_key.as_ref()
}

fn new_session_key() -> anyhow::Result<SessionKey> {
    let raw = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    SessionKey::try_from(raw)
        .map_err(|error| anyhow::anyhow!("generated session key rejected: {error}"))
}

/// Server-side session storage shared by every worker.
///
/// Clones share the same map, so build one store per process and hand a
/// clone to each worker's session middleware.
#[derive(Clone, Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
}

impl InMemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn insert_new(&self, state: SessionState, ttl: &Duration) -> anyhow::Result<SessionKey> {
        let session_key = new_session_key()?;
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, stored| stored.is_live(now));
        sessions.insert(
            key_str(&session_key).to_owned(),
            StoredSession::new(state, ttl),
        );
        Ok(session_key)
    }
}

impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_key: &SessionKey) -> Result<Option<SessionState>, LoadError> {
        let key = key_str(session_key);
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        if sessions.get(key).is_some_and(|stored| !stored.is_live(now)) {
            sessions.remove(key);
        }
        Ok(sessions.get(key).map(|stored| stored.state.clone()))
    }

    async fn save(
        &self,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, SaveError> {
        self.insert_new(session_state, ttl)
            .await
            .map_err(SaveError::Other)
    }

    async fn update(
        &self,
        session_key: SessionKey,
        session_state: SessionState,
        ttl: &Duration,
    ) -> Result<SessionKey, UpdateError> {
        {
            let now = Instant::now();
            let mut sessions = self.sessions.write().await;
            if let Some(stored) = sessions
                .get_mut(key_str(&session_key))
                .filter(|stored| stored.is_live(now))
            {
                *stored = StoredSession::new(session_state, ttl);
                return Ok(session_key);
            }
        }
        // Deleted or expired meanwhile: issue a fresh key.
        self.insert_new(session_state, ttl)
            .await
            .map_err(UpdateError::Other)
    }

    async fn update_ttl(&self, session_key: &SessionKey, ttl: &Duration) -> anyhow::Result<()> {
        if let Some(stored) = self.sessions.write().await.get_mut(key_str(session_key)) {
            stored.expires_at = expiry(ttl);
        }
        Ok(())
    }

    async fn delete(&self, session_key: &SessionKey) -> anyhow::Result<()> {
        self.sessions.write().await.remove(key_str(session_key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn state(pairs: &[(&str, &str)]) -> SessionState {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[fixture]
    fn store() -> InMemorySessionStore {
        InMemorySessionStore::new()
    }

    #[rstest]
    #[tokio::test]
    async fn saved_state_loads_back(store: InMemorySessionStore) {
        let key = store
            .save(state(&[("account", "{}")]), &Duration::hours(2))
            .await
            .expect("save");
        let loaded = store.load(&key).await.expect("load");
        assert_eq!(loaded, Some(state(&[("account", "{}")])));
    }

    #[rstest]
    #[tokio::test]
    async fn keys_are_unique_and_opaque(store: InMemorySessionStore) {
        let first = store.save(state(&[]), &Duration::hours(2)).await.expect("save");
        let second = store.save(state(&[]), &Duration::hours(2)).await.expect("save");
        assert_ne!(key_str(&first), key_str(&second));
        assert_eq!(key_str(&first).len(), 64);
        assert!(key_str(&first).chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[rstest]
    #[tokio::test]
    async fn deleted_sessions_no_longer_load(store: InMemorySessionStore) {
        let key = store
            .save(state(&[("account", "{}")]), &Duration::hours(2))
            .await
            .expect("save");
        store.delete(&key).await.expect("delete");
        assert_eq!(store.load(&key).await.expect("load"), None);
    }

    #[rstest]
    #[case(Duration::ZERO)]
    #[case(Duration::seconds(-5))]
    #[tokio::test]
    async fn expired_sessions_are_dropped(store: InMemorySessionStore, #[case] ttl: Duration) {
        let key = store
            .save(state(&[("account", "{}")]), &ttl)
            .await
            .expect("save");
        assert_eq!(store.load(&key).await.expect("load"), None);
        assert!(store.sessions.read().await.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn update_keeps_a_live_key(store: InMemorySessionStore) {
        let key = store.save(state(&[]), &Duration::hours(2)).await.expect("save");
        let original = key_str(&key).to_owned();

        let updated = store
            .update(key, state(&[("account", "{}")]), &Duration::hours(2))
            .await
            .expect("update");
        assert_eq!(key_str(&updated), original);
        assert_eq!(
            store.load(&updated).await.expect("load"),
            Some(state(&[("account", "{}")]))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn update_after_delete_issues_a_new_key(store: InMemorySessionStore) {
        let key = store.save(state(&[]), &Duration::hours(2)).await.expect("save");
        store.delete(&key).await.expect("delete");
        let stale = key_str(&key).to_owned();

        let fresh = store
            .update(key, state(&[("account", "{}")]), &Duration::hours(2))
            .await
            .expect("update");
        assert_ne!(key_str(&fresh), stale);
    }

    #[rstest]
    #[tokio::test]
    async fn update_ttl_can_expire_a_session(store: InMemorySessionStore) {
        let key = store.save(state(&[]), &Duration::hours(2)).await.expect("save");
        store
            .update_ttl(&key, &Duration::ZERO)
            .await
            .expect("update ttl");
        assert_eq!(store.load(&key).await.expect("load"), None);
    }

    #[rstest]
    #[tokio::test]
    async fn clones_share_sessions(store: InMemorySessionStore) {
        let worker = store.clone();
        let key = worker.save(state(&[]), &Duration::hours(2)).await.expect("save");
        assert!(store.load(&key).await.expect("load").is_some());
    }
}
