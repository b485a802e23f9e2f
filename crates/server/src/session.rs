use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

struct Entry<T> {
    value: T,
    touched: Instant,
}

/// Per-flow state keyed by a random session id.
///
/// Entries idle for longer than the ttl are dropped whenever a new session is created.
pub struct SessionStore<T> {
    entries: Arc<RwLock<HashMap<Uuid, Entry<T>>>>,
    ttl: Duration,
    kind: &'static str,
}

impl<T> Clone for SessionStore<T> {
    fn clone(&self) -> Self {
        Self { entries: Arc::clone(&self.entries), ttl: self.ttl, kind: self.kind }
    }
}

impl<T> SessionStore<T> {
    pub fn new(kind: &'static str, ttl: Duration) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), ttl, kind }
    }

    pub async fn create(&self, value: T) -> Uuid {
        let id = Uuid::new_v4();
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.touched) < self.ttl);
        let pruned = before - entries.len();
        if pruned > 0 {
            debug!(
                event_name = "site.session.pruned",
                session_kind = self.kind,
                pruned,
                "expired sessions pruned"
            );
        }

        entries.insert(id, Entry { value, touched: now });
        id
    }

    /// Runs `read` against the session without refreshing its idle timer.
    pub async fn read<R>(&self, id: Uuid, read: impl FnOnce(&T) -> R) -> Option<R> {
        let entries = self.entries.read().await;
        entries.get(&id).map(|entry| read(&entry.value))
    }

    pub async fn update<R>(&self, id: Uuid, update: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(&id)?;
        entry.touched = Instant::now();
        Some(update(&mut entry.value))
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

/// Session ids arrive as path segments; anything that is not a uuid is an unknown session.
pub fn parse_session_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{parse_session_id, SessionStore};

    #[tokio::test]
    async fn created_session_can_be_read_and_updated() {
        let store = SessionStore::new("test", Duration::from_secs(60));
        let id = store.create(1_u32).await;

        assert_eq!(store.read(id, |value| *value).await, Some(1));
        assert_eq!(
            store
                .update(id, |value| {
                    *value += 1;
                    *value
                })
                .await,
            Some(2)
        );
        assert_eq!(store.read(id, |value| *value).await, Some(2));
    }

    #[tokio::test]
    async fn unknown_session_yields_none() {
        let store: SessionStore<u32> = SessionStore::new("test", Duration::from_secs(60));

        assert_eq!(store.read(uuid::Uuid::new_v4(), |value| *value).await, None);
        assert_eq!(store.update(uuid::Uuid::new_v4(), |value| *value).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_pruned_on_next_create() {
        let store = SessionStore::new("test", Duration::from_secs(10));
        let stale = store.create("stale").await;
        tokio::time::advance(Duration::from_secs(6)).await;
        let recent = store.create("recent").await;
        tokio::time::advance(Duration::from_secs(6)).await;

        let fresh = store.create("fresh").await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.read(stale, |value| *value).await, None);
        assert_eq!(store.read(recent, |value| *value).await, Some("recent"));
        assert_eq!(store.read(fresh, |value| *value).await, Some("fresh"));
    }

    #[tokio::test(start_paused = true)]
    async fn update_refreshes_idle_timer() {
        let store = SessionStore::new("test", Duration::from_secs(10));
        let kept = store.create(0_u8).await;
        tokio::time::advance(Duration::from_secs(8)).await;
        store.update(kept, |value| *value = 1).await;
        tokio::time::advance(Duration::from_secs(8)).await;

        store.create(2_u8).await;

        assert_eq!(store.read(kept, |value| *value).await, Some(1));
    }

    #[test]
    fn session_ids_must_be_uuids() {
        assert!(parse_session_id("not-a-session").is_none());
        assert!(parse_session_id(&uuid::Uuid::new_v4().to_string()).is_some());
    }
}
