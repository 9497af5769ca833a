use crate::error::AppResult;
use crate::store::models::PendingChallenge;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// One challenge slot per user.
///
/// `put` always overwrites, so when two challenge requests race for the same
/// user the last one stored is the only one that can be verified.
#[async_trait]
pub trait ChallengeStore: Send + Sync + 'static {
    async fn put(&self, pending: PendingChallenge) -> AppResult<()>;

    /// Remove and return the user's live challenge. Expired slots are
    /// dropped and reported as `None`.
    async fn take(&self, user_id: &str) -> AppResult<Option<PendingChallenge>>;

    /// Drop every expired slot, returning how many were removed.
    async fn purge_expired(&self) -> AppResult<usize>;
}

pub struct MemoryChallengeStore {
    slots: Mutex<HashMap<String, PendingChallenge>>,
}

impl MemoryChallengeStore {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryChallengeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChallengeStore for MemoryChallengeStore {
    async fn put(&self, pending: PendingChallenge) -> AppResult<()> {
        let mut slots = self.slots.lock().await;
        if let Some(previous) = slots.insert(pending.user_id.clone(), pending) {
            tracing::debug!(
                user_id = %previous.user_id,
                kind = %previous.kind,
                "Replaced unanswered challenge"
            );
        }
        Ok(())
    }

    async fn take(&self, user_id: &str) -> AppResult<Option<PendingChallenge>> {
        let pending = self.slots.lock().await.remove(user_id);

        match pending {
            Some(pending) if pending.is_expired() => {
                tracing::debug!(user_id, kind = %pending.kind, "Challenge expired");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn purge_expired(&self) -> AppResult<usize> {
        let now = Utc::now();
        let mut slots = self.slots.lock().await;
        let before = slots.len();
        slots.retain(|_, pending| !pending.is_expired_at(now));
        Ok(before - slots.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::models::CeremonyKind;
    use chrono::Duration;

    fn pending(user_id: &str, challenge: &str, ttl: Duration) -> PendingChallenge {
        PendingChallenge::new(
            user_id.to_string(),
            CeremonyKind::Registration,
            challenge.to_string(),
            challenge.as_bytes().to_vec(),
            ttl,
        )
    }

    #[tokio::test]
    async fn take_is_single_use() {
        let store = MemoryChallengeStore::new();
        store
            .put(pending("user_a", "c1", Duration::minutes(5)))
            .await
            .unwrap();

        let first = store.take("user_a").await.unwrap();
        assert_eq!(first.map(|p| p.challenge), Some("c1".to_string()));
        assert!(store.take("user_a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn last_put_wins() {
        let store = MemoryChallengeStore::new();
        store
            .put(pending("user_a", "c1", Duration::minutes(5)))
            .await
            .unwrap();
        store
            .put(pending("user_a", "c2", Duration::minutes(5)))
            .await
            .unwrap();

        let taken = store.take("user_a").await.unwrap().unwrap();
        assert_eq!(taken.challenge, "c2");
        assert_eq!(taken.state, b"c2".to_vec());
    }

    #[tokio::test]
    async fn slots_are_per_user() {
        let store = MemoryChallengeStore::new();
        store
            .put(pending("user_a", "ca", Duration::minutes(5)))
            .await
            .unwrap();
        store
            .put(pending("user_b", "cb", Duration::minutes(5)))
            .await
            .unwrap();

        assert_eq!(store.take("user_b").await.unwrap().unwrap().challenge, "cb");
        assert_eq!(store.take("user_a").await.unwrap().unwrap().challenge, "ca");
    }

    #[tokio::test]
    async fn expired_challenge_is_not_returned() {
        let store = MemoryChallengeStore::new();
        store
            .put(pending("user_a", "old", Duration::seconds(-1)))
            .await
            .unwrap();

        assert!(store.take("user_a").await.unwrap().is_none());
        assert_eq!(store.purge_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn purge_removes_only_expired_slots() {
        let store = MemoryChallengeStore::new();
        store
            .put(pending("user_old", "old", Duration::seconds(-1)))
            .await
            .unwrap();
        store
            .put(pending("user_new", "new", Duration::minutes(5)))
            .await
            .unwrap();

        assert_eq!(store.purge_expired().await.unwrap(), 1);
        assert!(store.take("user_old").await.unwrap().is_none());
        assert_eq!(store.take("user_new").await.unwrap().unwrap().challenge, "new");
    }
}
