use crate::error::{AppError, AppResult};
use crate::store::models::{StoredPasskey, User};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Insert or replace a user record.
    async fn put(&self, user: User) -> AppResult<()>;

    /// Look up a user by id.
    async fn get(&self, user_id: &str) -> AppResult<Option<User>>;

    /// Attach a passkey to an existing user, replacing any earlier one.
    async fn set_passkey(&self, user_id: &str, passkey: StoredPasskey) -> AppResult<()>;

    /// Record a successful login: new signature counter and, when the
    /// credential changed, its re-serialized form.
    ///
    /// Only applies while `credential_id` is still the stored passkey; a
    /// passkey replaced since the login was verified is left alone and
    /// `Ok(false)` is returned.
    async fn touch_passkey(
        &self,
        user_id: &str,
        credential_id: &str,
        counter: u32,
        data: Option<Vec<u8>>,
    ) -> AppResult<bool>;
}

pub struct MemoryUserStore {
    entries: Mutex<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn put(&self, user: User) -> AppResult<()> {
        self.entries.lock().await.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get(&self, user_id: &str) -> AppResult<Option<User>> {
        Ok(self.entries.lock().await.get(user_id).cloned())
    }

    async fn set_passkey(&self, user_id: &str, passkey: StoredPasskey) -> AppResult<()> {
        let mut entries = self.entries.lock().await;
        let user = entries.get_mut(user_id).ok_or(AppError::UserNotFound)?;
        user.passkey = Some(passkey);
        Ok(())
    }

    async fn touch_passkey(
        &self,
        user_id: &str,
        credential_id: &str,
        counter: u32,
        data: Option<Vec<u8>>,
    ) -> AppResult<bool> {
        let mut entries = self.entries.lock().await;
        let user = entries.get_mut(user_id).ok_or(AppError::UserNotFound)?;
        let passkey = user
            .passkey
            .as_mut()
            .ok_or_else(|| AppError::Internal(format!("user {user_id} has no passkey")))?;

        if passkey.credential_id != credential_id {
            return Ok(false);
        }

        passkey.counter = counter;
        passkey.last_used_at = Some(Utc::now());
        if let Some(data) = data {
            passkey.data = data;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_the_record() {
        let store = MemoryUserStore::new();
        let user = User::new("alice".to_string(), "x".to_string());
        let id = user.id.clone();

        store.put(user).await.unwrap();

        let found = store.get(&id).await.unwrap().unwrap();
        assert_eq!(found.username, "alice");
        assert!(store.get("user_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_passkey_replaces_previous_credential() {
        let store = MemoryUserStore::new();
        let user = User::new("bob".to_string(), "x".to_string());
        let id = user.id.clone();
        store.put(user).await.unwrap();

        store
            .set_passkey(&id, StoredPasskey::new("cred-1".to_string(), vec![1]))
            .await
            .unwrap();
        store
            .set_passkey(&id, StoredPasskey::new("cred-2".to_string(), vec![2]))
            .await
            .unwrap();

        let passkey = store.get(&id).await.unwrap().unwrap().passkey.unwrap();
        assert_eq!(passkey.credential_id, "cred-2");
        assert_eq!(passkey.data, vec![2]);
    }

    #[tokio::test]
    async fn set_passkey_on_unknown_user_is_not_found() {
        let store = MemoryUserStore::new();

        let err = store
            .set_passkey("user_missing", StoredPasskey::new("c".to_string(), vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound));
    }

    #[tokio::test]
    async fn touch_passkey_updates_counter_and_last_use() {
        let store = MemoryUserStore::new();
        let user = User::new("carol".to_string(), "x".to_string());
        let id = user.id.clone();
        store.put(user).await.unwrap();
        store
            .set_passkey(&id, StoredPasskey::new("cred".to_string(), vec![1]))
            .await
            .unwrap();

        assert!(store.touch_passkey(&id, "cred", 7, None).await.unwrap());
        let passkey = store.get(&id).await.unwrap().unwrap().passkey.unwrap();
        assert_eq!(passkey.counter, 7);
        assert_eq!(passkey.data, vec![1]);
        assert!(passkey.last_used_at.is_some());

        assert!(store
            .touch_passkey(&id, "cred", 8, Some(vec![9]))
            .await
            .unwrap());
        let passkey = store.get(&id).await.unwrap().unwrap().passkey.unwrap();
        assert_eq!(passkey.counter, 8);
        assert_eq!(passkey.data, vec![9]);
    }

    #[tokio::test]
    async fn touch_passkey_without_credential_fails() {
        let store = MemoryUserStore::new();
        let user = User::new("dave".to_string(), "x".to_string());
        let id = user.id.clone();
        store.put(user).await.unwrap();

        let err = store.touch_passkey(&id, "cred", 1, None).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn touch_passkey_ignores_a_replaced_credential() {
        let store = MemoryUserStore::new();
        let user = User::new("erin".to_string(), "x".to_string());
        let id = user.id.clone();
        store.put(user).await.unwrap();
        store
            .set_passkey(&id, StoredPasskey::new("cred-old".to_string(), vec![1]))
            .await
            .unwrap();

        // Re-registration lands while a login with the old credential is in flight
        let mut replacement = StoredPasskey::new("cred-new".to_string(), vec![2]);
        replacement.counter = 100;
        store.set_passkey(&id, replacement).await.unwrap();

        let applied = store
            .touch_passkey(&id, "cred-old", 1, Some(vec![9]))
            .await
            .unwrap();

        assert!(!applied);
        let passkey = store.get(&id).await.unwrap().unwrap().passkey.unwrap();
        assert_eq!(passkey.credential_id, "cred-new");
        assert_eq!(passkey.counter, 100);
        assert_eq!(passkey.data, vec![2]);
        assert!(passkey.last_used_at.is_none());
    }
}
