//! Whole-collection persistence for users.
//!
//! There is no per-record primitive: callers load the full collection, modify
//! it in memory and save it back. That cycle is not atomic. Two overlapping
//! requests can both load the same snapshot, and whichever saves last wins,
//! discarding the other's change (lost update). No lock is taken here.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::dto::User;
use crate::storage::KeyValueStore;

/// Store key holding the serialized collection.
pub const USERS_KEY: &str = "users";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Full collection; empty if nothing was ever stored.
    async fn load_all(&self) -> anyhow::Result<Vec<User>>;
    /// Replace the stored collection with `users`.
    async fn save_all(&self, users: &[User]) -> anyhow::Result<()>;
}

#[derive(Clone)]
pub struct StoreUserRepository {
    store: Arc<dyn KeyValueStore>,
}

impl StoreUserRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn load_all(&self) -> anyhow::Result<Vec<User>> {
        let users: Vec<User> = match self.store.get(USERS_KEY).await? {
            None | Some(Value::Null) => Vec::new(),
            Some(value) => serde_json::from_value(value).context("decode users collection")?,
        };
        debug!(count = users.len(), "users collection loaded");
        Ok(users)
    }

    async fn save_all(&self, users: &[User]) -> anyhow::Result<()> {
        let value = serde_json::to_value(users).context("encode users collection")?;
        self.store.set(USERS_KEY, value).await?;
        debug!(count = users.len(), "users collection saved");
        Ok(())
    }
}

/// In-memory repository that counts saves, for asserting that failed
/// requests leave storage alone.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingRepository {
    users: tokio::sync::Mutex<Vec<User>>,
    saves: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl RecordingRepository {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: tokio::sync::Mutex::new(users),
            saves: Default::default(),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> Vec<User> {
        self.users.lock().await.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl UserRepository for RecordingRepository {
    async fn load_all(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.users.lock().await.clone())
    }

    async fn save_all(&self, users: &[User]) -> anyhow::Result<()> {
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        *self.users.lock().await = users.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod repo_tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;
    use time::macros::datetime;

    fn user(id: &str) -> User {
        User {
            id: id.into(),
            email: format!("testuser{id}@test.com"),
            given_name: format!("test{id}"),
            family_name: format!("user{id}"),
            created: datetime!(2017-07-31 11:20:59.489 UTC),
            updated: None,
        }
    }

    fn repo_over(store: Arc<MemoryStore>) -> StoreUserRepository {
        StoreUserRepository::new(store)
    }

    #[tokio::test]
    async fn empty_store_loads_empty_collection() {
        let repo = repo_over(Arc::new(MemoryStore::new()));
        assert!(repo.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn null_value_loads_empty_collection() {
        let store = Arc::new(MemoryStore::new());
        store.set(USERS_KEY, Value::Null).await.unwrap();
        assert!(repo_over(store).load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_keeps_order_and_layout() {
        let store = Arc::new(MemoryStore::new());
        let repo = repo_over(store.clone());

        repo.save_all(&[user("2"), user("1")]).await.unwrap();

        let loaded = repo.load_all().await.unwrap();
        assert_eq!(loaded, vec![user("2"), user("1")]);

        let raw = store.get(USERS_KEY).await.unwrap().unwrap();
        assert_eq!(
            raw[1],
            json!({
                "id": "1",
                "email": "testuser1@test.com",
                "givenName": "test1",
                "familyName": "user1",
                "created": "2017-07-31T11:20:59.489Z",
            })
        );
    }

    #[tokio::test]
    async fn malformed_collection_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        store.set(USERS_KEY, json!({"not": "a list"})).await.unwrap();

        let err = repo_over(store).load_all().await.unwrap_err();
        assert!(err.to_string().contains("decode users collection"));
    }

    #[tokio::test]
    async fn overlapping_cycles_lose_the_earlier_write() {
        let repo = repo_over(Arc::new(MemoryStore::new()));
        repo.save_all(&[user("1")]).await.unwrap();

        let mut first = repo.load_all().await.unwrap();
        let mut second = repo.load_all().await.unwrap();
        first.push(user("2"));
        second.push(user("3"));
        repo.save_all(&first).await.unwrap();
        repo.save_all(&second).await.unwrap();

        let ids: Vec<String> = repo
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
