use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User, UserChanges};

/// In-process store for tests and local runs without Postgres.
#[derive(Debug, Clone)]
pub struct MemoryUserStore {
    users: Arc<RwLock<BTreeMap<i32, User>>>,
    next_id: Arc<AtomicI32>,
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self {
            users: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI32::new(1)),
        }
    }
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store; ids are assigned in order starting at 1.
    pub fn with_users(users: impl IntoIterator<Item = NewUser>) -> Self {
        let mut map = BTreeMap::new();
        let mut next_id = 1;
        for user in users {
            map.insert(next_id, into_row(next_id, user));
            next_id += 1;
        }
        Self {
            users: Arc::new(RwLock::new(map)),
            next_id: Arc::new(AtomicI32::new(next_id)),
        }
    }
}

fn into_row(id: i32, user: NewUser) -> User {
    User {
        id,
        username: user.username,
        email: user.email,
        password: user.password_hash,
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn get(&self, id: i32) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let row = into_row(self.next_id.fetch_add(1, Ordering::SeqCst), user);
        self.users.write().await.insert(row.id, row.clone());
        tracing::debug!(user_id = row.id, "created user in memory");
        Ok(row)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> anyhow::Result<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        changes.apply(user);
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: i32) -> anyhow::Result<Option<User>> {
        Ok(self.users.write().await.remove(&id))
    }
}
