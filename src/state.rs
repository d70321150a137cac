use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::users::{MemoryUserStore, PgUserStore, UserStore};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub request_timeout: Duration,
}

impl AppState {
    /// Connects the pool and wires the Postgres-backed store. The pool is
    /// returned as well so the caller can run migrations against it.
    pub async fn init(config: &AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let db = PgPoolOptions::new()
            .max_connections(config.db.max_connections)
            .acquire_timeout(Duration::from_secs(config.db.acquire_timeout_secs))
            .connect(&config.db.url)
            .await
            .context("connect to database")?;

        let users = Arc::new(PgUserStore::new(db.clone())) as Arc<dyn UserStore>;
        Ok((Self::from_parts(users, config.request_timeout()), db))
    }

    pub fn from_parts(users: Arc<dyn UserStore>, request_timeout: Duration) -> Self {
        Self {
            users,
            request_timeout,
        }
    }

    pub fn in_memory(store: MemoryUserStore) -> Self {
        Self::from_parts(Arc::new(store), DEFAULT_REQUEST_TIMEOUT)
    }
}
