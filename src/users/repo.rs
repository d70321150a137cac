use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::repo_types::{NewUser, User, UserChanges};

/// Data access for the `users` table. One statement per call; a missing row is
/// `Ok(None)`, never an error.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn get(&self, id: i32) -> anyhow::Result<Option<User>>;
    async fn create(&self, user: NewUser) -> anyhow::Result<User>;
    async fn update(&self, id: i32, changes: UserChanges) -> anyhow::Result<Option<User>>;
    async fn delete(&self, id: i32) -> anyhow::Result<Option<User>>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows)
    }

    async fn get(&self, id: i32) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get user")?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password
            "#,
        )
        .bind(&user.username)
        .bind(user.email.as_deref()) // Option<&str> → NULL allowed
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .context("insert user")?;
        Ok(created)
    }

    async fn update(&self, id: i32, changes: UserChanges) -> anyhow::Result<Option<User>> {
        // COALESCE keeps the stored value for every column left out of the patch
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET username = COALESCE($2, username),
                   email    = COALESCE($3, email),
                   password = COALESCE($4, password)
             WHERE id = $1
            RETURNING id, username, email, password
            "#,
        )
        .bind(id)
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.password_hash.as_deref())
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> anyhow::Result<Option<User>> {
        let deleted = sqlx::query_as::<_, User>(
            r#"
            DELETE FROM users
             WHERE id = $1
            RETURNING id, username, email, password
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("delete user")?;
        Ok(deleted)
    }
}
