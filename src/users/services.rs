use std::future::Future;

use tracing::{debug, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::users::dto::{CreateUserRequest, UpdateUserRequest};
use crate::users::password::hash_password;
use crate::users::repo_types::{NewUser, User, UserChanges};

/// Runs one store call under the per-request deadline.
async fn bounded<T, F>(state: &AppState, op: &'static str, fut: F) -> ApiResult<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(state.request_timeout, fut).await {
        Ok(res) => res.map_err(ApiError::from_storage),
        Err(_) => {
            warn!(op, timeout = ?state.request_timeout, "store call timed out");
            Err(ApiError::Timeout)
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub async fn list_users(state: &AppState) -> ApiResult<Vec<User>> {
    bounded(state, "list", state.users.list()).await
}

pub async fn get_user(state: &AppState, id: i32) -> ApiResult<User> {
    bounded(state, "get", state.users.get(id))
        .await?
        .ok_or(ApiError::NotFound)
}

pub async fn create_user(state: &AppState, req: CreateUserRequest) -> ApiResult<User> {
    let username = non_blank(req.username);
    let password = req.password.filter(|p| !p.is_empty());

    let (username, password) = match (username, password) {
        (Some(u), Some(p)) => (u, p),
        (u, p) => {
            let missing: Vec<&str> = [("username", u.is_none()), ("password", p.is_none())]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
            return Err(ApiError::Validation(format!(
                "Missing required field(s): {}",
                missing.join(", ")
            )));
        }
    };

    let new_user = NewUser {
        username,
        email: non_blank(req.email),
        password_hash: hash_password(&password)?,
    };
    let user = bounded(state, "create", state.users.create(new_user)).await?;
    debug!(user_id = user.id, "user created");
    Ok(user)
}

/// Applies a partial update. A `password` in the patch is hashed exactly like
/// on create, so the column never receives plaintext.
pub async fn update_user(state: &AppState, id: i32, req: UpdateUserRequest) -> ApiResult<User> {
    let username = match req.username {
        Some(u) if u.trim().is_empty() => {
            return Err(ApiError::Validation("username must not be blank".into()))
        }
        other => non_blank(other),
    };
    let email = match req.email {
        Some(e) if e.trim().is_empty() => {
            return Err(ApiError::Validation("email must not be blank".into()))
        }
        other => non_blank(other),
    };
    let password_hash = match req.password.as_deref() {
        Some("") => return Err(ApiError::Validation("password must not be empty".into())),
        Some(p) => Some(hash_password(p)?),
        None => None,
    };

    let changes = UserChanges {
        username,
        email,
        password_hash,
    };
    if changes.is_empty() {
        debug!(user_id = id, "empty patch; returning current row");
    }
    bounded(state, "update", state.users.update(id, changes))
        .await?
        .ok_or(ApiError::NotFound)
}

pub async fn delete_user(state: &AppState, id: i32) -> ApiResult<User> {
    bounded(state, "delete", state.users.delete(id))
        .await?
        .ok_or(ApiError::NotFound)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::users::password::verify_password;
    use crate::users::{MemoryUserStore, UserStore};

    fn state() -> AppState {
        AppState::in_memory(MemoryUserStore::new())
    }

    fn john() -> CreateUserRequest {
        CreateUserRequest {
            username: Some("John Grey".into()),
            email: Some("johngrey@gmail.com".into()),
            password: Some("123456".into()),
        }
    }

    #[tokio::test]
    async fn create_hashes_password() {
        let state = state();
        let user = create_user(&state, john()).await.unwrap();
        assert_ne!(user.password, "123456");
        assert!(verify_password("123456", &user.password).unwrap());
        assert!(!verify_password("654321", &user.password).unwrap());

        let fetched = get_user(&state, user.id).await.unwrap();
        assert_eq!(fetched, user);
    }

    #[tokio::test]
    async fn create_reports_missing_fields() {
        let req = CreateUserRequest {
            username: Some("John Grey".into()),
            ..Default::default()
        };
        match create_user(&state(), req).await {
            Err(ApiError::Validation(msg)) => {
                assert_eq!(msg, "Missing required field(s): password")
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        match create_user(&state(), CreateUserRequest::default()).await {
            Err(ApiError::Validation(msg)) => assert!(msg.contains("username, password")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_treats_blank_email_as_absent() {
        let mut req = john();
        req.email = Some("   ".into());
        let user = create_user(&state(), req).await.unwrap();
        assert_eq!(user.email, None);
    }

    #[tokio::test]
    async fn update_rehashes_password() {
        let state = state();
        let user = create_user(&state, john()).await.unwrap();
        let req = UpdateUserRequest {
            password: Some("new-secret".into()),
            ..Default::default()
        };
        let updated = update_user(&state, user.id, req).await.unwrap();
        assert_ne!(updated.password, "new-secret");
        assert!(verify_password("new-secret", &updated.password).unwrap());
        assert!(!verify_password("123456", &updated.password).unwrap());
        assert_eq!(updated.username, user.username);
        assert_eq!(updated.email, user.email);
    }

    #[tokio::test]
    async fn update_rejects_blank_username() {
        let state = state();
        let user = create_user(&state, john()).await.unwrap();
        let req = UpdateUserRequest {
            username: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            update_user(&state, user.id, req).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let state = state();
        assert!(matches!(get_user(&state, 9999999).await, Err(ApiError::NotFound)));
        assert!(matches!(
            update_user(&state, 9999999, UpdateUserRequest::default()).await,
            Err(ApiError::NotFound)
        ));
        assert!(matches!(delete_user(&state, 9999999).await, Err(ApiError::NotFound)));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let state = state();
        let user = create_user(&state, john()).await.unwrap();
        let before = list_users(&state).await.unwrap().len();
        let deleted = delete_user(&state, user.id).await.unwrap();
        assert_eq!(deleted.id, user.id);
        assert_eq!(list_users(&state).await.unwrap().len(), before - 1);
        assert!(matches!(get_user(&state, user.id).await, Err(ApiError::NotFound)));
    }

    struct SlowStore;

    #[async_trait]
    impl UserStore for SlowStore {
        async fn list(&self) -> anyhow::Result<Vec<User>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }
        async fn get(&self, _id: i32) -> anyhow::Result<Option<User>> {
            Ok(None)
        }
        async fn create(&self, _user: NewUser) -> anyhow::Result<User> {
            anyhow::bail!("not used")
        }
        async fn update(&self, _id: i32, _c: UserChanges) -> anyhow::Result<Option<User>> {
            Ok(None)
        }
        async fn delete(&self, _id: i32) -> anyhow::Result<Option<User>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn slow_store_times_out() {
        let state = AppState::from_parts(Arc::new(SlowStore), Duration::from_millis(20));
        assert!(matches!(list_users(&state).await, Err(ApiError::Timeout)));
    }
}
