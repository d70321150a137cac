use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{ApiError, ApiResult},
    response::{created, success, success_one, Envelope},
    state::AppState,
    users::{
        dto::{CreateUserRequest, UpdateUserRequest},
        repo_types::User,
        services,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

fn user_id(path: Result<Path<i32>, PathRejection>) -> ApiResult<i32> {
    path.map(|Path(id)| id).map_err(|e| {
        warn!(error = %e, "invalid user id in path");
        ApiError::BadRequest("User id must be an integer.".into())
    })
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    body.map(|Json(v)| v).map_err(|e| {
        warn!(error = %e, "rejected request body");
        ApiError::BadRequest(e.body_text())
    })
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Envelope<User>> {
    let users = services::list_users(&state).await?;
    Ok(success(users))
}

#[instrument(skip(state, path))]
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Envelope<User>> {
    let id = user_id(path)?;
    let user = services::get_user(&state, id).await?;
    Ok(success_one(user))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<Envelope<User>> {
    let req = json_body(payload)?;
    let user = services::create_user(&state, req).await?;
    info!(user_id = user.id, username = %user.username, "user created");
    Ok(created(user))
}

#[instrument(skip(state, path, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<Envelope<User>> {
    let id = user_id(path)?;
    let req = json_body(payload)?;
    let user = services::update_user(&state, id, req).await?;
    info!(user_id = user.id, "user updated");
    Ok(success_one(user))
}

#[instrument(skip(state, path))]
pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i32>, PathRejection>,
) -> ApiResult<Envelope<User>> {
    let id = user_id(path)?;
    let user = services::delete_user(&state, id).await?;
    info!(user_id = user.id, "user deleted");
    Ok(success_one(user))
}
