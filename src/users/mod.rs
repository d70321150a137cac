use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
mod memory;
pub mod password;
mod repo;
pub mod repo_types;
pub mod services;

pub use memory::MemoryUserStore;
pub use repo::{PgUserStore, UserStore};
pub use repo_types::{NewUser, User, UserChanges};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::user_routes())
}
