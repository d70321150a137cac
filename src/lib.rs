//! CRUD REST API for a `users` table: five data-access operations behind
//! `/api/v1/users`, answering with `{status, data}` / `{status, message}`
//! envelopes.

pub mod app;
pub mod config;
pub mod error;
pub mod response;
pub mod state;
pub mod users;
