//! Response envelopes shared by every route.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    pub status: Status,
    pub data: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub status: Status,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
        }
    }
}

pub type Envelope<T> = (StatusCode, Json<DataEnvelope<T>>);

pub fn success<T: Serialize>(data: Vec<T>) -> Envelope<T> {
    (
        StatusCode::OK,
        Json(DataEnvelope {
            status: Status::Success,
            data,
        }),
    )
}

pub fn success_one<T: Serialize>(item: T) -> Envelope<T> {
    success(vec![item])
}

pub fn created<T: Serialize>(item: T) -> Envelope<T> {
    (
        StatusCode::CREATED,
        Json(DataEnvelope {
            status: Status::Success,
            data: vec![item],
        }),
    )
}
