use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

use crate::models::Status;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden")
    }

    pub fn internal<E: Display>(error: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Failure inside the persistence gateway. The transaction has been rolled back.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("database pool error: {0}")]
    Pool(String),
    #[error("database task failed: {0}")]
    Task(String),
    /// The student already holds a draft; nothing was written.
    #[error("student already holds a draft appeal")]
    DraftConflict,
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Failure talking to the messaging platform.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("vk api error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("unexpected vk response: {0}")]
    UnexpectedResponse(String),
}

#[derive(Debug, Error)]
pub enum AppealError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("appeal {0} not found")]
    NotFound(i32),
    #[error("appeal {0} already answered")]
    AlreadyAnswered(i32),
    #[error("appeal {id} cannot move from {from} to {to}")]
    InvalidTransition { id: i32, from: Status, to: Status },
    #[error("student already has draft appeal {0}")]
    DraftPending(i32),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type AppealResult<T> = Result<T, AppealError>;
