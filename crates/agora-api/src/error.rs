//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),
}

impl From<agora_core::Error> for ApiError {
  fn from(e: agora_core::Error) -> Self {
    use agora_core::Error;
    match e {
      Error::PostNotFound(_) | Error::CommentNotFound(_) | Error::UserNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
      Error::Validation(msg) => ApiError::BadRequest(msg),
      Error::DuplicateKey { .. } => ApiError::Conflict(e.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
