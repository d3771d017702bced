//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Body: [`User`]; 409 if the id is taken |
//! | `GET`  | `/users/:id` | 404 if not found |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use agora_core::{
  Error,
  store::ForumStore,
  user::{User, UserId},
};

use crate::{AppState, error::ApiError};

/// `POST /users` — returns 201 + the stored user.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<User>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let user = state.store.create_user(body)?;
  Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<UserId>,
) -> Result<Json<User>, ApiError>
where
  S: ForumStore,
{
  let user = state
    .store
    .get_user(&id)
    .ok_or_else(|| Error::UserNotFound(id.clone()))?;
  Ok(Json(user))
}
