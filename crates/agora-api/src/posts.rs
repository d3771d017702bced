//! Handlers for `/posts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/posts` | All posts, id order |
//! | `POST` | `/posts` | Body: [`NewPost`]; 400 if both media fields are set |
//! | `GET`  | `/posts/:id` | Single post |
//! | `POST` | `/posts/:id/vote` | Body: [`VoteBody`]; returns the new score |
//! | `GET`  | `/posts/:id/comments` | Top-level comments, creation order |
//! | `GET`  | `/posts/:id/top-comments` | `?n=`; ranked, each with direct replies |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use agora_core::{
  comment::{Comment, Parent},
  post::{NewPost, Post, PostId},
  rank::{CommentWithReplies, top_comments},
  store::ForumStore,
  vote::{VoteDirection, VoteTarget},
};
use serde::Deserialize;

use crate::{AppState, ScoreBody, VoteBody, error::ApiError, width};

// ─── Create / read ────────────────────────────────────────────────────────────

/// `POST /posts` — returns 201 + the stored post.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewPost>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let post = state.store.create_post(body)?;
  Ok((StatusCode::CREATED, Json(post)))
}

/// `GET /posts`
pub async fn list<S>(State(state): State<AppState<S>>) -> Json<Vec<Post>>
where
  S: ForumStore,
{
  Json(state.store.list_posts())
}

/// `GET /posts/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PostId>,
) -> Result<Json<Post>, ApiError>
where
  S: ForumStore,
{
  let post = state
    .store
    .get_post(id)
    .ok_or_else(|| ApiError::NotFound(format!("post {id} not found")))?;
  Ok(Json(post))
}

// ─── Vote ─────────────────────────────────────────────────────────────────────

/// `POST /posts/:id/vote` — body: `{"direction":"up"}`
pub async fn vote<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PostId>,
  Json(body): Json<VoteBody>,
) -> Result<Json<ScoreBody>, ApiError>
where
  S: ForumStore,
{
  let direction: VoteDirection = body.direction.parse()?;
  let score = state.store.apply_vote(VoteTarget::Post(id), direction)?;
  Ok(Json(ScoreBody { score }))
}

// ─── Comments ─────────────────────────────────────────────────────────────────

/// `GET /posts/:id/comments`
pub async fn comments<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PostId>,
) -> Result<Json<Vec<Comment>>, ApiError>
where
  S: ForumStore,
{
  if state.store.get_post(id).is_none() {
    return Err(ApiError::NotFound(format!("post {id} not found")));
  }
  Ok(Json(state.store.children_of(Parent::Post(id))))
}

#[derive(Debug, Deserialize)]
pub struct TopParams {
  /// How many top-level comments to return. Negative values mean none.
  #[serde(default = "default_top")]
  pub n: i64,
}

fn default_top() -> i64 { 10 }

/// `GET /posts/:id/top-comments[?n=<count>]`
pub async fn top<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<PostId>,
  Query(params): Query<TopParams>,
) -> Result<Json<Vec<CommentWithReplies>>, ApiError>
where
  S: ForumStore,
{
  let top = top_comments(&*state.store, id, width(params.n))?;
  Ok(Json(top))
}
