//! Handlers for `/comments` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/comments` | Body: [`CreateBody`]; exactly one of `post_id` / `comment_id` |
//! | `GET`  | `/comments/:id` | Single comment |
//! | `POST` | `/comments/:id/vote` | Body: [`VoteBody`]; returns the new score |
//! | `GET`  | `/comments/:id/branch` | `?n=&depth=`; recursive reply tree |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use agora_core::{
  branch::{BranchShape, CommentTree, expand},
  comment::{Comment, CommentId, NewComment, Parent},
  post::{ContentState, PostId},
  store::ForumStore,
  user::UserId,
  vote::{VoteDirection, VoteTarget},
};
use serde::Deserialize;

use crate::{AppState, ScoreBody, VoteBody, error::ApiError, width};

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /comments`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub content:    String,
  pub author_id:  UserId,
  /// Set for a top-level comment.
  pub post_id:    Option<PostId>,
  /// Set for a reply.
  pub comment_id: Option<CommentId>,
  #[serde(default)]
  pub state:      ContentState,
}

impl TryFrom<CreateBody> for NewComment {
  type Error = agora_core::Error;

  fn try_from(b: CreateBody) -> Result<Self, Self::Error> {
    Ok(NewComment {
      parent:  Parent::from_fields(b.post_id, b.comment_id)?,
      author:  b.author_id,
      content: b.content,
      state:   b.state,
    })
  }
}

/// `POST /comments` — returns 201 + the stored comment.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ForumStore,
{
  let comment = state.store.create_comment(NewComment::try_from(body)?)?;
  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /comments/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<CommentId>,
) -> Result<Json<Comment>, ApiError>
where
  S: ForumStore,
{
  let comment = state
    .store
    .get_comment(id)
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  Ok(Json(comment))
}

// ─── Vote ─────────────────────────────────────────────────────────────────────

/// `POST /comments/:id/vote` — body: `{"direction":"down"}`
pub async fn vote<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<CommentId>,
  Json(body): Json<VoteBody>,
) -> Result<Json<ScoreBody>, ApiError>
where
  S: ForumStore,
{
  let direction: VoteDirection = body.direction.parse()?;
  let score = state.store.apply_vote(VoteTarget::Comment(id), direction)?;
  Ok(Json(ScoreBody { score }))
}

// ─── Branch ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BranchParams {
  /// Replies kept per node. Negative values mean none.
  #[serde(default = "default_width")]
  pub n:     i64,
  /// Reply levels below the root; defaults to the configured depth.
  pub depth: Option<usize>,
}

fn default_width() -> i64 { 10 }

/// `GET /comments/:id/branch[?n=<width>][&depth=<levels>]`
pub async fn branch<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<CommentId>,
  Query(params): Query<BranchParams>,
) -> Result<Json<CommentTree>, ApiError>
where
  S: ForumStore,
{
  let limits = state.limits;
  let depth = params.depth.unwrap_or(limits.default_depth);
  if depth > limits.max_depth {
    return Err(ApiError::BadRequest(format!(
      "depth {depth} exceeds the maximum of {}",
      limits.max_depth
    )));
  }
  let n = width(params.n);
  if n > limits.max_width {
    return Err(ApiError::BadRequest(format!(
      "n {n} exceeds the maximum of {}",
      limits.max_width
    )));
  }

  let tree = expand(
    &*state.store,
    id,
    BranchShape::new(n).with_depth(depth),
  )?;
  Ok(Json(tree))
}
