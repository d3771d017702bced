//! JSON API for Agora.
//!
//! Exposes an axum [`Router`] backed by any [`agora_core::store::ForumStore`].
//! TLS and process concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = agora_api::api_router(AppState::new(store, BranchLimits::default()));
//! ```

pub mod comments;
pub mod error;
pub mod feed;
pub mod posts;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use agora_core::{branch::DEFAULT_DEPTH, store::ForumStore};
use serde::{Deserialize, Serialize};

pub use error::ApiError;
pub use feed::BroadcastSink;

// ─── State ────────────────────────────────────────────────────────────────────

/// Bounds on `GET /comments/:id/branch`. Expansion cost is
/// `n ^ depth`, so both are capped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct BranchLimits {
  pub default_depth: usize,
  pub max_depth:     usize,
  pub max_width:     usize,
}

impl Default for BranchLimits {
  fn default() -> Self {
    Self {
      default_depth: DEFAULT_DEPTH,
      max_depth:     8,
      max_width:     100,
    }
  }
}

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub limits: BranchLimits,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, limits: BranchLimits) -> Self { Self { store, limits } }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      limits: self.limits,
    }
  }
}

// ─── Shared bodies ────────────────────────────────────────────────────────────

/// Body of `POST /posts/:id/vote` and `POST /comments/:id/vote`.
///
/// The direction is parsed by hand so an unknown value surfaces as a 400
/// with a readable message.
#[derive(Debug, Deserialize, Serialize)]
pub struct VoteBody {
  pub direction: String,
}

/// Response of the vote endpoints.
#[derive(Debug, Deserialize, Serialize)]
pub struct ScoreBody {
  pub score: i64,
}

/// Clamp a client-supplied count; negative means zero.
pub(crate) fn width(n: i64) -> usize { usize::try_from(n).unwrap_or(0) }

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: ForumStore + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::create::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    // Posts
    .route("/posts", get(posts::list::<S>).post(posts::create::<S>))
    .route("/posts/{id}", get(posts::get_one::<S>))
    .route("/posts/{id}/vote", post(posts::vote::<S>))
    .route("/posts/{id}/comments", get(posts::comments::<S>))
    .route("/posts/{id}/top-comments", get(posts::top::<S>))
    // Comments
    .route("/comments", post(comments::create::<S>))
    .route("/comments/{id}", get(comments::get_one::<S>))
    .route("/comments/{id}/vote", post(comments::vote::<S>))
    .route("/comments/{id}/branch", get(comments::branch::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use agora_store_memory::MemoryStore;
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  fn app() -> Router {
    api_router(AppState::new(
      Arc::new(MemoryStore::new()),
      BranchLimits::default(),
    ))
  }

  async fn call(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
  }

  async fn create_post(app: &Router) -> u64 {
    let (status, post) = call(
      app,
      "POST",
      "/posts",
      Some(json!({ "title": "Sample Post", "content": "This is a sample post" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    post["post_id"].as_u64().unwrap()
  }

  async fn create_comment(app: &Router, parent: Value, text: &str) -> u64 {
    let mut body = json!({ "content": text, "author_id": "user1" });
    body
      .as_object_mut()
      .unwrap()
      .extend(parent.as_object().unwrap().clone());
    let (status, comment) = call(app, "POST", "/comments", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{comment}");
    comment["comment_id"].as_u64().unwrap()
  }

  async fn vote(app: &Router, uri: &str, direction: &str) -> (StatusCode, Value) {
    call(app, "POST", uri, Some(json!({ "direction": direction }))).await
  }

  // ── Users ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn user_create_get_and_conflict() {
    let app = app();
    let user = json!({ "user_id": "u1", "username": "alice", "email": "a@x.io" });
    let (status, _) = call(&app, "POST", "/users", Some(user.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(&app, "POST", "/users", Some(user)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, "GET", "/users/u1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");

    let (status, body) = call(&app, "GET", "/users/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "user not found: nobody");
  }

  // ── Posts ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn post_create_get_list() {
    let app = app();
    let id = create_post(&app).await;

    let (status, post) = call(&app, "GET", &format!("/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["title"], "Sample Post");
    assert_eq!(post["score"], 0);
    assert_eq!(post["state"], "normal");
    assert_eq!(post["media"], Value::Null);

    create_post(&app).await;
    let (_, all) = call(&app, "GET", "/posts", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn post_with_two_media_is_bad_request() {
    let app = app();
    let (status, body) = call(
      &app,
      "POST",
      "/posts",
      Some(json!({
        "title": "t", "content": "c",
        "image_url": "a.png", "video_url": "b.mp4",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("not both"));
  }

  #[tokio::test]
  async fn missing_post_is_404() {
    let app = app();
    let (status, body) = call(&app, "GET", "/posts/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = call(&app, "GET", "/posts/7/top-comments?n=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, "GET", "/posts/7/comments", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = vote(&app, "/posts/7/vote", "up").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn vote_post_returns_new_score() {
    let app = app();
    let id = create_post(&app).await;
    let uri = format!("/posts/{id}/vote");

    let (_, body) = vote(&app, &uri, "up").await;
    assert_eq!(body["score"], 1);
    let (_, body) = vote(&app, &uri, "down").await;
    let (_, body2) = vote(&app, &uri, "down").await;
    assert_eq!(body["score"], 0);
    assert_eq!(body2["score"], -1);

    let (status, _) = vote(&app, &uri, "sideways").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  // ── Comments ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn comment_parent_rules() {
    let app = app();
    let post_id = create_post(&app).await;

    let (status, _) = call(
      &app,
      "POST",
      "/comments",
      Some(json!({ "content": "x", "author_id": "u", "comment_id": 99 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
      &app,
      "POST",
      "/comments",
      Some(json!({
        "content": "x", "author_id": "u", "post_id": post_id, "comment_id": 1,
      })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
      &app,
      "POST",
      "/comments",
      Some(json!({ "content": "x", "author_id": "u" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn comment_get_and_list() {
    let app = app();
    let post_id = create_post(&app).await;
    let a = create_comment(&app, json!({ "post_id": post_id }), "a").await;
    create_comment(&app, json!({ "comment_id": a }), "reply").await;

    let (status, c) = call(&app, "GET", &format!("/comments/{a}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(c["parent"], json!({ "kind": "post", "id": post_id }));
    assert_eq!(c["author"], "user1");

    let (_, list) = call(&app, "GET", &format!("/posts/{post_id}/comments"), None).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["comment_id"].as_u64(), Some(a));
  }

  #[tokio::test]
  async fn top_comments_and_branch_scenario() {
    let app = app();
    let p = create_post(&app).await;
    let a = create_comment(&app, json!({ "post_id": p }), "A").await;
    let _b = create_comment(&app, json!({ "post_id": p }), "B").await;
    let c = create_comment(&app, json!({ "comment_id": a }), "C").await;
    vote(&app, &format!("/comments/{a}/vote"), "up").await;
    vote(&app, &format!("/comments/{a}/vote"), "up").await;
    vote(&app, &format!("/comments/{c}/vote"), "up").await;

    let (status, top) =
      call(&app, "GET", &format!("/posts/{p}/top-comments?n=1"), None).await;
    assert_eq!(status, StatusCode::OK);
    let top = top.as_array().unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0]["comment"]["comment_id"].as_u64(), Some(a));
    assert_eq!(top[0]["comment"]["score"], 2);
    assert_eq!(top[0]["replies"][0]["comment_id"].as_u64(), Some(c));

    let (status, tree) =
      call(&app, "GET", &format!("/comments/{a}/branch?n=1&depth=2"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree["comment"]["comment_id"].as_u64(), Some(a));
    assert_eq!(tree["replies"][0]["comment"]["comment_id"].as_u64(), Some(c));
    assert_eq!(tree["replies"][0]["replies"], json!([]));

    let (_, none) =
      call(&app, "GET", &format!("/posts/{p}/top-comments?n=-4"), None).await;
    assert_eq!(none, json!([]));
  }

  #[tokio::test]
  async fn branch_bounds_and_missing_root() {
    let app = app();
    let p = create_post(&app).await;
    let a = create_comment(&app, json!({ "post_id": p }), "A").await;

    let (status, tree) = call(&app, "GET", &format!("/comments/{a}/branch"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tree["replies"], json!([]));

    let (status, _) =
      call(&app, "GET", &format!("/comments/{a}/branch?depth=9"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) =
      call(&app, "GET", &format!("/comments/{a}/branch?n=101"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&app, "GET", "/comments/404/branch", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
