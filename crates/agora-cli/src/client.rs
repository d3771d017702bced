//! Async HTTP client wrapping the Agora JSON API.

use std::time::Duration;

use agora_core::{
  branch::CommentTree,
  comment::{Comment, CommentId, Parent},
  post::{NewPost, Post, PostId},
  rank::CommentWithReplies,
  user::{User, UserId},
  vote::{VoteDirection, VoteTarget},
};
use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Method, RequestBuilder};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

/// Connection settings for the Agora API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

#[derive(Deserialize)]
struct ScoreBody {
  score: i64,
}

#[derive(Serialize)]
struct NewCommentBody<'a> {
  content:    &'a str,
  author_id:  &'a UserId,
  #[serde(skip_serializing_if = "Option::is_none")]
  post_id:    Option<PostId>,
  #[serde(skip_serializing_if = "Option::is_none")]
  comment_id: Option<CommentId>,
}

/// Async HTTP client for the Agora JSON API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// Send `req` and decode a JSON body, turning non-2xx replies into errors
  /// that carry the server's message.
  async fn send<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    req: RequestBuilder,
  ) -> Result<T> {
    tracing::debug!(%method, path, "request");
    let resp = req
      .send()
      .await
      .with_context(|| format!("{method} {path} failed"))?;

    let status = resp.status();
    if !status.is_success() {
      let message = resp
        .json::<Value>()
        .await
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_owned))
        .unwrap_or_default();
      return Err(anyhow!("{method} {path} → {status} {message}"));
    }
    resp
      .json()
      .await
      .with_context(|| format!("deserialising {method} {path}"))
  }

  async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
    let req = self.client.get(self.url(path));
    self.send(Method::GET, path, req).await
  }

  async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
    &self,
    path: &str,
    body: &B,
  ) -> Result<T> {
    let req = self.client.post(self.url(path)).json(body);
    self.send(Method::POST, path, req).await
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  /// `POST /users`
  pub async fn create_user(&self, user: &User) -> Result<User> {
    self.post("/users", user).await
  }

  /// `GET /users/:id`
  pub async fn get_user(&self, id: &UserId) -> Result<User> {
    self.get(&format!("/users/{id}")).await
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  /// `POST /posts`
  pub async fn create_post(&self, post: &NewPost) -> Result<Post> {
    self.post("/posts", post).await
  }

  /// `GET /posts/:id`
  pub async fn get_post(&self, id: PostId) -> Result<Post> {
    self.get(&format!("/posts/{id}")).await
  }

  /// `GET /posts`
  pub async fn list_posts(&self) -> Result<Vec<Post>> { self.get("/posts").await }

  /// `GET /posts/:id/comments`
  pub async fn list_comments(&self, id: PostId) -> Result<Vec<Comment>> {
    self.get(&format!("/posts/{id}/comments")).await
  }

  /// `GET /posts/:id/top-comments?n=`
  pub async fn top_comments(
    &self,
    id: PostId,
    n: i64,
  ) -> Result<Vec<CommentWithReplies>> {
    self.get(&format!("/posts/{id}/top-comments?n={n}")).await
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  /// `POST /comments`
  pub async fn create_comment(
    &self,
    parent: Parent,
    author: &UserId,
    content: &str,
  ) -> Result<Comment> {
    let (post_id, comment_id) = match parent {
      Parent::Post(id) => (Some(id), None),
      Parent::Comment(id) => (None, Some(id)),
    };
    let body = NewCommentBody {
      content,
      author_id: author,
      post_id,
      comment_id,
    };
    self.post("/comments", &body).await
  }

  /// `GET /comments/:id`
  pub async fn get_comment(&self, id: CommentId) -> Result<Comment> {
    self.get(&format!("/comments/{id}")).await
  }

  /// `GET /comments/:id/branch?n=[&depth=]`
  pub async fn expand(
    &self,
    id: CommentId,
    n: i64,
    depth: Option<usize>,
  ) -> Result<CommentTree> {
    let mut path = format!("/comments/{id}/branch?n={n}");
    if let Some(depth) = depth {
      path.push_str(&format!("&depth={depth}"));
    }
    self.get(&path).await
  }

  // ── Votes ─────────────────────────────────────────────────────────────────

  /// `POST /posts/:id/vote` or `POST /comments/:id/vote`; returns the new
  /// score.
  pub async fn vote(&self, target: VoteTarget, direction: VoteDirection) -> Result<i64> {
    let path = match target {
      VoteTarget::Post(id) => format!("/posts/{id}/vote"),
      VoteTarget::Comment(id) => format!("/comments/{id}/vote"),
    };
    let body = json!({ "direction": direction });
    let score: ScoreBody = self.post(&path, &body).await?;
    Ok(score.score)
  }
}
