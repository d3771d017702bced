//! `agora` — command-line client for the Agora forum server.
//!
//! # Usage
//!
//! ```
//! agora --url http://localhost:50051 post create --title Hi --content "first!"
//! agora top 1 -n 3
//! agora top-reply 1
//! ```

mod client;

use std::path::PathBuf;

use agora_core::{
  branch::CommentTree,
  comment::{Comment, CommentId, Parent},
  post::{NewPost, PostId},
  user::{User, UserId},
  vote::{VoteDirection, VoteTarget},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:50051";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "agora", about = "Client for the Agora forum server")]
struct Args {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the server (default: http://localhost:50051).
  #[arg(long, env = "AGORA_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Manage users.
  #[command(subcommand)]
  User(UserCommand),
  /// Manage posts.
  #[command(subcommand)]
  Post(PostCommand),
  /// Manage comments.
  #[command(subcommand)]
  Comment(CommentCommand),
  /// Top-level comments of a post, in creation order.
  Comments { post: u64 },
  /// The highest-scoring comments of a post with their direct replies.
  Top {
    post: u64,
    #[arg(short, default_value_t = 10)]
    n:    i64,
  },
  /// A comment and its best replies, recursively.
  Expand {
    comment: u64,
    #[arg(short, default_value_t = 10)]
    n:       i64,
    #[arg(long)]
    depth:   Option<usize>,
  },
  /// The most upvoted reply under the most upvoted comment of a post.
  TopReply { post: u64 },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
  Create {
    id:       String,
    username: String,
    email:    String,
  },
  Get {
    id: String,
  },
}

#[derive(Subcommand, Debug)]
enum PostCommand {
  Create {
    #[arg(long)]
    title:     String,
    #[arg(long)]
    content:   String,
    #[arg(long)]
    image_url: Option<String>,
    #[arg(long)]
    video_url: Option<String>,
    #[arg(long)]
    subreddit: Option<String>,
  },
  Get {
    id: u64,
  },
  List,
  /// Vote `up` or `down`.
  Vote {
    id:        u64,
    direction: VoteDirection,
  },
}

#[derive(Subcommand, Debug)]
enum CommentCommand {
  Create {
    #[arg(long)]
    author:   String,
    /// Attach to this post.
    #[arg(long, conflicts_with = "reply_to", required_unless_present = "reply_to")]
    post:     Option<u64>,
    /// Reply to this comment.
    #[arg(long)]
    reply_to: Option<u64>,
    content:  String,
  },
  Get {
    id: u64,
  },
  /// Vote `up` or `down`.
  Vote {
    id:        u64,
    direction: VoteDirection,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| Some(file_cfg.url).filter(|u| !u.is_empty()))
    .unwrap_or_else(|| DEFAULT_URL.to_string());

  let api = ApiClient::new(ApiConfig { base_url })?;
  run(&api, args.command).await
}

async fn run(api: &ApiClient, command: Command) -> Result<()> {
  match command {
    Command::User(UserCommand::Create { id, username, email }) => {
      let user = User {
        user_id: UserId(id),
        username,
        email,
      };
      print_json(&api.create_user(&user).await?)
    }
    Command::User(UserCommand::Get { id }) => {
      print_json(&api.get_user(&UserId(id)).await?)
    }
    Command::Post(PostCommand::Create {
      title,
      content,
      image_url,
      video_url,
      subreddit,
    }) => {
      let input = NewPost {
        title,
        content,
        image_url,
        video_url,
        subreddit,
      };
      print_json(&api.create_post(&input).await?)
    }
    Command::Post(PostCommand::Get { id }) => {
      print_json(&api.get_post(PostId(id)).await?)
    }
    Command::Post(PostCommand::List) => print_json(&api.list_posts().await?),
    Command::Post(PostCommand::Vote { id, direction }) => {
      let score = api.vote(VoteTarget::Post(PostId(id)), direction).await?;
      println!("{score}");
      Ok(())
    }
    Command::Comment(CommentCommand::Create {
      author,
      post,
      reply_to,
      content,
    }) => {
      let parent = match (post, reply_to) {
        (Some(p), _) => Parent::Post(PostId(p)),
        (None, Some(c)) => Parent::Comment(CommentId(c)),
        (None, None) => anyhow::bail!("either --post or --reply-to is required"),
      };
      print_json(&api.create_comment(parent, &UserId(author), &content).await?)
    }
    Command::Comment(CommentCommand::Get { id }) => {
      print_json(&api.get_comment(CommentId(id)).await?)
    }
    Command::Comment(CommentCommand::Vote { id, direction }) => {
      let score = api
        .vote(VoteTarget::Comment(CommentId(id)), direction)
        .await?;
      println!("{score}");
      Ok(())
    }
    Command::Comments { post } => {
      print_json(&api.list_comments(PostId(post)).await?)
    }
    Command::Top { post, n } => {
      print_json(&api.top_comments(PostId(post), n).await?)
    }
    Command::Expand { comment, n, depth } => {
      print_json(&api.expand(CommentId(comment), n, depth).await?)
    }
    Command::TopReply { post } => match top_reply(api, PostId(post)).await? {
      Some(reply) => print_json(&reply),
      None => {
        println!("no replies under the top comment");
        Ok(())
      }
    },
  }
}

/// Fetch the post, take its highest-scoring comment, expand that comment one
/// reply wide and return the reply, if any.
async fn top_reply(api: &ApiClient, post: PostId) -> Result<Option<Comment>> {
  let post = api.get_post(post).await?;
  println!("post: {}", post.title);

  let top = api.top_comments(post.post_id, 1).await?;
  let Some(best) = top.into_iter().next() else {
    return Ok(None);
  };
  println!("{}", top_comment_line(&best.comment));

  let tree = api.expand(best.comment.comment_id, 1, None).await?;
  Ok(most_upvoted_reply(&tree).cloned())
}

fn top_comment_line(comment: &Comment) -> String {
  format!("top comment ({}): {}", comment.score, comment.content)
}

/// The first reply of an expanded branch, i.e. the highest-scoring one.
fn most_upvoted_reply(tree: &CommentTree) -> Option<&Comment> {
  tree.replies.first().map(|t| &t.comment)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use agora_core::post::ContentState;
  use chrono::Utc;

  use super::*;

  fn comment(id: u64, parent: Parent, content: &str) -> Comment {
    Comment {
      comment_id:   CommentId(id),
      parent,
      author:       "user2".into(),
      content:      content.into(),
      score:        1,
      state:        ContentState::Normal,
      published_at: Utc::now(),
    }
  }

  #[test]
  fn most_upvoted_reply_is_first_reply() {
    let root = comment(1, Parent::Post(PostId(1)), "This is comment 0");
    let reply = comment(2, Parent::Comment(CommentId(1)), "This is a reply 0");
    let tree = CommentTree {
      comment: root.clone(),
      replies: vec![CommentTree {
        comment: reply.clone(),
        replies: vec![],
      }],
    };
    assert_eq!(most_upvoted_reply(&tree), Some(&reply));

    let bare = CommentTree {
      comment: root,
      replies: vec![],
    };
    assert_eq!(most_upvoted_reply(&bare), None);
  }

  #[test]
  fn top_comment_line_shows_score_and_text() {
    let c = comment(4, Parent::Post(PostId(1)), "This is comment 3");
    assert_eq!(top_comment_line(&c), "top comment (1): This is comment 3");
  }

  #[test]
  fn parses_vote_direction() {
    let args = Args::try_parse_from(["agora", "comment", "vote", "3", "down"]).unwrap();
    match args.command {
      Command::Comment(CommentCommand::Vote { id, direction }) => {
        assert_eq!(id, 3);
        assert_eq!(direction, VoteDirection::Down);
      }
      other => panic!("unexpected command {other:?}"),
    }
    assert!(Args::try_parse_from(["agora", "post", "vote", "3", "maybe"]).is_err());
  }

  #[test]
  fn comment_create_needs_a_parent() {
    assert!(
      Args::try_parse_from(["agora", "comment", "create", "--author", "u", "hi"]).is_err()
    );
    assert!(
      Args::try_parse_from([
        "agora", "comment", "create", "--author", "u", "--post", "1",
        "--reply-to", "2", "hi",
      ])
      .is_err()
    );
    assert!(
      Args::try_parse_from([
        "agora", "comment", "create", "--author", "u", "--reply-to", "2", "hi",
      ])
      .is_ok()
    );
  }
}
