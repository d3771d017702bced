//! User accounts — a thin registry. Comments refer to users by id only; the
//! id is not checked against this registry.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-chosen user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for UserId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for UserId {
  fn from(s: String) -> Self { Self(s) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:  UserId,
  pub username: String,
  pub email:    String,
}
