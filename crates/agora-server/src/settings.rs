//! Runtime configuration, layered from an optional TOML file and `AGORA_*`
//! environment variables (`AGORA_BRANCH__MAX_DEPTH` for nested keys).

use std::path::Path;

use agora_api::BranchLimits;
use config::{
  Config, ConfigError, Environment, File, builder::DefaultState,
  ConfigBuilder,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:          String,
  pub port:          u16,
  /// Tokio worker threads; every request runs on one of these.
  pub workers:       usize,
  /// Score events buffered per feed subscriber.
  pub feed_capacity: usize,
  pub branch:        BranchLimits,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:          "0.0.0.0".to_string(),
      port:          50051,
      workers:       10,
      feed_capacity: 1024,
      branch:        BranchLimits::default(),
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_builder(
      Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
          Environment::with_prefix("AGORA")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
        ),
    )
  }

  fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
    let cfg: Self = builder.build()?.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
  }

  /// Expansions that omit `depth` use `default_depth`, so it must be a depth
  /// the server accepts.
  fn validate(&self) -> Result<(), ConfigError> {
    let branch = &self.branch;
    if branch.default_depth > branch.max_depth {
      return Err(ConfigError::Message(format!(
        "branch.default_depth ({}) exceeds branch.max_depth ({})",
        branch.default_depth, branch.max_depth
      )));
    }
    Ok(())
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[cfg(test)]
mod tests {
  use config::FileFormat;

  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    ServerConfig::from_builder(
      Config::builder().add_source(File::from_str(toml, FileFormat::Toml)),
    )
    .unwrap()
  }

  #[test]
  fn empty_file_gives_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.address(), "0.0.0.0:50051");
    assert_eq!(cfg.workers, 10);
    assert_eq!(cfg.branch, BranchLimits::default());
    assert_eq!(cfg.branch.default_depth, 2);
  }

  #[test]
  fn partial_file_overrides_only_what_it_names() {
    let cfg = parse(
      r#"
        port = 8080
        workers = 4

        [branch]
        max_depth = 3
      "#,
    );
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.workers, 4);
    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.branch.max_depth, 3);
    assert_eq!(cfg.branch.default_depth, 2);
    assert_eq!(cfg.branch.max_width, 100);
  }

  #[test]
  fn default_depth_above_max_depth_is_rejected() {
    let err = ServerConfig::from_builder(Config::builder().add_source(
      File::from_str("[branch]\nmax_depth = 1\n", FileFormat::Toml),
    ))
    .unwrap_err();
    assert!(err.to_string().contains("branch.default_depth"), "{err}");

    let cfg = parse("[branch]\nmax_depth = 1\ndefault_depth = 1\n");
    assert_eq!(cfg.branch.default_depth, 1);
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/agora.toml")).unwrap();
    assert!(cfg.workers > 0);
  }
}
