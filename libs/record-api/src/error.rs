use std::path::PathBuf;

/// Configuration loading and validation failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Invalid(String),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("io error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Add context to the error.
    ///
    /// Only `Invalid` carries a message to prefix; other variants are returned as-is.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            ConfigError::Invalid(msg) => ConfigError::Invalid(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
