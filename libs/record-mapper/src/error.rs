use record_api::ConfigError;

use crate::transformer::TransformError;

/// Why a transformer was refused at registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformerRejection {
    #[error("no transformer given")]
    Missing,

    #[error("'{0}' is not a method of the record type")]
    UnknownMethod(String),
}

/// Registration-time failure: the supplied transformer cannot be invoked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("attribute transformer for '{attribute}' on {record_type} is not callable: {reason}")]
pub struct AttributeTransformerError {
    pub record_type: String,
    pub attribute: String,
    pub reason: TransformerRejection,
}

#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    #[error(transparent)]
    AttributeTransformer(#[from] AttributeTransformerError),

    #[error("transformer for attribute '{attribute}' failed: {source}")]
    Transform {
        attribute: String,
        source: TransformError,
    },

    #[error("assign error: {0}")]
    Assign(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl MapperError {
    /// Add context to the error.
    ///
    /// For `Config`, context goes to the inner `ConfigError`.
    /// For `Assign`, context is prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            MapperError::Config(e) => MapperError::Config(e.with_context(ctx)),
            MapperError::Assign(msg) => MapperError::Assign(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
