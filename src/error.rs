//! Error types.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ElementError>;

/// A view function or mount point failed to produce its nodes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised by the element adapter.
#[derive(Debug, Error)]
pub enum ElementError {
    /// The mount point raised while constructing `<tag>`. Nothing stays mounted.
    #[error("failed to mount <{tag}>: {source}")]
    Mount {
        tag: String,
        #[source]
        source: RenderError,
    },

    #[error("<{tag}> has no property `{key}`")]
    UnknownProperty { tag: String, key: String },

    #[error("`{0}` is not a valid custom element name")]
    InvalidName(String),

    #[error("custom element `{0}` is already defined")]
    AlreadyDefined(String),

    #[error("custom element `{0}` is not defined")]
    Undefined(String),

    #[error("no mount point with id {0}")]
    UnknownMountPoint(u64),

    #[error("devtools control block is not initialised")]
    DevtoolsInactive,

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_error_message() {
        let err = ElementError::Mount {
            tag: "x-counter".into(),
            source: RenderError::new("boom"),
        };
        assert_eq!(err.to_string(), "failed to mount <x-counter>: boom");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_error_from_json() {
        let parse: std::result::Result<u8, _> = serde_json::from_str("nope");
        let err: ElementError = parse.unwrap_err().into();
        assert!(matches!(err, ElementError::Config(_)));
    }
}
