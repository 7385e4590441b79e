use thiserror::Error;

/// Top-level error type for Telegrab.
#[derive(Debug, Error)]
pub enum TelegrabError {
    /// Missing or unusable settings, or an unwritable download directory.
    /// The only class that halts a bot permanently.
    #[error("config error: {0}")]
    Config(String),

    /// Network or HTTP-level failure talking to the Bot API.
    #[error("transport error: {0}")]
    Transport(String),

    /// A well-formed response that rejected the operation.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A download was requested with an empty reference.
    #[error("empty file reference")]
    EmptyReference,

    /// Local file could not be opened, created, or written.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TelegrabError {
    /// Whether this error should stop the bot instead of being retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_config_errors_are_fatal() {
        assert!(TelegrabError::Config("no token".into()).is_fatal());
        assert!(!TelegrabError::Transport("timed out".into()).is_fatal());
        assert!(!TelegrabError::Protocol("Unauthorized".into()).is_fatal());
        assert!(!TelegrabError::EmptyReference.is_fatal());
    }

    #[test]
    fn test_io_error_converts() {
        let err: TelegrabError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert!(err.to_string().starts_with("io error"));
    }
}
