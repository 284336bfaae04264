//! Error types for autodesc.
//!
//! Library crates use [`AutoDescError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all autodesc operations.
#[derive(Debug, thiserror::Error)]
pub enum AutoDescError {
    /// Malformed or unbalanced exclusion markers.
    #[error("structural error at byte {offset}: {message}")]
    Structural { message: String, offset: usize },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A remote service rejected our credentials.
    #[error("authorization error: {message}")]
    Auth {
        service: AuthService,
        message: String,
        raw: Option<String>,
    },

    /// The remote API answered with an application-level error.
    #[error("API error: {message}")]
    Api {
        message: String,
        raw: Option<String>,
    },

    /// Network/HTTP transport error.
    #[error("network error: {0}")]
    Network(String),

    /// Front matter or response parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },
}

/// Which credential a failed authorization belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthService {
    /// The Modrinth `auth-token` input.
    Modrinth,
    /// The GitHub `repo-token` input.
    GitHub,
}

/// Discriminant of [`AutoDescError`], for callers that branch on the kind only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    Io,
    Auth,
    Api,
    Network,
    Parse,
    Config,
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AutoDescError>;

impl AutoDescError {
    /// Create a structural error at the given byte offset.
    pub fn structural(msg: impl Into<String>, offset: usize) -> Self {
        Self::Structural {
            message: msg.into(),
            offset,
        }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create an authorization error, keeping the raw response for diagnosis.
    pub fn auth(service: AuthService, msg: impl Into<String>, raw: Option<String>) -> Self {
        Self::Auth {
            service,
            message: msg.into(),
            raw,
        }
    }

    /// Create a generic API error, keeping the raw response for diagnosis.
    pub fn api(msg: impl Into<String>, raw: Option<String>) -> Self {
        Self::Api {
            message: msg.into(),
            raw,
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The kind tag of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Structural { .. } => ErrorKind::Structural,
            Self::Io { .. } => ErrorKind::Io,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Api { .. } => ErrorKind::Api,
            Self::Network(_) => ErrorKind::Network,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Config { .. } => ErrorKind::Config,
        }
    }

    /// Raw diagnostic payload (usually a response body), if one was captured.
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Auth { raw, .. } | Self::Api { raw, .. } => raw.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = AutoDescError::config("missing auth token");
        assert_eq!(err.to_string(), "config error: missing auth token");

        let err = AutoDescError::structural("end marker without a start", 42);
        assert!(err.to_string().contains("byte 42"));
    }

    #[test]
    fn kind_and_raw_payload() {
        let err = AutoDescError::auth(AuthService::Modrinth, "unauthorized", Some("{\"error\":\"x\"}".into()));
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.raw(), Some("{\"error\":\"x\"}"));

        let err = AutoDescError::Network("timed out".into());
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.raw().is_none());
    }

    #[test]
    fn io_error_keeps_path() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AutoDescError::io("README.md", source);
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("README.md"));
    }
}
