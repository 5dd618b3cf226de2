//! Error types for the Freeclub client.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire Freeclub client.
///
/// `Clone` is required: a de-duplicated read hands the same failure to every
/// caller that joined it.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClubError {
    /// The backend rejected the bearer token (HTTP 401).
    #[error("Unauthorized (status {status})")]
    Unauthorized { status: u16 },

    /// Any other non-success HTTP status.
    #[error("HTTP error {status}{}", http_detail(.message))]
    Http { status: u16, message: Option<String> },

    /// The backend answered with a body that does not match the expected shape.
    #[error("Malformed response for {resource}: {message}")]
    MalformedResponse {
        resource: String,
        message: String,
    },

    /// A bearer token whose payload cannot be decoded.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// A bounded wait expired.
    #[error("Timed out after {after_ms}ms: {operation}")]
    Timeout { operation: String, after_ms: u64 },

    /// Connection-level failure (DNS, refused connection, TLS...).
    #[error("Connection error: {0}")]
    Transport(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Durable client storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

fn http_detail(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

impl ClubError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a MalformedResponse error
    pub fn malformed(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Creates a Timeout error
    pub fn timeout(operation: impl Into<String>, after: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if the backend rejected the session
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Check if a bounded wait expired
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this is a NotFound error, either local or an HTTP 404
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Http { status: 404, .. }
        )
    }

    /// Check if the backend broke its response contract
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. } | Self::InvalidToken(_))
    }

    /// Check if this is a connection-level failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short, non-technical text suitable for showing to staff.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "Your session has expired. Please sign in again.",
            Self::Timeout { .. } => "The server took too long to answer. Please try again.",
            Self::Transport(_) => "Connection error. Check your network and try again.",
            Self::NotFound { .. } | Self::Http { status: 404, .. } => "The record was not found.",
            Self::Http { .. } => "The server could not complete the request.",
            _ => "Something went wrong. Please try again.",
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ClubError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ClubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ClubError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ClubError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ClubError>`.
pub type Result<T> = std::result::Result<T, ClubError>;
