// Error taxonomy for the SkillForge API.
//
// Two tiers: `ApiError` is what route handlers return — an HTTP status plus
// a machine-readable kind and a human-readable message, rendered by the web
// layer as the standard `{success: false, message}` envelope.
// `SkillForgeError` covers internal (non-HTTP) failures: configuration,
// storage, filesystem.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of an API failure.
///
/// Each variant maps to a fixed HTTP status via [`ErrorKind::status`]:
/// validation, conflict, and invalid-state problems all surface as 400 to
/// match the existing client convention; permission problems surface as 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The caller is authenticated but not permitted.
    Forbidden,
    /// The operation collides with existing state (e.g. duplicate enrollment).
    Conflict,
    /// The operation is not valid for the entity's current lifecycle state.
    InvalidState,
    /// Storage or infrastructure failure.
    Unexpected,
}

impl ErrorKind {
    /// The HTTP status this kind is reported with.
    pub fn status(&self) -> HttpStatus {
        match self {
            Self::Validation | Self::Conflict | Self::InvalidState => HttpStatus::BadRequest,
            Self::NotFound => HttpStatus::NotFound,
            Self::Forbidden => HttpStatus::Unauthorized,
            Self::Unexpected => HttpStatus::InternalServerError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Validation => "VALIDATION",
            Self::NotFound => "NOT_FOUND",
            Self::Forbidden => "FORBIDDEN",
            Self::Conflict => "CONFLICT",
            Self::InvalidState => "INVALID_STATE",
            Self::Unexpected => "UNEXPECTED",
        };
        write!(f, "{s}")
    }
}

/// HTTP status codes used by the API error system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpStatus {
    Ok = 200,
    Created = 201,
    PartialContent = 206,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    PayloadTooLarge = 413,
    InternalServerError = 500,
}

impl HttpStatus {
    pub fn status_code(&self) -> u16 {
        *self as u16
    }
}

impl fmt::Display for HttpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code())
    }
}

/// API error — carries an HTTP status, an error kind, and a message.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{status} {kind}: {message}")]
pub struct ApiError {
    pub status: HttpStatus,
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: kind.status(),
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Build the JSON body for the error response envelope.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "success": false,
            "message": self.message,
        })
    }
}

impl From<SkillForgeError> for ApiError {
    fn from(e: SkillForgeError) -> Self {
        match e {
            SkillForgeError::Api(api) => api,
            other => ApiError::unexpected(other.to_string()),
        }
    }
}

/// Internal (non-HTTP) error for configuration, storage, and I/O failures.
#[derive(Debug, thiserror::Error)]
pub enum SkillForgeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Unified result type for SkillForge operations.
pub type Result<T> = std::result::Result<T, SkillForgeError>;
