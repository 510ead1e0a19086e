//! Score service errors

use thiserror::Error;

/// Errors talking to the score/leaderboard service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Connection error: {0}")]
    Network(String),

    #[error("Authentication failed, log in again")]
    Unauthorized,

    #[error("Server error: {0}")]
    Status(u16),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Result type for score service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Map a transport-level failure from the HTTP client
    pub fn from_ureq(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(401, _) => ServiceError::Unauthorized,
            ureq::Error::Status(code, _) => ServiceError::Status(code),
            ureq::Error::Transport(transport) => ServiceError::Network(transport.to_string()),
        }
    }

    /// Short machine-readable code, as the backend reports them
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Network(_) => "network_error",
            ServiceError::Unauthorized => "auth_failed",
            ServiceError::Status(_) => "server_error",
            ServiceError::Decode(_) => "invalid_response",
        }
    }
}
