//! Queue error types.

use thiserror::Error;

pub type QueueResult<T> = Result<T, QueueError>;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QueueError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedMessage(msg.into())
    }

    /// Failures of the transport itself, as opposed to a bad message.
    pub fn is_transport(&self) -> bool {
        matches!(self, QueueError::ConnectionFailed(_) | QueueError::Redis(_))
    }
}
