//! Worker error types.

use std::path::PathBuf;

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    /// The queue message cannot be turned into a job.
    #[error("Malformed job: {0}")]
    MalformedJob(String),

    #[error("Unsupported media: {0}")]
    UnsupportedMedia(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Decode failed: {0}")]
    DecodeFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Media error: {0}")]
    Media(#[from] mguard_media::MediaError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] mguard_ml_client::MlError),

    #[error("Queue error: {0}")]
    Queue(#[from] mguard_queue::QueueError),

    #[error("Store error: {0}")]
    Store(#[from] mguard_store::StoreError),
}

impl WorkerError {
    pub fn malformed_job(msg: impl Into<String>) -> Self {
        Self::MalformedJob(msg.into())
    }

    pub fn decode_failed(msg: impl Into<String>) -> Self {
        Self::DecodeFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Map a message normalization failure onto the job rejection kinds.
    pub fn from_rejected_message(err: mguard_queue::QueueError) -> Self {
        match err {
            mguard_queue::QueueError::MalformedMessage(msg) => Self::MalformedJob(msg),
            mguard_queue::QueueError::UnsupportedMedia(file) => Self::UnsupportedMedia(file),
            mguard_queue::QueueError::Json(e) => Self::MalformedJob(e.to_string()),
            other => Self::Queue(other),
        }
    }

    /// Map a decode failure onto the job rejection kinds.
    pub fn from_media(err: mguard_media::MediaError) -> Self {
        match err {
            mguard_media::MediaError::FileNotFound(path) => Self::FileNotFound(path),
            mguard_media::MediaError::UnsupportedFormat(msg) => Self::UnsupportedMedia(msg),
            mguard_media::MediaError::ImageDecode(e) => Self::DecodeFailed(e.to_string()),
            mguard_media::MediaError::InvalidVideo(msg) => Self::DecodeFailed(msg),
            mguard_media::MediaError::FfmpegFailed { message, .. } => Self::DecodeFailed(message),
            other => Self::Media(other),
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerError::MalformedJob(_) => "malformed",
            WorkerError::UnsupportedMedia(_) => "unsupported_media",
            WorkerError::FileNotFound(_) => "file_not_found",
            WorkerError::DecodeFailed(_) => "decode_failed",
            WorkerError::ConfigError(_) => "config",
            WorkerError::Media(_) => "media",
            WorkerError::Classifier(_) => "classifier",
            WorkerError::Queue(_) => "queue",
            WorkerError::Store(_) => "store",
        }
    }

    /// True if the job itself was rejected, as opposed to infrastructure failing.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            WorkerError::MalformedJob(_)
                | WorkerError::UnsupportedMedia(_)
                | WorkerError::FileNotFound(_)
                | WorkerError::DecodeFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_message_mapping() {
        let err = WorkerError::from_rejected_message(mguard_queue::QueueError::malformed(
            "missing table",
        ));
        assert!(matches!(err, WorkerError::MalformedJob(_)));
        assert!(err.is_rejection());
        assert_eq!(err.kind(), "malformed");
    }

    #[test]
    fn test_media_mapping() {
        let err = WorkerError::from_media(mguard_media::MediaError::FileNotFound(
            PathBuf::from("/x.jpg"),
        ));
        assert!(matches!(err, WorkerError::FileNotFound(_)));

        let err = WorkerError::from_media(mguard_media::MediaError::invalid_video("empty"));
        assert!(matches!(err, WorkerError::DecodeFailed(_)));

        let err = WorkerError::from_media(mguard_media::MediaError::FfmpegNotFound);
        assert!(!err.is_rejection());
    }
}
