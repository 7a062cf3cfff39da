//! Moderation job definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for a moderation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of media referenced by an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Extensions decoded as a single still frame.
    pub const IMAGE_EXTENSIONS: &'static [&'static str] = &["jpg", "jpeg", "png", "bmp", "webp"];

    /// Extensions decoded as a frame stream.
    pub const VIDEO_EXTENSIONS: &'static [&'static str] = &["mp4", "avi", "mov", "mkv"];

    /// Classify a path by its (case-insensitive) extension.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();

        if Self::IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Image)
        } else if Self::VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database row a verdict is written back to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub table_name: String,
    pub primary_key_name: String,
    pub primary_key_value: String,
}

impl RecordRef {
    /// Primary key column used by every upload table.
    pub const DEFAULT_PRIMARY_KEY: &'static str = "id";

    pub fn new(table_name: impl Into<String>, primary_key_value: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            primary_key_name: Self::DEFAULT_PRIMARY_KEY.to_string(),
            primary_key_value: primary_key_value.into(),
        }
    }
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}={}",
            self.table_name, self.primary_key_name, self.primary_key_value
        )
    }
}

/// A normalized moderation job.
///
/// Built once from a queue message and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationJob {
    pub job_id: JobId,
    pub record: RecordRef,
    /// Upload path exactly as it arrived on the queue
    pub raw_file_path: String,
    /// Path on local storage after root resolution
    pub resolved_file_path: PathBuf,
    pub media_kind: MediaKind,
}

impl ModerationJob {
    pub fn new(
        record: RecordRef,
        raw_file_path: impl Into<String>,
        resolved_file_path: impl Into<PathBuf>,
        media_kind: MediaKind,
    ) -> Self {
        Self {
            job_id: JobId::new(),
            record,
            raw_file_path: raw_file_path.into(),
            resolved_file_path: resolved_file_path.into(),
            media_kind,
        }
    }

    /// Override the generated job ID.
    pub fn with_job_id(mut self, job_id: JobId) -> Self {
        self.job_id = job_id;
        self
    }

    pub fn path(&self) -> &Path {
        &self.resolved_file_path
    }
}
