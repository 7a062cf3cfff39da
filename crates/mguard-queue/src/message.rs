//! Upload event messages.
//!
//! ```json
//! {"type": "attachment", "table": "attachments", "id": "a83e...",
//!  "data": {"file": "uploads\/posts\/images\/1766.jpg", "type": "images",
//!           "post_id": 512, "user_id": 6}}
//! ```

use std::fmt;

use mguard_media::StorageRoots;
use mguard_models::{MediaKind, ModerationJob, RecordRef};
use serde::{Deserialize, Serialize};

use crate::error::{QueueError, QueueResult};

/// Record primary key value; producers send either form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Payload describing the uploaded file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageData {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub post_id: Option<RecordId>,
    #[serde(default)]
    pub user_id: Option<RecordId>,
}

/// One upload event as it sits on the queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueMessage {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub data: Option<MessageData>,
}

impl QueueMessage {
    /// Parse a raw queue payload.
    pub fn parse(raw: &str) -> QueueResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn file(&self) -> Option<&str> {
        self.data.as_ref().and_then(|d| d.file.as_deref())
    }

    /// Validate the message and resolve its file against the storage roots.
    ///
    /// Missing record coordinates or file path, and files whose extension is
    /// neither a known image nor video type, are rejected.
    pub fn into_job(self, roots: &StorageRoots) -> QueueResult<ModerationJob> {
        let table = self
            .table
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| QueueError::malformed("missing table"))?
            .to_string();

        let id = self
            .id
            .as_ref()
            .map(RecordId::to_string)
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| QueueError::malformed("missing id"))?;

        let raw_file = self
            .file()
            .filter(|f| !f.trim().is_empty())
            .ok_or_else(|| QueueError::malformed("missing data.file"))?
            .to_string();

        let resolved = roots.resolve(&raw_file);
        let media_kind = MediaKind::from_path(&resolved)
            .ok_or_else(|| QueueError::UnsupportedMedia(raw_file.clone()))?;

        Ok(ModerationJob::new(
            RecordRef::new(table, id),
            raw_file,
            resolved,
            media_kind,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = r#"{"type":"attachment","table":"attachments","id":"a83edaf06cb94905ad6d9f20b9e7dfc9","data":{"file":"uploads\/posts\/images\/17665066961999.jpg","type":"images","post_id":512,"user_id":6}}"#;

    fn roots() -> StorageRoots {
        StorageRoots::new(vec![PathBuf::from("/srv/storage")])
    }

    #[test]
    fn test_parse_sample() {
        let msg = QueueMessage::parse(SAMPLE).unwrap();
        assert_eq!(msg.table.as_deref(), Some("attachments"));
        assert_eq!(msg.file(), Some("uploads/posts/images/17665066961999.jpg"));
        assert_eq!(
            msg.data.as_ref().and_then(|d| d.post_id.clone()),
            Some(RecordId::Number(512))
        );
    }

    #[test]
    fn test_into_job() {
        let job = QueueMessage::parse(SAMPLE).unwrap().into_job(&roots()).unwrap();

        assert_eq!(job.record.table_name, "attachments");
        assert_eq!(job.record.primary_key_name, "id");
        assert_eq!(job.record.primary_key_value, "a83edaf06cb94905ad6d9f20b9e7dfc9");
        assert_eq!(job.media_kind, MediaKind::Image);
        assert_eq!(
            job.resolved_file_path,
            PathBuf::from("/srv/storage/uploads/posts/images/17665066961999.jpg")
        );
    }

    #[test]
    fn test_numeric_id() {
        let raw = r#"{"table":"posts","id":42,"data":{"file":"v/clip.mp4"}}"#;
        let job = QueueMessage::parse(raw).unwrap().into_job(&roots()).unwrap();
        assert_eq!(job.record.primary_key_value, "42");
        assert_eq!(job.media_kind, MediaKind::Video);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            QueueMessage::parse("{not json"),
            Err(QueueError::Json(_))
        ));
    }

    #[test]
    fn test_missing_fields_rejected() {
        for raw in [
            r#"{"id":"1","data":{"file":"a.jpg"}}"#,
            r#"{"table":"t","data":{"file":"a.jpg"}}"#,
            r#"{"table":"t","id":"1"}"#,
            r#"{"table":"t","id":"1","data":{"file":"  "}}"#,
            r#"{"table":"","id":"1","data":{"file":"a.jpg"}}"#,
        ] {
            let err = QueueMessage::parse(raw).unwrap().into_job(&roots()).unwrap_err();
            assert!(matches!(err, QueueError::MalformedMessage(_)), "{raw}");
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let raw = r#"{"table":"t","id":"1","data":{"file":"doc.pdf"}}"#;
        let err = QueueMessage::parse(raw).unwrap().into_job(&roots()).unwrap_err();
        assert!(matches!(err, QueueError::UnsupportedMedia(_)));
    }
}
