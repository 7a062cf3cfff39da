//! Redis list queue for moderation events.
//!
//! This crate provides:
//! - Blocking pop (`BRPOP`) for competing workers
//! - The upload event message schema
//! - Normalization of a message into a `ModerationJob`

pub mod error;
pub mod message;
pub mod queue;

pub use error::{QueueError, QueueResult};
pub use message::{MessageData, QueueMessage, RecordId};
pub use queue::{ModerationQueue, QueueConfig};
