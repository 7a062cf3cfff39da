//! Shared data models for the media moderation worker.
//!
//! This crate provides Serde-serializable types for:
//! - Moderation jobs and the database record they point at
//! - Decoded media (still frames and sampled keyframes)
//! - Open-vocabulary detection labels and their categories
//! - Verdicts and hard-stop reasons

pub mod frame;
pub mod job;
pub mod label;
pub mod verdict;

// Re-export common types
pub use frame::{DecodedMedia, Frame};
pub use job::{JobId, MediaKind, ModerationJob, RecordRef};
pub use label::{Category, CategoryFlags, Label};
pub use verdict::{StopReason, Verdict};
