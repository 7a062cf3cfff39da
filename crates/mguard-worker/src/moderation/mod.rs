//! Moderation decision logic.

pub mod assembler;
pub mod cascade;
pub mod detection;
pub mod nsfw_cell;
pub mod stage;
pub mod thresholds;
pub mod voting;

pub use assembler::{PersistOutcome, VerdictAssembler};
pub use cascade::{CascadeOutcome, ModerationCascade};
pub use detection::MergedDetector;
pub use nsfw_cell::NsfwCell;
pub use stage::Stage;
pub use thresholds::ThresholdTable;
pub use voting::{aggregate, FrameVoteTally, VotePolicy};
