//! Moderation verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::label::CategoryFlags;

/// Why a cascade terminated before running every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MinorNsfw,
    PersonalInfo,
    AnimalNsfw,
}

impl StopReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopReason::MinorNsfw => "minor_nsfw",
            StopReason::PersonalInfo => "personal_info",
            StopReason::AnimalNsfw => "animal_nsfw",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final moderation record for one job.
///
/// Flags that a terminal state did not evaluate stay `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub animal: bool,
    pub das: bool,
    pub weapon: bool,
    pub minor: bool,
    pub personal_info: bool,
    pub nsfw: bool,
    pub violence: bool,
    pub stop_reason: Option<StopReason>,
}

impl Verdict {
    /// Minor and NSFW content together.
    pub fn minor_nsfw() -> Self {
        Self {
            minor: true,
            nsfw: true,
            stop_reason: Some(StopReason::MinorNsfw),
            ..Default::default()
        }
    }

    /// Personal details found in text or QR codes.
    pub fn personal_info() -> Self {
        Self {
            personal_info: true,
            stop_reason: Some(StopReason::PersonalInfo),
            ..Default::default()
        }
    }

    /// Animal and NSFW content together.
    pub fn animal_nsfw(objects: CategoryFlags) -> Self {
        Self {
            animal: objects.animal,
            das: objects.das,
            weapon: objects.weapon,
            nsfw: true,
            stop_reason: Some(StopReason::AnimalNsfw),
            ..Default::default()
        }
    }

    /// Verdict for a job that ran every stage.
    ///
    /// `personal_info` is always false here: reaching the end of the cascade
    /// means the personal-info stage came back negative.
    pub fn complete(objects: CategoryFlags, minor: bool, nsfw: bool, violence: bool) -> Self {
        Self {
            animal: objects.animal,
            das: objects.das,
            weapon: objects.weapon,
            minor,
            personal_info: false,
            nsfw,
            violence,
            stop_reason: None,
        }
    }

    pub fn is_hard_stop(&self) -> bool {
        self.stop_reason.is_some()
    }

    /// True if any signal was raised.
    pub fn is_flagged(&self) -> bool {
        self.animal
            || self.das
            || self.weapon
            || self.minor
            || self.personal_info
            || self.nsfw
            || self.violence
    }
}
