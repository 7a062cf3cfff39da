//! Named cascade stages.

use std::fmt;

use serde::Serialize;

/// A state the cascade passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    MinorCheck,
    NsfwCheck,
    PersonalInfoCheck,
    ObjectDetection,
    ViolenceCheck,
    NsfwFinalize,
    Finalize,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::MinorCheck => "minor_check",
            Stage::NsfwCheck => "nsfw_check",
            Stage::PersonalInfoCheck => "personal_info_check",
            Stage::ObjectDetection => "object_detection",
            Stage::ViolenceCheck => "violence_check",
            Stage::NsfwFinalize => "nsfw_finalize",
            Stage::Finalize => "finalize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
