//! Flag columns written for a verdict.

use std::collections::BTreeMap;

use mguard_models::{StopReason, Verdict};

/// Every flag column a verdict can touch.
pub const FLAG_COLUMNS: [&str; 7] = [
    "animal_detected",
    "das_detected",
    "minor_detected",
    "personal_info_detected",
    "nsfw_detected",
    "violence_detected",
    "weapon_detected",
];

/// Column → value. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    columns: BTreeMap<&'static str, Option<bool>>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &'static str, value: Option<bool>) -> &mut Self {
        self.columns.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<bool> {
        self.columns.get(column).copied().flatten()
    }

    /// Columns that will be written, in column-name order.
    pub fn assignments(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.columns
            .iter()
            .filter_map(|(column, value)| value.map(|v| (*column, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.assignments().next().is_none()
    }
}

impl From<&Verdict> for FlagSet {
    /// Only the columns the terminal state actually evaluated are written.
    fn from(verdict: &Verdict) -> Self {
        let mut flags = FlagSet::new();
        match verdict.stop_reason {
            Some(StopReason::MinorNsfw) => {
                flags
                    .set("minor_detected", Some(verdict.minor))
                    .set("nsfw_detected", Some(verdict.nsfw));
            }
            Some(StopReason::PersonalInfo) => {
                flags.set("personal_info_detected", Some(verdict.personal_info));
            }
            Some(StopReason::AnimalNsfw) => {
                flags
                    .set("animal_detected", Some(verdict.animal))
                    .set("das_detected", Some(verdict.das))
                    .set("weapon_detected", Some(verdict.weapon))
                    .set("nsfw_detected", Some(verdict.nsfw));
            }
            None => {
                flags
                    .set("animal_detected", Some(verdict.animal))
                    .set("das_detected", Some(verdict.das))
                    .set("minor_detected", Some(verdict.minor))
                    .set("personal_info_detected", Some(verdict.personal_info))
                    .set("nsfw_detected", Some(verdict.nsfw))
                    .set("violence_detected", Some(verdict.violence))
                    .set("weapon_detected", Some(verdict.weapon));
            }
        }
        flags
    }
}
