//! The persistence seam.

use std::fmt;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use mguard_models::RecordRef;
use regex::Regex;

use crate::error::{StoreError, StoreResult};
use crate::flags::FlagSet;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Reject anything that is not a plain SQL identifier.
pub fn validate_identifier(name: &str) -> StoreResult<&str> {
    if IDENTIFIER.is_match(name) {
        Ok(name)
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// What an update did to the target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStatus {
    /// Rows reported as changed by the database
    Updated(u64),
    /// No row matched, or the stored flags already had these values
    NoRowsAffected,
    /// The flag set had nothing to write
    NothingToUpdate,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::Updated(rows) => write!(f, "updated {} row(s)", rows),
            UpdateStatus::NoRowsAffected => f.write_str("no rows affected"),
            UpdateStatus::NothingToUpdate => f.write_str("nothing to update"),
        }
    }
}

/// Update-only persistence of verdict flags.
#[async_trait]
pub trait VerdictStore: Send + Sync {
    /// Write `flags` onto the record. Never inserts.
    async fn update(&self, record: &RecordRef, flags: &FlagSet) -> StoreResult<UpdateStatus>;
}

#[async_trait]
impl<T: VerdictStore + ?Sized> VerdictStore for Arc<T> {
    async fn update(&self, record: &RecordRef, flags: &FlagSet) -> StoreResult<UpdateStatus> {
        (**self).update(record, flags).await
    }
}
