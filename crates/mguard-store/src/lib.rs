//! Verdict persistence.
//!
//! Verdicts are written as boolean flag columns onto the record that
//! triggered moderation. The store only ever updates existing rows.

pub mod error;
pub mod flags;
pub mod mysql;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use flags::{FlagSet, FLAG_COLUMNS};
pub use mysql::{MySqlVerdictStore, StoreConfig};
pub use store::{validate_identifier, UpdateStatus, VerdictStore};
