//! Classifier capability and the inference service client.
//!
//! The worker only sees the [`Classifier`] trait. [`MlClient`] implements it
//! over HTTP against the Python inference service, applying the violence
//! probability policy and the personal-details text rules on this side of
//! the wire.

pub mod classifier;
pub mod client;
pub mod error;
pub mod pii;
pub mod types;

pub use classifier::Classifier;
pub use client::{MlClient, MlClientConfig};
pub use error::{MlError, MlResult};
pub use pii::PersonalInfoRules;
pub use types::{Detection, Entity, TextExtraction, ViolencePrediction};
