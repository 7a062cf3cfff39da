//! The classifier capability the cascade depends on.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use mguard_models::Frame;

use crate::error::MlResult;

/// Uniform detection contract over the moderation models.
///
/// Every method may fail; the caller decides what a failure means.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn is_minor(&self, path: &Path) -> MlResult<bool>;

    /// Errors on a missing file or an extension the NSFW model does not take.
    async fn is_nsfw(&self, path: &Path) -> MlResult<bool>;

    async fn detect_personal_info(&self, path: &Path) -> MlResult<bool>;

    async fn is_violence_detected(&self, path: &Path) -> MlResult<bool>;

    /// Highest confidence per prompt label found in the frame.
    ///
    /// Labels that were not detected are absent from the map.
    async fn detect_objects(&self, frame: &Frame, labels: &[&str])
        -> MlResult<HashMap<String, f32>>;
}

#[async_trait]
impl<T: Classifier + ?Sized> Classifier for Arc<T> {
    async fn is_minor(&self, path: &Path) -> MlResult<bool> {
        (**self).is_minor(path).await
    }

    async fn is_nsfw(&self, path: &Path) -> MlResult<bool> {
        (**self).is_nsfw(path).await
    }

    async fn detect_personal_info(&self, path: &Path) -> MlResult<bool> {
        (**self).detect_personal_info(path).await
    }

    async fn is_violence_detected(&self, path: &Path) -> MlResult<bool> {
        (**self).is_violence_detected(path).await
    }

    async fn detect_objects(
        &self,
        frame: &Frame,
        labels: &[&str],
    ) -> MlResult<HashMap<String, f32>> {
        (**self).detect_objects(frame, labels).await
    }
}
