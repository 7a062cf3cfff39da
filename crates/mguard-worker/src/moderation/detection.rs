//! Merged open-vocabulary detection over decoded frames.
//!
//! One detector call per frame covers every label prompt. Scores are
//! thresholded here, never by the classifier.

use std::collections::HashMap;

use mguard_ml_client::{Classifier, MlResult};
use mguard_models::{Category, CategoryFlags, Frame, Label};
use tracing::debug;

use crate::logging::JobLogger;
use crate::metrics;
use crate::moderation::stage::Stage;
use crate::moderation::thresholds::ThresholdTable;
use crate::moderation::voting::{FrameVoteTally, VotePolicy};

/// Thresholded detection over every label category at once.
pub struct MergedDetector<'a, C: ?Sized> {
    classifier: &'a C,
    thresholds: &'a ThresholdTable,
    prompts: Vec<&'static str>,
}

impl<'a, C: Classifier + ?Sized> MergedDetector<'a, C> {
    pub fn new(classifier: &'a C, thresholds: &'a ThresholdTable) -> Self {
        Self {
            classifier,
            thresholds,
            prompts: Label::prompts(),
        }
    }

    /// Map raw detector scores to the categories that cleared their thresholds.
    pub fn categorize(&self, scores: &HashMap<String, f32>) -> CategoryFlags {
        let mut flags = CategoryFlags::default();
        for (label, score) in scores {
            if let Some(known) = self.thresholds.passes(label, *score) {
                flags.set(known.category());
            }
        }
        flags
    }

    /// Categories that fired on one frame.
    pub async fn detect_frame(&self, frame: &Frame) -> MlResult<CategoryFlags> {
        let scores = self.classifier.detect_objects(frame, &self.prompts).await?;
        Ok(self.categorize(&scores))
    }

    /// Union of categories over the frames, stopping once all have fired.
    pub async fn detect_union(&self, frames: &[Frame], logger: &JobLogger) -> CategoryFlags {
        let mut flags = CategoryFlags::default();
        for frame in frames {
            let fired = self.detect_or_nothing(frame, logger).await;
            for category in Category::ALL {
                if fired.get(category) {
                    flags.set(category);
                }
            }
            if flags.all() {
                debug!(frame = frame.index, "Every category fired, skipping remaining frames");
                break;
            }
        }
        flags
    }

    /// Per-frame detection followed by a keyframe vote per category.
    pub async fn detect_votes(
        &self,
        frames: &[Frame],
        policy: &VotePolicy,
        logger: &JobLogger,
    ) -> CategoryFlags {
        let mut tally = FrameVoteTally::new();
        for category in Category::ALL {
            tally.register(category);
        }

        for frame in frames {
            let fired = self.detect_or_nothing(frame, logger).await;
            tally.record_frame(Category::ALL.into_iter().filter(|c| fired.get(*c)));
        }

        let mut flags = CategoryFlags::default();
        for (category, passed) in tally.finalize(policy) {
            if passed {
                flags.set(category);
            }
        }
        flags
    }

    async fn detect_or_nothing(&self, frame: &Frame, logger: &JobLogger) -> CategoryFlags {
        match self.detect_frame(frame).await {
            Ok(flags) => flags,
            Err(e) => {
                logger.log_classifier_failure(
                    Stage::ObjectDetection,
                    &format!("frame {}: {}", frame.index, e),
                );
                metrics::record_classifier_failure(Stage::ObjectDetection);
                CategoryFlags::default()
            }
        }
    }
}
