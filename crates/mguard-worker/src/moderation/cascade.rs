//! The moderation cascade.
//!
//! Classifiers run one after another in a fixed order. Two combinations end
//! the job early (minor with NSFW, animal with NSFW) and a personal-details
//! hit ends it on its own. NSFW is evaluated at most once per job.
//!
//! Classifier failures never abort a job: the failing signal is logged,
//! counted and treated as negative. Decode failures do abort it, and no
//! verdict is produced.

use std::future::Future;

use mguard_media::MediaLoader;
use mguard_ml_client::{Classifier, MlResult};
use mguard_models::{DecodedMedia, ModerationJob, StopReason, Verdict};

use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::moderation::detection::MergedDetector;
use crate::moderation::nsfw_cell::NsfwCell;
use crate::moderation::stage::Stage;
use crate::moderation::thresholds::ThresholdTable;
use crate::moderation::voting::VotePolicy;

/// Result of one cascade run.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeOutcome {
    pub verdict: Verdict,
    /// Stages in the order they were entered
    pub stages: Vec<Stage>,
    pub frames_evaluated: usize,
}

impl CascadeOutcome {
    pub fn visited(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    pub fn final_stage(&self) -> Option<Stage> {
        self.stages.last().copied()
    }
}

/// Runs the classifier cascade for one job at a time.
pub struct ModerationCascade<C> {
    classifier: C,
    loader: MediaLoader,
    thresholds: ThresholdTable,
    votes: VotePolicy,
}

impl<C: Classifier> ModerationCascade<C> {
    pub fn new(
        classifier: C,
        loader: MediaLoader,
        thresholds: ThresholdTable,
        votes: VotePolicy,
    ) -> Self {
        Self {
            classifier,
            loader,
            thresholds,
            votes,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    /// Decode the job's media and run every applicable stage.
    pub async fn run(&self, job: &ModerationJob) -> WorkerResult<CascadeOutcome> {
        let media = self
            .loader
            .load(job)
            .await
            .map_err(WorkerError::from_media)?;

        Ok(self.evaluate(job, &media).await)
    }

    /// Run the stages over media that is already decoded.
    pub async fn evaluate(&self, job: &ModerationJob, media: &DecodedMedia) -> CascadeOutcome {
        let logger = JobLogger::new(&job.job_id, "moderation");
        let path = job.path();
        let mut stages = vec![Stage::Start];
        let mut nsfw = NsfwCell::new();

        stages.push(Stage::MinorCheck);
        let minor = self
            .check(Stage::MinorCheck, &logger, self.classifier.is_minor(path))
            .await;

        if minor {
            stages.push(Stage::NsfwCheck);
            let is_nsfw = nsfw
                .get_or_eval(|| self.check(Stage::NsfwCheck, &logger, self.classifier.is_nsfw(path)))
                .await;
            if is_nsfw {
                return self.stop(&logger, stages, media, StopReason::MinorNsfw, Verdict::minor_nsfw());
            }
        }

        stages.push(Stage::PersonalInfoCheck);
        let personal_info = self
            .check(
                Stage::PersonalInfoCheck,
                &logger,
                self.classifier.detect_personal_info(path),
            )
            .await;
        if personal_info {
            return self.stop(
                &logger,
                stages,
                media,
                StopReason::PersonalInfo,
                Verdict::personal_info(),
            );
        }

        stages.push(Stage::ObjectDetection);
        let detector = MergedDetector::new(&self.classifier, &self.thresholds);
        let objects = match media {
            DecodedMedia::Still(_) => detector.detect_union(media.frames(), &logger).await,
            DecodedMedia::Keyframes(frames) => {
                detector.detect_votes(frames, &self.votes, &logger).await
            }
        };
        logger.log_stage(Stage::ObjectDetection, objects.any());

        if objects.animal {
            stages.push(Stage::NsfwCheck);
            let is_nsfw = nsfw
                .get_or_eval(|| self.check(Stage::NsfwCheck, &logger, self.classifier.is_nsfw(path)))
                .await;
            if is_nsfw {
                return self.stop(
                    &logger,
                    stages,
                    media,
                    StopReason::AnimalNsfw,
                    Verdict::animal_nsfw(objects),
                );
            }
        }

        stages.push(Stage::ViolenceCheck);
        let violence = self
            .check(
                Stage::ViolenceCheck,
                &logger,
                self.classifier.is_violence_detected(path),
            )
            .await;

        stages.push(Stage::NsfwFinalize);
        let is_nsfw = nsfw
            .get_or_eval(|| self.check(Stage::NsfwFinalize, &logger, self.classifier.is_nsfw(path)))
            .await;

        stages.push(Stage::Finalize);
        CascadeOutcome {
            verdict: Verdict::complete(objects, minor, is_nsfw, violence),
            stages,
            frames_evaluated: media.frame_count(),
        }
    }

    /// Await one classifier call; failures count as negative.
    async fn check<F>(&self, stage: Stage, logger: &JobLogger, call: F) -> bool
    where
        F: Future<Output = MlResult<bool>>,
    {
        match call.await {
            Ok(outcome) => {
                logger.log_stage(stage, outcome);
                outcome
            }
            Err(e) => {
                logger.log_classifier_failure(stage, &e.to_string());
                metrics::record_classifier_failure(stage);
                false
            }
        }
    }

    fn stop(
        &self,
        logger: &JobLogger,
        stages: Vec<Stage>,
        media: &DecodedMedia,
        reason: StopReason,
        verdict: Verdict,
    ) -> CascadeOutcome {
        let stage = stages.last().copied().unwrap_or(Stage::Start);
        logger.log_hard_stop(stage, reason);
        metrics::record_hard_stop(reason);

        CascadeOutcome {
            verdict,
            stages,
            frames_evaluated: media.frame_count(),
        }
    }
}
