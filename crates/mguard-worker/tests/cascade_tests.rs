//! Cascade, assembler and executor behavior against stub collaborators.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mguard_media::{MediaLoader, StorageRoots};
use mguard_ml_client::{Classifier, MlError, MlResult};
use mguard_models::{
    DecodedMedia, Frame, MediaKind, ModerationJob, RecordRef, StopReason, Verdict,
};
use mguard_queue::{ModerationQueue, QueueConfig};
use mguard_store::{FlagSet, StoreError, StoreResult, UpdateStatus, VerdictStore};
use mguard_worker::executor::JobReport;
use mguard_worker::moderation::MergedDetector;
use mguard_worker::{
    JobExecutor, JobLogger, ModerationCascade, Stage, ThresholdTable, VerdictAssembler, VotePolicy,
    WorkerConfig, WorkerError,
};

#[derive(Default)]
struct Calls {
    minor: AtomicUsize,
    nsfw: AtomicUsize,
    personal_info: AtomicUsize,
    violence: AtomicUsize,
    objects: AtomicUsize,
}

/// Classifier with scripted answers. `None` answers fail the call.
#[derive(Default)]
struct StubClassifier {
    minor: Option<bool>,
    nsfw: Option<bool>,
    personal_info: Option<bool>,
    violence: Option<bool>,
    /// Scores by frame index; missing frames detect nothing
    objects: HashMap<u64, Vec<(&'static str, f32)>>,
    /// Frame indices whose detector call fails
    failing_frames: Vec<u64>,
    calls: Calls,
}

impl StubClassifier {
    fn negative() -> Self {
        Self {
            minor: Some(false),
            nsfw: Some(false),
            personal_info: Some(false),
            violence: Some(false),
            ..Default::default()
        }
    }

    fn with_objects(mut self, frame: u64, scores: &[(&'static str, f32)]) -> Self {
        self.objects.insert(frame, scores.to_vec());
        self
    }

    fn answer(value: Option<bool>, what: &str) -> MlResult<bool> {
        value.ok_or_else(|| MlError::ServiceUnavailable(format!("{} model down", what)))
    }

    fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for StubClassifier {
    async fn is_minor(&self, _: &Path) -> MlResult<bool> {
        self.calls.minor.fetch_add(1, Ordering::SeqCst);
        Self::answer(self.minor, "minor")
    }

    async fn is_nsfw(&self, _: &Path) -> MlResult<bool> {
        self.calls.nsfw.fetch_add(1, Ordering::SeqCst);
        Self::answer(self.nsfw, "nsfw")
    }

    async fn detect_personal_info(&self, _: &Path) -> MlResult<bool> {
        self.calls.personal_info.fetch_add(1, Ordering::SeqCst);
        Self::answer(self.personal_info, "text")
    }

    async fn is_violence_detected(&self, _: &Path) -> MlResult<bool> {
        self.calls.violence.fetch_add(1, Ordering::SeqCst);
        Self::answer(self.violence, "violence")
    }

    async fn detect_objects(
        &self,
        frame: &Frame,
        labels: &[&str],
    ) -> MlResult<HashMap<String, f32>> {
        self.calls.objects.fetch_add(1, Ordering::SeqCst);
        if self.failing_frames.contains(&frame.index) {
            return Err(MlError::request_failed("detector crashed"));
        }
        Ok(self
            .objects
            .get(&frame.index)
            .map(|scores| {
                scores
                    .iter()
                    .filter(|(label, _)| labels.contains(label))
                    .map(|(label, score)| (label.to_string(), *score))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Store that records every update.
#[derive(Default)]
struct RecordingStore {
    updates: Mutex<Vec<(RecordRef, FlagSet)>>,
    fail: bool,
    unchanged: bool,
}

impl RecordingStore {
    fn updates(&self) -> Vec<(RecordRef, FlagSet)> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl VerdictStore for RecordingStore {
    async fn update(&self, record: &RecordRef, flags: &FlagSet) -> StoreResult<UpdateStatus> {
        if self.fail {
            return Err(StoreError::config("database unavailable"));
        }
        self.updates
            .lock()
            .unwrap()
            .push((record.clone(), flags.clone()));
        Ok(if self.unchanged {
            UpdateStatus::NoRowsAffected
        } else {
            UpdateStatus::Updated(1)
        })
    }
}

fn cascade(classifier: Arc<StubClassifier>) -> ModerationCascade<Arc<StubClassifier>> {
    ModerationCascade::new(
        classifier,
        MediaLoader::default(),
        ThresholdTable::default(),
        VotePolicy::default(),
    )
}

fn image_job() -> ModerationJob {
    ModerationJob::new(
        RecordRef::new("attachments", "a83e"),
        "uploads/posts/images/1.jpg",
        "/srv/storage/uploads/posts/images/1.jpg",
        MediaKind::Image,
    )
}

fn video_job() -> ModerationJob {
    ModerationJob::new(
        RecordRef::new("post_media", "42"),
        "uploads/posts/videos/1.mp4",
        "/srv/storage/uploads/posts/videos/1.mp4",
        MediaKind::Video,
    )
}

fn still() -> DecodedMedia {
    DecodedMedia::Still(Frame::filled(0, 4, 4, [120, 80, 40]))
}

fn keyframes(count: u64) -> DecodedMedia {
    DecodedMedia::Keyframes(
        (0..count)
            .map(|i| Frame::filled(i * 30, 4, 4, [i as u8 * 40, 0, 0]))
            .collect(),
    )
}

fn write_png(dir: &Path, relative: &str) -> PathBuf {
    let path = dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_pixel(8, 8, image::Rgb([200, 30, 30]))
        .save(&path)
        .unwrap();
    path
}

#[tokio::test]
async fn test_minor_and_nsfw_stops_before_other_classifiers() {
    let classifier = Arc::new(StubClassifier {
        minor: Some(true),
        nsfw: Some(true),
        ..StubClassifier::negative()
    });
    let outcome = cascade(classifier.clone())
        .evaluate(&image_job(), &still())
        .await;

    assert_eq!(outcome.verdict, Verdict::minor_nsfw());
    assert_eq!(outcome.verdict.stop_reason, Some(StopReason::MinorNsfw));
    assert_eq!(
        outcome.stages,
        vec![Stage::Start, Stage::MinorCheck, Stage::NsfwCheck]
    );

    let calls = &classifier.calls;
    assert_eq!(StubClassifier::count(&calls.nsfw), 1);
    assert_eq!(StubClassifier::count(&calls.personal_info), 0);
    assert_eq!(StubClassifier::count(&calls.objects), 0);
    assert_eq!(StubClassifier::count(&calls.violence), 0);
}

#[tokio::test]
async fn test_personal_info_stops_cascade() {
    let classifier = Arc::new(StubClassifier {
        personal_info: Some(true),
        ..StubClassifier::negative()
    });
    let outcome = cascade(classifier.clone())
        .evaluate(&image_job(), &still())
        .await;

    assert_eq!(outcome.verdict, Verdict::personal_info());
    assert!(!outcome.verdict.nsfw);
    assert_eq!(outcome.final_stage(), Some(Stage::PersonalInfoCheck));
    assert!(!outcome.visited(Stage::NsfwCheck));

    let calls = &classifier.calls;
    assert_eq!(StubClassifier::count(&calls.nsfw), 0);
    assert_eq!(StubClassifier::count(&calls.objects), 0);
    assert_eq!(StubClassifier::count(&calls.violence), 0);
}

#[tokio::test]
async fn test_minor_without_nsfw_continues_and_reuses_nsfw() {
    let classifier = Arc::new(StubClassifier {
        minor: Some(true),
        ..StubClassifier::negative()
    });
    let outcome = cascade(classifier.clone())
        .evaluate(&image_job(), &still())
        .await;

    assert_eq!(outcome.final_stage(), Some(Stage::Finalize));
    assert!(outcome.verdict.minor);
    assert!(!outcome.verdict.nsfw);
    assert!(outcome.visited(Stage::NsfwFinalize));
    assert_eq!(StubClassifier::count(&classifier.calls.nsfw), 1);
}

#[tokio::test]
async fn test_animal_and_nsfw_stops_with_object_flags() {
    let classifier = Arc::new(
        StubClassifier {
            nsfw: Some(true),
            ..StubClassifier::negative()
        }
        .with_objects(0, &[("Dog", 0.9), ("knife", 0.35), ("Beer", 0.1)]),
    );
    let outcome = cascade(classifier.clone())
        .evaluate(&image_job(), &still())
        .await;

    let verdict = outcome.verdict;
    assert_eq!(verdict.stop_reason, Some(StopReason::AnimalNsfw));
    assert!(verdict.animal && verdict.weapon && verdict.nsfw);
    assert!(!verdict.das && !verdict.violence && !verdict.minor);
    assert_eq!(StubClassifier::count(&classifier.calls.violence), 0);
    assert_eq!(StubClassifier::count(&classifier.calls.nsfw), 1);
}

#[tokio::test]
async fn test_finalize_with_animal_and_violence() {
    let classifier = Arc::new(
        StubClassifier {
            violence: Some(true),
            ..StubClassifier::negative()
        }
        .with_objects(0, &[("Cat", 0.8)]),
    );
    let outcome = cascade(classifier.clone())
        .evaluate(&image_job(), &still())
        .await;

    let expected = Verdict {
        animal: true,
        violence: true,
        ..Default::default()
    };
    assert_eq!(outcome.verdict, expected);
    assert_eq!(
        outcome.stages,
        vec![
            Stage::Start,
            Stage::MinorCheck,
            Stage::PersonalInfoCheck,
            Stage::ObjectDetection,
            Stage::NsfwCheck,
            Stage::ViolenceCheck,
            Stage::NsfwFinalize,
            Stage::Finalize,
        ]
    );
    // Animal fired, so NSFW ran once at the animal check and was reused.
    assert_eq!(StubClassifier::count(&classifier.calls.nsfw), 1);
}

#[tokio::test]
async fn test_identical_inputs_give_identical_verdicts() {
    let classifier = Arc::new(
        StubClassifier {
            violence: Some(true),
            ..StubClassifier::negative()
        }
        .with_objects(0, &[("Wine", 0.5), ("sword", 0.4)]),
    );
    let cascade = cascade(classifier);

    let first = cascade.evaluate(&image_job(), &still()).await;
    let second = cascade.evaluate(&image_job(), &still()).await;

    assert_eq!(
        serde_json::to_vec(&first.verdict).unwrap(),
        serde_json::to_vec(&second.verdict).unwrap()
    );
    assert_eq!(first.stages, second.stages);
}

#[tokio::test]
async fn test_classifier_failures_are_negative() {
    let classifier = Arc::new(StubClassifier {
        minor: None,
        nsfw: None,
        personal_info: None,
        violence: None,
        failing_frames: vec![0],
        ..Default::default()
    });
    let outcome = cascade(classifier.clone())
        .evaluate(&image_job(), &still())
        .await;

    assert_eq!(outcome.verdict, Verdict::default());
    assert_eq!(outcome.final_stage(), Some(Stage::Finalize));
    assert_eq!(StubClassifier::count(&classifier.calls.violence), 1);
    assert_eq!(StubClassifier::count(&classifier.calls.nsfw), 1);
}

#[tokio::test]
async fn test_video_votes_per_category() {
    // Animal on 3 of 5 keyframes, weapon on 1, drugs on 2 (below ratio).
    let classifier = Arc::new(
        StubClassifier::negative()
            .with_objects(0, &[("Dog", 0.6)])
            .with_objects(30, &[("Dog", 0.6), ("gun", 0.5), ("Pill", 0.9)])
            .with_objects(60, &[("Horse", 0.5), ("Pill", 0.9)])
            .with_objects(90, &[("Cow", 0.2)]),
    );
    let outcome = cascade(classifier.clone())
        .evaluate(&video_job(), &keyframes(5))
        .await;

    assert_eq!(outcome.frames_evaluated, 5);
    assert!(outcome.verdict.animal);
    assert!(!outcome.verdict.weapon);
    assert!(!outcome.verdict.das);
    assert_eq!(StubClassifier::count(&classifier.calls.objects), 5);
}

#[tokio::test]
async fn test_video_ratio_vote_and_failed_frames() {
    // Weapon on 2 of 3 frames passes on ratio; the failed frame still counts.
    let classifier = Arc::new(StubClassifier {
        failing_frames: vec![60],
        ..StubClassifier::negative()
            .with_objects(0, &[("rifle", 0.4)])
            .with_objects(30, &[("rifle", 0.4)])
    });
    let outcome = cascade(classifier)
        .evaluate(&video_job(), &keyframes(3))
        .await;

    assert!(outcome.verdict.weapon);
    assert!(!outcome.verdict.animal);

    let classifier = Arc::new(StubClassifier {
        failing_frames: vec![30, 60],
        ..StubClassifier::negative().with_objects(0, &[("rifle", 0.4)])
    });
    let outcome = cascade(classifier)
        .evaluate(&video_job(), &keyframes(3))
        .await;
    assert!(!outcome.verdict.weapon);
}

#[tokio::test]
async fn test_run_decodes_image_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "uploads/a.png");
    let job = ModerationJob::new(
        RecordRef::new("attachments", "1"),
        "uploads/a.png",
        path,
        MediaKind::Image,
    );

    let classifier = Arc::new(StubClassifier::negative().with_objects(0, &[("Beer", 0.5)]));
    let outcome = cascade(classifier).run(&job).await.unwrap();

    assert_eq!(outcome.frames_evaluated, 1);
    assert!(outcome.verdict.das);
    assert!(!outcome.verdict.is_hard_stop());
}

#[tokio::test]
async fn test_run_rejects_missing_file_without_classifying() {
    let classifier = Arc::new(StubClassifier::negative());
    let result = cascade(classifier.clone()).run(&image_job()).await;

    assert!(matches!(result, Err(WorkerError::FileNotFound(_))));
    assert_eq!(StubClassifier::count(&classifier.calls.minor), 0);
}

#[tokio::test]
async fn test_assembler_writes_evaluated_columns() {
    let store = Arc::new(RecordingStore::default());
    let assembler = VerdictAssembler::new(store.clone());
    let job = image_job();

    let outcome = assembler.persist(&job, &Verdict::minor_nsfw()).await;
    assert!(outcome.success);

    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, job.record);
    let columns: Vec<_> = updates[0].1.assignments().collect();
    assert_eq!(
        columns,
        vec![("minor_detected", true), ("nsfw_detected", true)]
    );
}

#[tokio::test]
async fn test_assembler_reports_store_failure() {
    let store = RecordingStore {
        fail: true,
        ..Default::default()
    };
    let outcome = VerdictAssembler::new(store)
        .persist(&image_job(), &Verdict::default())
        .await;

    assert!(!outcome.success);
    assert!(outcome.status.contains("database unavailable"));
}

#[tokio::test]
async fn test_assembler_treats_unchanged_row_as_success() {
    let store = RecordingStore {
        unchanged: true,
        ..Default::default()
    };
    let outcome = VerdictAssembler::new(store)
        .persist(&image_job(), &Verdict::default())
        .await;

    assert!(outcome.success);
    assert_eq!(outcome.status, "no rows affected");
}

#[tokio::test]
async fn test_executor_processes_message_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "uploads/posts/images/17665066961999.png");

    let classifier = Arc::new(StubClassifier {
        violence: Some(true),
        ..StubClassifier::negative()
    });
    let store = Arc::new(RecordingStore::default());
    let executor = JobExecutor::new(
        WorkerConfig::default(),
        ModerationQueue::new(QueueConfig::default()).unwrap(),
        StorageRoots::new(vec![dir.path().to_path_buf()]),
        classifier,
        store.clone(),
    );

    let raw = r#"{"type":"attachment","table":"attachments","id":"a83edaf0","data":{"file":"uploads\/posts\/images\/17665066961999.png","type":"images","post_id":512,"user_id":6}}"#;
    let report = executor.process_message(raw).await;

    match report {
        JobReport::Completed { job, outcome, persist } => {
            assert_eq!(job.record.primary_key_value, "a83edaf0");
            assert!(outcome.verdict.violence);
            assert!(persist.success);
        }
        other => panic!("unexpected report: {:?}", other),
    }

    let updates = store.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].1.get("violence_detected"), Some(true));
    assert_eq!(updates[0].1.assignments().count(), 7);
}

#[tokio::test]
async fn test_executor_persists_nothing_for_rejected_job() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(RecordingStore::default());
    let executor = JobExecutor::new(
        WorkerConfig::default(),
        ModerationQueue::new(QueueConfig::default()).unwrap(),
        StorageRoots::new(vec![dir.path().to_path_buf()]),
        Arc::new(StubClassifier::negative()),
        store.clone(),
    );

    let raw = r#"{"table":"attachments","id":"1","data":{"file":"uploads/missing.mp4"}}"#;
    let report = executor.process_message(raw).await;

    assert!(matches!(
        report,
        JobReport::Rejected(WorkerError::FileNotFound(_))
    ));
    assert!(store.updates().is_empty());
}

#[tokio::test]
async fn test_detect_union_stops_once_every_category_fired() {
    let classifier = StubClassifier::negative()
        .with_objects(0, &[("Dog", 0.9), ("Beer", 0.9), ("knife", 0.9)])
        .with_objects(30, &[("Cat", 0.9)]);
    let thresholds = ThresholdTable::default();
    let detector = MergedDetector::new(&classifier, &thresholds);
    let logger = JobLogger::from_string("job-union", "test");

    let flags = detector.detect_union(keyframes(3).frames(), &logger).await;

    assert!(flags.all());
    assert_eq!(StubClassifier::count(&classifier.calls.objects), 1);
}

#[tokio::test]
async fn test_detect_union_scans_every_frame_until_complete() {
    let classifier = StubClassifier::negative()
        .with_objects(0, &[("Dog", 0.9)])
        .with_objects(30, &[("Beer", 0.9)]);
    let thresholds = ThresholdTable::default();
    let detector = MergedDetector::new(&classifier, &thresholds);
    let logger = JobLogger::from_string("job-union", "test");

    let flags = detector.detect_union(keyframes(3).frames(), &logger).await;

    assert!(!flags.all());
    assert_eq!(StubClassifier::count(&classifier.calls.objects), 3);
}
