//! Inference service HTTP client.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder};
use mguard_models::Frame;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::classifier::Classifier;
use crate::error::{MlError, MlResult};
use crate::pii::PersonalInfoRules;
use crate::types::{
    DetectedResponse, HealthResponse, ObjectsRequest, ObjectsResponse, PathRequest,
    TextExtraction, ViolencePrediction,
};

/// Extensions the NSFW model accepts.
const NSFW_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const NSFW_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

/// Configuration for ML client.
#[derive(Debug, Clone)]
pub struct MlClientConfig {
    /// Base URL of the inference service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries for transient failures
    pub max_retries: u32,
    /// Own domain; links and digits next to it are not personal details
    pub platform_domain: Option<String>,
}

impl Default for MlClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(120),
            max_retries: 2,
            platform_domain: None,
        }
    }
}

impl MlClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("ML_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8001".to_string()),
            timeout: Duration::from_secs(
                std::env::var("ML_SERVICE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            max_retries: std::env::var("ML_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
            platform_domain: std::env::var("PLATFORM_DOMAIN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Client for the Python inference service.
pub struct MlClient {
    http: Client,
    config: MlClientConfig,
    rules: PersonalInfoRules,
}

impl MlClient {
    /// Create a new ML client.
    pub fn new(config: MlClientConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        let rules = PersonalInfoRules::new(config.platform_domain.clone());

        Ok(Self {
            http,
            config,
            rules,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(MlClientConfig::from_env())
    }

    pub fn config(&self) -> &MlClientConfig {
        &self.config
    }

    /// Check if the inference service is healthy.
    pub async fn health_check(&self) -> MlResult<bool> {
        let url = format!("{}/health", self.config.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let health: HealthResponse = response.json().await?;
                Ok(health.status == "healthy" || health.status == "ok")
            }
            Ok(response) => {
                warn!("ML service health check failed: {}", response.status());
                Ok(false)
            }
            Err(e) => {
                warn!("ML service health check error: {}", e);
                Ok(false)
            }
        }
    }

    /// OCR text, QR payloads and entities for a file.
    pub async fn extract_text(&self, path: &Path) -> MlResult<TextExtraction> {
        ensure_exists(path)?;
        self.post_json("/v1/text", &path_request(path)).await
    }

    /// Raw top prediction of the violence model.
    pub async fn predict_violence(&self, path: &Path) -> MlResult<ViolencePrediction> {
        ensure_exists(path)?;
        self.post_json("/v1/violence", &path_request(path)).await
    }

    async fn post_json<Req, Resp>(&self, endpoint: &str, body: &Req) -> MlResult<Resp>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned + Send,
    {
        let url = format!("{}{}", self.config.base_url, endpoint);

        debug!(endpoint, "Sending inference request");

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .post(&url)
                    .json(body)
                    .send()
                    .await
                    .map_err(MlError::Network)?;

                let status = response.status();
                if status.is_server_error() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(MlError::ServiceUnavailable(format!("{}: {}", status, text)));
                }
                Ok(response)
            })
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::request_failed(format!(
                "ML service returned {}: {}",
                status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> MlResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = MlResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "ML request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| MlError::request_failed("Unknown error")))
    }
}

#[async_trait]
impl Classifier for MlClient {
    async fn is_minor(&self, path: &Path) -> MlResult<bool> {
        ensure_exists(path)?;
        let response: DetectedResponse = self.post_json("/v1/minor", &path_request(path)).await?;
        Ok(response.detected)
    }

    async fn is_nsfw(&self, path: &Path) -> MlResult<bool> {
        ensure_exists(path)?;
        ensure_nsfw_supported(path)?;
        let response: DetectedResponse = self.post_json("/v1/nsfw", &path_request(path)).await?;
        Ok(response.detected)
    }

    async fn detect_personal_info(&self, path: &Path) -> MlResult<bool> {
        let extraction = self.extract_text(path).await?;
        Ok(self.rules.evaluate(&extraction))
    }

    async fn is_violence_detected(&self, path: &Path) -> MlResult<bool> {
        let prediction = self.predict_violence(path).await?;
        debug!(
            label = %prediction.label,
            probability = prediction.probability,
            "Violence prediction"
        );
        Ok(prediction.is_violent())
    }

    async fn detect_objects(
        &self,
        frame: &Frame,
        labels: &[&str],
    ) -> MlResult<HashMap<String, f32>> {
        let request = ObjectsRequest {
            image_png_base64: encode_png_base64(frame)?,
            labels: labels.iter().map(|l| l.to_string()).collect(),
        };

        let response: ObjectsResponse = self.post_json("/v1/objects", &request).await?;
        Ok(max_scores(response, labels))
    }
}

fn path_request(path: &Path) -> PathRequest {
    PathRequest {
        path: path.to_string_lossy().into_owned(),
    }
}

fn ensure_exists(path: &Path) -> MlResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(MlError::FileNotFound(path.to_path_buf()))
    }
}

fn ensure_nsfw_supported(path: &Path) -> MlResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if NSFW_IMAGE_EXTENSIONS.contains(&ext.as_str()) || NSFW_VIDEO_EXTENSIONS.contains(&ext.as_str())
    {
        Ok(())
    } else {
        Err(MlError::UnsupportedFileType(ext))
    }
}

fn encode_png_base64(frame: &Frame) -> MlResult<String> {
    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(&frame.rgb, frame.width, frame.height, ColorType::Rgb8)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(png))
}

/// Highest score per requested label; anything not requested is dropped.
fn max_scores(response: ObjectsResponse, labels: &[&str]) -> HashMap<String, f32> {
    let mut scores: HashMap<String, f32> = HashMap::new();
    for detection in response.detections {
        if !labels.contains(&detection.label.as_str()) {
            continue;
        }
        scores
            .entry(detection.label)
            .and_modify(|s| *s = s.max(detection.score))
            .or_insert(detection.score);
    }
    scores
}
