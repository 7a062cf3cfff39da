//! Inference service request/response types.

use serde::{Deserialize, Serialize};

/// Request for the path-based classifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathRequest {
    pub path: String,
}

/// Boolean classifier response (`/v1/minor`, `/v1/nsfw`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedResponse {
    pub detected: bool,
}

/// Top prediction of the violence model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolencePrediction {
    pub label: String,
    pub probability: f32,
}

impl ViolencePrediction {
    pub const VIOLENCE_LABEL: &'static str = "Violence";
    pub const MIN_PROBABILITY: f32 = 0.65;

    /// Violence counts only for the `Violence` class at 0.65 or above.
    pub fn is_violent(&self) -> bool {
        self.label == Self::VIOLENCE_LABEL && self.probability >= Self::MIN_PROBABILITY
    }
}

/// Named entity found in extracted text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    /// spaCy-style entity label (`GPE`, `LOC`, `PERSON`, ...)
    pub label: String,
}

/// OCR text, decoded QR payloads and entities for one file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextExtraction {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub qr_payloads: Vec<String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Entities recognized in the decoded QR payloads.
    #[serde(default)]
    pub qr_entities: Vec<Entity>,
}

/// Open-vocabulary detection request for one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectsRequest {
    pub image_png_base64: String,
    pub labels: Vec<String>,
}

/// One raw detection; no threshold applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectsResponse {
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: Option<String>,
}
