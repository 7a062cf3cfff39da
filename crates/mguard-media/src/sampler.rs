//! Scene-change keyframe sampling.
//!
//! # Algorithm
//! 1. Decode frames sequentially and convert each to grayscale
//! 2. Compare against the previous frame by mean absolute pixel difference
//! 3. Keep the frame when the difference exceeds the scene threshold
//! 4. Stop after `max_frames` keyframes or at end of stream
//!
//! A video with no scene change yields its first frame so callers always
//! get something to classify.

use mguard_models::Frame;
use tracing::{debug, info, warn};

use crate::decoder::FrameStream;
use crate::error::MediaResult;
use crate::scene::{mean_abs_diff, to_grayscale};

/// Configuration for keyframe sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Maximum keyframes returned
    pub max_frames: usize,
    /// Mean intensity delta (0-255) above which a frame counts as a scene change
    pub scene_threshold: f64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            max_frames: 12,
            scene_threshold: 25.0,
        }
    }
}

/// Keyframe sampler using frame differencing.
#[derive(Debug, Clone, Default)]
pub struct KeyframeSampler {
    config: SamplerConfig,
}

impl KeyframeSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Sample keyframes from a frame stream.
    ///
    /// Consumes the stream up to the point sampling stops; the stream is
    /// not reusable afterwards.
    pub async fn sample(&self, stream: &mut dyn FrameStream) -> MediaResult<Vec<Frame>> {
        if self.config.max_frames == 0 {
            return Ok(Vec::new());
        }

        let mut first: Option<Frame> = None;
        let mut prev_gray: Option<Vec<u8>> = None;
        let mut keyframes = Vec::new();
        let mut decoded = 0u64;

        loop {
            let frame = match stream.next_frame().await {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) if decoded > 0 => {
                    warn!(decoded, "Frame decode failed mid-stream, keeping frames so far: {}", e);
                    break;
                }
                Err(e) => return Err(e),
            };
            decoded += 1;

            let gray = to_grayscale(&frame);

            if let Some(prev) = prev_gray.as_deref() {
                let score = mean_abs_diff(prev, &gray);
                if score > self.config.scene_threshold {
                    debug!(
                        frame = frame.index,
                        score = format!("{:.2}", score),
                        "Scene change"
                    );
                    keyframes.push(frame.clone());
                }
            }

            prev_gray = Some(gray);
            if first.is_none() {
                first = Some(frame);
            }

            if keyframes.len() >= self.config.max_frames {
                debug!("Reached max keyframes");
                break;
            }
        }

        if keyframes.is_empty() {
            if let Some(frame) = first {
                debug!("No scene changes detected, using first frame");
                keyframes.push(frame);
            }
        }

        info!(
            decoded,
            selected = keyframes.len(),
            "Keyframe sampling complete"
        );

        Ok(keyframes)
    }
}
