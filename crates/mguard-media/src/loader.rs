//! One-shot media loading for a moderation job.

use mguard_models::{DecodedMedia, MediaKind, ModerationJob};
use tracing::{debug, info};

use crate::decoder::FfmpegFrameStream;
use crate::error::{MediaError, MediaResult};
use crate::sampler::{KeyframeSampler, SamplerConfig};
use crate::still::decode_image;

/// Decodes a job's file into the frames the cascade classifies.
#[derive(Debug, Clone)]
pub struct MediaLoader {
    sampler: KeyframeSampler,
    decode_width: Option<u32>,
}

impl Default for MediaLoader {
    fn default() -> Self {
        Self::new(SamplerConfig::default(), Some(640))
    }
}

impl MediaLoader {
    /// Create a loader. `decode_width` caps the width of decoded video frames.
    pub fn new(sampler: SamplerConfig, decode_width: Option<u32>) -> Self {
        Self {
            sampler: KeyframeSampler::new(sampler),
            decode_width,
        }
    }

    pub fn sampler(&self) -> &KeyframeSampler {
        &self.sampler
    }

    /// Load a job's media.
    ///
    /// Images decode to a single still. Videos are streamed through the
    /// keyframe sampler and must yield at least one frame.
    pub async fn load(&self, job: &ModerationJob) -> MediaResult<DecodedMedia> {
        let path = job.path();

        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        match job.media_kind {
            MediaKind::Image => {
                let frame = decode_image(path).await?;
                debug!(job_id = %job.job_id, "Loaded still image");
                Ok(DecodedMedia::Still(frame))
            }
            MediaKind::Video => {
                let mut stream = FfmpegFrameStream::open(path, self.decode_width).await?;
                let frames = self.sampler.sample(&mut stream).await?;

                if frames.is_empty() {
                    return Err(MediaError::invalid_video("No decodable frames"));
                }

                info!(
                    job_id = %job.job_id,
                    keyframes = frames.len(),
                    "Loaded video keyframes"
                );
                Ok(DecodedMedia::Keyframes(frames))
            }
        }
    }
}
