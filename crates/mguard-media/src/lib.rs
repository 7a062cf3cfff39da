//! Media access for the moderation worker.
//!
//! This crate provides:
//! - Upload path resolution across storage roots
//! - Still image decoding via the `image` crate
//! - Video frame streaming via FFmpeg rawvideo output
//! - Scene-change keyframe sampling
//! - One-shot media loading for a job

pub mod decoder;
pub mod error;
pub mod loader;
pub mod paths;
pub mod probe;
pub mod sampler;
pub mod scene;
pub mod still;

pub use decoder::{FfmpegFrameStream, FrameStream, VecFrameStream};
pub use error::{MediaError, MediaResult};
pub use loader::MediaLoader;
pub use paths::{clean_upload_path, StorageRoots};
pub use probe::{probe_video, VideoInfo};
pub use sampler::{KeyframeSampler, SamplerConfig};
pub use scene::{mean_abs_diff, to_grayscale};
pub use still::decode_image;
