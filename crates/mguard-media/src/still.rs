//! Still image decoding.

use std::path::{Path, PathBuf};

use mguard_models::Frame;
use tracing::debug;

use crate::error::{MediaError, MediaResult};

/// Decode an image file into a single RGB frame.
///
/// Decoding runs on the blocking pool; large PNGs can take a while.
pub async fn decode_image(path: impl AsRef<Path>) -> MediaResult<Frame> {
    let path: PathBuf = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path));
    }

    let frame = tokio::task::spawn_blocking(move || decode_image_sync(&path))
        .await
        .map_err(|e| MediaError::internal(format!("Image decode task failed: {}", e)))??;

    debug!(width = frame.width, height = frame.height, "Decoded still image");
    Ok(frame)
}

fn decode_image_sync(path: &Path) -> MediaResult<Frame> {
    let rgb = image::open(path)?.to_rgb8();
    let (width, height) = rgb.dimensions();

    Frame::new(0, width, height, rgb.into_raw())
        .ok_or_else(|| MediaError::internal("Decoded buffer does not match image dimensions"))
}
