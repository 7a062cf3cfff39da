//! Sequential video frame streams.
//!
//! `FfmpegFrameStream` pipes `rgb24` rawvideo out of an FFmpeg child process
//! and hands out one frame per read, so a sampler that stops early never
//! decodes the rest of the file.

use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use mguard_models::Frame;
use tokio::io::{AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::probe::probe_video;

/// A finite, non-restartable source of decoded frames.
#[async_trait]
pub trait FrameStream: Send {
    /// Next frame in decode order, or `None` at end of stream.
    async fn next_frame(&mut self) -> MediaResult<Option<Frame>>;
}

/// In-memory frame stream.
#[derive(Debug, Default)]
pub struct VecFrameStream {
    frames: VecDeque<Frame>,
}

impl VecFrameStream {
    pub fn new(frames: Vec<Frame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }
}

#[async_trait]
impl FrameStream for VecFrameStream {
    async fn next_frame(&mut self) -> MediaResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}

/// Output dimensions after optional downscaling, kept even for the scaler.
fn output_dimensions(width: u32, height: u32, max_width: Option<u32>) -> (u32, u32) {
    match max_width {
        Some(max) if max > 0 && width > max => {
            let out_w = (max & !1).max(2);
            let scaled_h = (height as u64 * out_w as u64 + width as u64 / 2) / width as u64;
            let out_h = ((scaled_h as u32) & !1).max(2);
            (out_w, out_h)
        }
        _ => (width, height),
    }
}

/// Frame stream backed by an FFmpeg child process.
pub struct FfmpegFrameStream {
    child: Child,
    stdout: BufReader<ChildStdout>,
    stderr_task: Option<JoinHandle<String>>,
    width: u32,
    height: u32,
    next_index: u64,
    finished: bool,
}

impl FfmpegFrameStream {
    /// Open a video, optionally downscaling frames wider than `max_width`.
    pub async fn open(path: impl AsRef<Path>, max_width: Option<u32>) -> MediaResult<Self> {
        let path = path.as_ref();
        let info = probe_video(path).await?;

        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let (width, height) = output_dimensions(info.width, info.height, max_width);

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error", "-noautorotate", "-i"])
            .arg(path)
            .args([
                "-vf",
                &format!("scale={}:{}", width, height),
                "-pix_fmt",
                "rgb24",
                "-f",
                "rawvideo",
                "-",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            MediaError::ffmpeg_failed(format!("Failed to spawn FFmpeg: {}", e), None, None)
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            MediaError::ffmpeg_failed("Failed to capture FFmpeg stdout", None, None)
        })?;

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                stderr.read_to_string(&mut buf).await.ok();
                buf
            })
        });

        debug!(
            path = %path.display(),
            source_width = info.width,
            source_height = info.height,
            width,
            height,
            "Opened FFmpeg frame stream"
        );

        Ok(Self {
            child,
            stdout: BufReader::new(stdout),
            stderr_task,
            width,
            height,
            next_index: 0,
            finished: false,
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reap the child once stdout is exhausted.
    async fn finish(&mut self) -> MediaResult<()> {
        self.finished = true;

        let status = self.child.wait().await?;
        let stderr = match self.stderr_task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            return Ok(());
        }

        // A broken tail is tolerated as long as some frames came out.
        if self.next_index > 0 {
            warn!(
                exit_code = ?status.code(),
                frames = self.next_index,
                "FFmpeg exited with error after decoding frames"
            );
            return Ok(());
        }

        Err(MediaError::ffmpeg_failed(
            "FFmpeg failed to decode video",
            Some(stderr),
            status.code(),
        ))
    }
}

#[async_trait]
impl FrameStream for FfmpegFrameStream {
    async fn next_frame(&mut self) -> MediaResult<Option<Frame>> {
        if self.finished {
            return Ok(None);
        }

        let mut buf = vec![0u8; Frame::byte_len(self.width, self.height)];
        match self.stdout.read_exact(&mut buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.finish().await?;
                return Ok(None);
            }
            Err(e) => return Err(MediaError::Io(e)),
        }

        let index = self.next_index;
        self.next_index += 1;

        Frame::new(index, self.width, self.height, buf)
            .map(Some)
            .ok_or_else(|| MediaError::internal("Raw frame size mismatch"))
    }
}
