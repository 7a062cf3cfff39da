//! Decoded media representation.

/// A single decoded frame, packed RGB24.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Position of the frame in the decoded stream (0 for still images)
    pub index: u64,
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` bytes, row-major
    pub rgb: Vec<u8>,
}

impl Frame {
    /// Create a frame, returning `None` if the buffer size does not match the dimensions.
    pub fn new(index: u64, width: u32, height: u32, rgb: Vec<u8>) -> Option<Self> {
        if rgb.len() != Self::byte_len(width, height) {
            return None;
        }
        Some(Self {
            index,
            width,
            height,
            rgb,
        })
    }

    /// Uniformly colored frame.
    pub fn filled(index: u64, width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 3);
        for _ in 0..pixels {
            data.extend_from_slice(&rgb);
        }
        Self {
            index,
            width,
            height,
            rgb: data,
        }
    }

    /// Buffer size for an RGB24 frame.
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 3
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn same_dimensions(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }
}

/// Media decoded once per job and shared read-only by every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedMedia {
    Still(Frame),
    Keyframes(Vec<Frame>),
}

impl DecodedMedia {
    /// All frames in decode order.
    pub fn frames(&self) -> &[Frame] {
        match self {
            DecodedMedia::Still(frame) => std::slice::from_ref(frame),
            DecodedMedia::Keyframes(frames) => frames,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames().len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count() == 0
    }

    pub fn is_video(&self) -> bool {
        matches!(self, DecodedMedia::Keyframes(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rejects_wrong_buffer() {
        assert!(Frame::new(0, 2, 2, vec![0; 11]).is_none());
        assert!(Frame::new(0, 2, 2, vec![0; 12]).is_some());
    }

    #[test]
    fn test_filled_frame() {
        let frame = Frame::filled(3, 4, 2, [10, 20, 30]);
        assert_eq!(frame.rgb.len(), 24);
        assert_eq!(&frame.rgb[3..6], &[10, 20, 30]);
        assert_eq!(frame.pixel_count(), 8);
    }

    #[test]
    fn test_decoded_media_frames() {
        let still = DecodedMedia::Still(Frame::filled(0, 1, 1, [0, 0, 0]));
        assert_eq!(still.frame_count(), 1);
        assert!(!still.is_video());

        let video = DecodedMedia::Keyframes(Vec::new());
        assert!(video.is_empty());
        assert!(video.is_video());
    }
}
