//! Scene-difference math on raw frames.
//!
//! Grayscale uses ITU-R BT.601 luma weights, the same conversion OpenCV
//! applies for `COLOR_RGB2GRAY`, in 8.14 fixed point.

use mguard_models::Frame;

const R_WEIGHT: u32 = 4899; // 0.299 * 2^14
const G_WEIGHT: u32 = 9617; // 0.587 * 2^14
const B_WEIGHT: u32 = 1868; // 0.114 * 2^14
const ROUND: u32 = 1 << 13;

/// Difference reported for frames that cannot be compared pixel by pixel.
pub const MAX_DIFF: f64 = 255.0;

/// Convert an RGB24 frame to 8-bit luma.
pub fn to_grayscale(frame: &Frame) -> Vec<u8> {
    frame
        .rgb
        .chunks_exact(3)
        .map(|px| {
            let y = px[0] as u32 * R_WEIGHT + px[1] as u32 * G_WEIGHT + px[2] as u32 * B_WEIGHT;
            ((y + ROUND) >> 14).min(255) as u8
        })
        .collect()
}

/// Mean absolute difference between two grayscale buffers.
///
/// Buffers of different length (a resolution change) count as a full cut.
pub fn mean_abs_diff(a: &[u8], b: &[u8]) -> f64 {
    if a.len() != b.len() {
        return MAX_DIFF;
    }
    if a.is_empty() {
        return 0.0;
    }

    let total: u64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| x.abs_diff(*y) as u64)
        .sum();

    total as f64 / a.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_primaries() {
        let white = Frame::filled(0, 1, 1, [255, 255, 255]);
        assert_eq!(to_grayscale(&white), vec![255]);

        let black = Frame::filled(0, 1, 1, [0, 0, 0]);
        assert_eq!(to_grayscale(&black), vec![0]);

        let red = Frame::filled(0, 1, 1, [255, 0, 0]);
        assert_eq!(to_grayscale(&red), vec![76]);

        let green = Frame::filled(0, 1, 1, [0, 255, 0]);
        assert_eq!(to_grayscale(&green), vec![150]);
    }

    #[test]
    fn test_mean_abs_diff() {
        assert_eq!(mean_abs_diff(&[10, 20], &[10, 20]), 0.0);
        assert_eq!(mean_abs_diff(&[0, 100], &[50, 50]), 50.0);
        assert_eq!(mean_abs_diff(&[], &[]), 0.0);
        assert_eq!(mean_abs_diff(&[1, 2, 3], &[1, 2]), MAX_DIFF);
    }
}
