//! # Image Analysis Helpers
//!
//! Pre-flight checks used by the CLI before encoding or decoding: supported formats, writable
//! output locations, how many characters fit, and a rough guess at whether an image carries a
//! hidden message at all.

use std::path::Path;

use image::ImageFormat;

use crate::error::Result;
use crate::processing::channels::capacity_bits;
use crate::processing::framing::{BITS_PER_CHAR, TERMINATOR_BITS};
use crate::processing::steganography::{decode_image, PixelBuffer};

/// Pixels sampled by [`is_likely_steganographic`].
pub const LSB_SAMPLE_PIXELS: usize = 1000;

/// Ratio of set LSBs considered "natural" noise.
pub const LSB_RATIO_RANGE: (f64, f64) = (0.45, 0.55);

/// Number of characters (envelope tag included) that fit in a `width` x `height` image.
pub fn estimate_capacity_chars(width: u32, height: u32) -> u64 {
    capacity_chars_for_bits(capacity_bits(width, height))
}

/// Number of characters (envelope tag included) that fit in `bits` of capacity.
pub fn capacity_chars_for_bits(bits: u64) -> u64 {
    bits.saturating_sub(TERMINATOR_BITS as u64) / BITS_PER_CHAR as u64
}

/// Fraction of set LSBs over the RGB samples of the first `sample_pixels` pixels.
///
/// Returns `None` for an empty image.
pub fn lsb_ratio(pixels: &PixelBuffer, sample_pixels: usize) -> Option<f64> {
    let samples = sample_pixels.saturating_mul(3).min(pixels.channels.len());
    if samples == 0 {
        return None;
    }
    let ones = pixels.channels[..samples]
        .iter()
        .filter(|s| *s & 1 == 1)
        .count();
    Some(ones as f64 / samples as f64)
}

/// Heuristic: does this image look like it carries LSB data?
///
/// Only PNG files qualify, since JPEG compression wipes LSBs. The ratio of set LSBs in the
/// first [`LSB_SAMPLE_PIXELS`] pixels must fall inside [`LSB_RATIO_RANGE`]. This is a guess
/// and gives both false positives and false negatives.
pub fn is_likely_steganographic(bytes: &[u8]) -> bool {
    if !matches!(image::guess_format(bytes), Ok(ImageFormat::Png)) {
        return false;
    }
    let pixels = match decode_image(bytes) {
        Ok(pixels) => pixels,
        Err(_) => return false,
    };

    match lsb_ratio(&pixels, LSB_SAMPLE_PIXELS) {
        Some(ratio) => LSB_RATIO_RANGE.0 <= ratio && ratio <= LSB_RATIO_RANGE.1,
        None => false,
    }
}

/// True if `path` exists and holds a PNG or JPEG image.
pub fn validate_image_path(path: &Path) -> bool {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    matches!(
        image::guess_format(&bytes),
        Ok(ImageFormat::Png) | Ok(ImageFormat::Jpeg)
    )
}

/// True if the directory that would hold `path` exists and is not read-only.
pub fn validate_output_path(path: &Path) -> bool {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match std::fs::metadata(dir) {
        Ok(meta) => meta.is_dir() && !meta.permissions().readonly(),
        Err(_) => false,
    }
}

/// Reads a UTF-8 text file to use as the payload.
pub fn read_text_file(path: &Path) -> Result<String> {
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::steganography::encode_image;

    fn png_with(channels: Vec<u8>, width: u32, height: u32) -> Vec<u8> {
        encode_image(&PixelBuffer::new(width, height, channels).unwrap()).unwrap()
    }

    #[test]
    fn test_estimate_capacity_chars() {
        assert_eq!(estimate_capacity_chars(4, 4), 4);
        assert_eq!(estimate_capacity_chars(800, 600), 179_998);
        assert_eq!(estimate_capacity_chars(1, 1), 0);
        assert_eq!(capacity_chars_for_bits(96), 10);
    }

    #[test]
    fn test_lsb_ratio() {
        let pixels = PixelBuffer::new(2, 1, vec![1, 0, 1, 0, 1, 0]).unwrap();
        assert_eq!(lsb_ratio(&pixels, 10), Some(0.5));
        assert_eq!(lsb_ratio(&pixels, 1), Some(2.0 / 3.0));
        assert_eq!(lsb_ratio(&pixels, 0), None);
    }

    #[test]
    fn test_balanced_png_is_likely() {
        let channels: Vec<u8> = (0..10 * 10 * 3).map(|i| (i % 2) as u8).collect();
        assert!(is_likely_steganographic(&png_with(channels, 10, 10)));
    }

    #[test]
    fn test_flat_png_is_not_likely() {
        let channels = vec![200u8; 10 * 10 * 3];
        assert!(!is_likely_steganographic(&png_with(channels, 10, 10)));
    }

    #[test]
    fn test_garbage_is_not_likely() {
        assert!(!is_likely_steganographic(b"not an image"));
    }

    #[test]
    fn test_validate_paths() {
        let dir = tempfile::tempdir().unwrap();
        let png_path = dir.path().join("a.png");
        std::fs::write(&png_path, png_with(vec![0; 12], 2, 2)).unwrap();
        let txt_path = dir.path().join("a.txt");
        std::fs::write(&txt_path, "hello").unwrap();

        assert!(validate_image_path(&png_path));
        assert!(!validate_image_path(&txt_path));
        assert!(!validate_image_path(&dir.path().join("missing.png")));

        assert!(validate_output_path(&dir.path().join("out.png")));
        assert!(!validate_output_path(&dir.path().join("nope/out.png")));
        assert_eq!(read_text_file(&txt_path).unwrap(), "hello");
    }
}
