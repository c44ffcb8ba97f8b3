//! # LSB Steganography Codec
//!
//! Hides text in the least significant bit of every R, G and B sample of an image, optionally
//! behind a 4-digit authentication code.
//!
//! ## Encoding Process
//! 1. Validate the message (non-empty, single-byte characters)
//! 2. Wrap it in an `AUTH:<code>:` or `NOAUTH:` envelope
//! 3. Frame it: 8 bits per character, MSB first, then the terminator `1111111111111110`
//! 4. Check capacity (`width * height * 3` bits); nothing is written if it does not fit
//! 5. Write one frame bit into the LSB of each channel sample (R → G → B → next pixel)
//! 6. Save as PNG so the LSBs survive
//!
//! ## Decoding Process
//! 1. Read channel LSBs until the terminator shows up
//! 2. Regroup the bits into characters
//! 3. Unwrap the envelope; protected messages need the code
//!
//! ### Capacity
//! An image stores `(width * height * 3 - 16) / 8` characters including the envelope tag.
//! Example: an 800x600 image holds ~180 KB of text.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ColorType, ImageFormat, RgbImage};
use log::{debug, info};

use crate::error::{Result, StegoError};
use crate::processing::channels;
use crate::processing::envelope::{
    envelope_overhead, unwrap_envelope, wrap_envelope, wrap_legacy, AuthCode, AuthRequest,
    Unwrapped,
};
use crate::processing::framing::{frame, framed_len, unframe, validate_payload};

/// Suffix added to the input file stem when no output path is given.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_encoded";

/// A decoded image as a flat RGB channel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    /// `width * height * 3` samples, row-major, `R, G, B` interleaved.
    pub channels: Vec<u8>,
    /// Colour layout of the container before conversion to RGB.
    pub color_mode: ColorType,
}

impl PixelBuffer {
    /// Wraps an existing RGB channel buffer.
    ///
    /// # Errors
    /// - `InvalidPayload` if `channels` is not exactly `width * height * 3` long
    pub fn new(width: u32, height: u32, channels: Vec<u8>) -> Result<Self> {
        let expected = channels::capacity_bits(width, height);
        if channels.len() as u64 != expected {
            return Err(StegoError::InvalidPayload(format!(
                "pixel buffer holds {} samples, expected {} for {}x{}",
                channels.len(),
                expected,
                width,
                height
            )));
        }
        Ok(PixelBuffer {
            width,
            height,
            channels,
            color_mode: ColorType::Rgb8,
        })
    }

    /// Capacity of this image in bits.
    pub fn capacity_bits(&self) -> u64 {
        channels::capacity_bits(self.width, self.height)
    }
}

/// Result of a decode attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// Unprotected or legacy message.
    Plain(String),
    /// The message is protected; call again with the code.
    AuthRequired,
    /// Protected message, code verified.
    Authenticated(String),
}

impl DecodeResult {
    /// The revealed message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            DecodeResult::Plain(m) | DecodeResult::Authenticated(m) => Some(m),
            DecodeResult::AuthRequired => None,
        }
    }
}

/// What `encode_file` produced.
#[derive(Debug, Clone)]
pub struct EncodeOutcome {
    pub output_path: PathBuf,
    pub auth_code: Option<AuthCode>,
}

/// Whether `text` fits in a `width` x `height` image once wrapped and framed.
///
/// The bit length is `8 * (len(text) + envelope tag) + 16`.
pub fn can_fit(width: u32, height: u32, text: &str, has_auth: bool) -> bool {
    let chars = text.chars().count() + envelope_overhead(has_auth);
    channels::can_fit(width, height, framed_len(chars))
}

/// Hides `message` in `pixels`.
///
/// Returns the authentication code when `auth_requested` is set: `existing_code` if given,
/// otherwise a freshly generated one. The buffer is left untouched on any error.
///
/// # Errors
/// - `InvalidPayload` for an empty message or characters above U+00FF
/// - `CapacityExceeded` if the framed message does not fit
pub fn encode(
    pixels: &mut PixelBuffer,
    message: &str,
    auth_requested: bool,
    existing_code: Option<AuthCode>,
) -> Result<Option<AuthCode>> {
    validate_payload(message)?;

    let (wrapped, code) = wrap_envelope(
        message,
        AuthRequest::from_flags(auth_requested, existing_code),
    );
    write_frame(pixels, &wrapped)?;

    info!(
        "Encoded {} characters into {}x{} image (auth: {})",
        message.chars().count(),
        pixels.width,
        pixels.height,
        code.is_some()
    );
    Ok(code)
}

/// Hides `message` without any envelope tag.
///
/// Produces images readable by decoders that predate the `AUTH:`/`NOAUTH:` envelope. A
/// message that itself starts with one of those tags will be interpreted as tagged on decode.
///
/// # Errors
/// Same as [`encode`].
pub fn encode_legacy(pixels: &mut PixelBuffer, message: &str) -> Result<()> {
    validate_payload(message)?;
    write_frame(pixels, &wrap_legacy(message))?;
    info!(
        "Encoded {} untagged characters into {}x{} image",
        message.chars().count(),
        pixels.width,
        pixels.height
    );
    Ok(())
}

fn write_frame(pixels: &mut PixelBuffer, wrapped: &str) -> Result<()> {
    let bits = frame(wrapped)?;
    let required = bits.len() as u64;
    let capacity = pixels.capacity_bits();
    if !channels::can_fit(pixels.width, pixels.height, required) {
        return Err(StegoError::CapacityExceeded { required, capacity });
    }
    debug!("Frame is {} bits, capacity {} bits", required, capacity);

    channels::embed(&mut pixels.channels, pixels.width, pixels.height, &bits)
}

/// Recovers the message hidden in `pixels`.
///
/// Without `supplied_code`, a protected message yields [`DecodeResult::AuthRequired`].
///
/// # Errors
/// - `AuthenticationError` if the message is protected and the code does not match
pub fn decode(pixels: &PixelBuffer, supplied_code: Option<&str>) -> Result<DecodeResult> {
    let bits = channels::extract(&pixels.channels);
    let raw = unframe(&bits);
    debug!(
        "Extracted {} bits, {} characters",
        bits.len(),
        raw.chars().count()
    );

    let result = match unwrap_envelope(&raw, supplied_code)? {
        Unwrapped::Pending => DecodeResult::AuthRequired,
        Unwrapped::Revealed {
            message,
            authenticated: true,
        } => DecodeResult::Authenticated(message),
        Unwrapped::Revealed {
            message,
            authenticated: false,
        } => DecodeResult::Plain(message),
    };

    match &result {
        DecodeResult::AuthRequired => info!("Message is protected by an authentication code"),
        DecodeResult::Authenticated(_) => info!("Authentication code accepted"),
        DecodeResult::Plain(m) => debug!("Decoded {} characters", m.chars().count()),
    }
    Ok(result)
}

/// Loads an image from bytes (any format the `image` crate reads) as RGB.
///
/// # Errors
/// - `ContainerCodec` if the bytes are not a readable image
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer> {
    let img = image::load_from_memory(bytes)?;
    let color_mode = img.color();
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();

    Ok(PixelBuffer {
        width,
        height,
        channels: rgb.into_raw(),
        color_mode,
    })
}

/// Re-encodes the buffer as PNG. Lossy formats would destroy the hidden bits.
///
/// # Errors
/// - `ContainerCodec` if the buffer does not match its dimensions or PNG encoding fails
pub fn encode_image(pixels: &PixelBuffer) -> Result<Vec<u8>> {
    let img = RgbImage::from_raw(pixels.width, pixels.height, pixels.channels.clone())
        .ok_or_else(|| {
            StegoError::ContainerCodec(image::ImageError::Parameter(
                image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                ),
            ))
        })?;

    let mut output_bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut output_bytes), ImageFormat::Png)?;
    Ok(output_bytes)
}

/// `<dir>/<stem><suffix>.png` next to `input`, or in `directory` when given.
pub fn default_output_path(input: &Path, suffix: &str, directory: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let file_name = format!("{}{}.png", stem, suffix);

    match directory {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}

/// Reads `input`, hides `message` and writes a PNG to `output`.
///
/// Nothing is written if encoding fails. See
/// [`OutputConfig::resolve`](crate::common::config::OutputConfig::resolve) for picking `output`.
///
/// # Errors
/// - Everything [`encode`] returns, plus `Io` and `ContainerCodec` for file problems
pub fn encode_file(
    input: &Path,
    message: &str,
    output: &Path,
    auth: AuthRequest,
) -> Result<EncodeOutcome> {
    let bytes = std::fs::read(input)?;
    let mut pixels = decode_image(&bytes)?;
    debug!(
        "Loaded {} ({}x{}, {:?})",
        input.display(),
        pixels.width,
        pixels.height,
        pixels.color_mode
    );

    let auth_requested = auth.is_authenticated();
    let existing = match auth {
        AuthRequest::Use(code) => Some(code),
        _ => None,
    };
    let auth_code = encode(&mut pixels, message, auth_requested, existing)?;

    let output_path = output.to_path_buf();
    std::fs::write(&output_path, encode_image(&pixels)?)?;
    info!("Saved encoded image to {}", output_path.display());

    Ok(EncodeOutcome {
        output_path,
        auth_code,
    })
}

/// Reads an image file and decodes the hidden message.
///
/// # Errors
/// - Everything [`decode`] returns, plus `Io` and `ContainerCodec` for file problems
pub fn decode_file(path: &Path, supplied_code: Option<&str>) -> Result<DecodeResult> {
    let bytes = std::fs::read(path)?;
    let pixels = decode_image(&bytes)?;
    decode(&pixels, supplied_code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(width: u32, height: u32) -> PixelBuffer {
        let len = (width * height * 3) as usize;
        let channels = (0..len).map(|i| ((i * 53 + 7) % 256) as u8).collect();
        PixelBuffer::new(width, height, channels).unwrap()
    }

    #[test]
    fn test_hi_fits_in_4x4() {
        let mut pixels = buffer(4, 4);
        // "Hi" alone is 32 bits; the NOAUTH: tag needs 88 bits total, more than 48.
        assert!(channels::can_fit(4, 4, framed_len(2)));
        encode_legacy(&mut pixels, "Hi").unwrap();
        assert_eq!(
            decode(&pixels, None).unwrap(),
            DecodeResult::Plain("Hi".to_string())
        );
    }

    #[test]
    fn test_hi_does_not_fit_in_1x2() {
        let mut pixels = buffer(1, 2);
        let original = pixels.clone();
        let err = encode_legacy(&mut pixels, "Hi").unwrap_err();
        assert!(matches!(
            err,
            StegoError::CapacityExceeded {
                required: 32,
                capacity: 6
            }
        ));
        assert_eq!(pixels, original);
    }

    #[test]
    fn test_noauth_round_trip() {
        let mut pixels = buffer(8, 8);
        let code = encode(&mut pixels, "Hi", false, None).unwrap();
        assert!(code.is_none());
        assert_eq!(
            decode(&pixels, None).unwrap(),
            DecodeResult::Plain("Hi".to_string())
        );
        assert_eq!(
            decode(&pixels, Some("1234")).unwrap(),
            DecodeResult::Plain("Hi".to_string())
        );
    }

    #[test]
    fn test_secret_with_auth() {
        let mut pixels = buffer(8, 8);
        let code = AuthCode::parse("4821").unwrap();
        let returned = encode(&mut pixels, "Secret", true, Some(code)).unwrap();
        assert_eq!(returned.unwrap().as_str(), "4821");

        assert_eq!(
            decode(&pixels, Some("4821")).unwrap(),
            DecodeResult::Authenticated("Secret".to_string())
        );
        assert!(matches!(
            decode(&pixels, Some("0000")),
            Err(StegoError::AuthenticationError)
        ));
        assert_eq!(decode(&pixels, None).unwrap(), DecodeResult::AuthRequired);
    }

    #[test]
    fn test_generated_code_unlocks() {
        let mut pixels = buffer(10, 10);
        let code = encode(&mut pixels, "generated", true, None)
            .unwrap()
            .unwrap();
        assert_eq!(code.as_str().len(), 4);
        assert!(code.as_str().bytes().all(|b| b.is_ascii_digit()));
        assert_eq!(
            decode(&pixels, Some(code.as_str())).unwrap().message(),
            Some("generated")
        );
    }

    #[test]
    fn test_capacity_boundary_with_envelope() {
        // NOAUTH:abc -> 10 chars -> 96 bits = 32 pixels.
        assert!(can_fit(8, 4, "abc", false));
        assert!(!can_fit(8, 4, "abcd", false));

        let mut exact = buffer(8, 4);
        assert!(encode(&mut exact, "abc", false, None).is_ok());
        let mut short = buffer(8, 4);
        assert!(matches!(
            encode(&mut short, "abcd", false, None),
            Err(StegoError::CapacityExceeded {
                required: 104,
                capacity: 96
            })
        ));
    }

    #[test]
    fn test_can_fit_with_auth_overhead() {
        // AUTH:1234:x -> 11 chars -> 104 bits.
        assert!(can_fit(35, 1, "x", true));
        assert!(!can_fit(34, 1, "x", true));
    }

    #[test]
    fn test_encode_rejects_bad_payload() {
        let mut pixels = buffer(8, 8);
        let original = pixels.clone();
        assert!(matches!(
            encode(&mut pixels, "", false, None),
            Err(StegoError::InvalidPayload(_))
        ));
        assert!(matches!(
            encode(&mut pixels, "emoji 😀", false, None),
            Err(StegoError::InvalidPayload(_))
        ));
        assert_eq!(pixels, original);
    }

    #[test]
    fn test_png_round_trip() {
        let mut pixels = buffer(12, 9);
        encode(&mut pixels, "through png", false, None).unwrap();

        let png = encode_image(&pixels).unwrap();
        let reloaded = decode_image(&png).unwrap();
        assert_eq!(reloaded.channels, pixels.channels);
        assert_eq!(
            decode(&reloaded, None).unwrap(),
            DecodeResult::Plain("through png".to_string())
        );
    }

    #[test]
    fn test_pixel_buffer_rejects_wrong_length() {
        assert!(PixelBuffer::new(2, 2, vec![0; 11]).is_err());
    }

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(Path::new("/tmp/photo.jpg"), "_encoded", None);
        assert_eq!(path, PathBuf::from("/tmp/photo_encoded.png"));

        let path = default_output_path(
            Path::new("photo.png"),
            "_x",
            Some(Path::new("/out")),
        );
        assert_eq!(path, PathBuf::from("/out/photo_x.png"));
    }
}
