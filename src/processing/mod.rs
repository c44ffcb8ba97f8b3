//! # Image Processing and Steganography
//!
//! Text hiding in image LSBs, split by layer:
//!
//! - [`framing`]: payload ⇄ terminator-delimited bit frame
//! - [`envelope`]: `AUTH:` / `NOAUTH:` / bare message tagging
//! - [`channels`]: LSB writes and reads over a flat channel buffer
//! - [`steganography`]: the encode/decode entry points and PNG container handling
//! - [`analysis`]: capacity estimates and pre-flight checks

pub mod analysis;
pub mod channels;
pub mod envelope;
pub mod framing;
pub mod steganography;

// Re-export main functions for convenience
pub use steganography::{
    can_fit, decode, decode_file, decode_image, encode, encode_file, encode_image,
    encode_legacy, DecodeResult, EncodeOutcome, PixelBuffer,
};
