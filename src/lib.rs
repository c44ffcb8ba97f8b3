//! # stegano-lsb
//!
//! Hides short text messages in the least significant bits of RGB images, optionally
//! protected by a 4-digit authentication code.
//!
//! ```rust,ignore
//! use stegano_lsb::processing::{decode, decode_image, encode, encode_image, DecodeResult};
//!
//! let mut pixels = decode_image(&std::fs::read("cover.png")?)?;
//! let code = encode(&mut pixels, "meet at noon", true, None)?.unwrap();
//! std::fs::write("cover_encoded.png", encode_image(&pixels)?)?;
//!
//! assert_eq!(decode(&pixels, None)?, DecodeResult::AuthRequired);
//! assert!(matches!(decode(&pixels, Some(code.as_str()))?, DecodeResult::Authenticated(_)));
//! ```

pub mod common;
pub mod error;
pub mod processing;

pub use error::{Result, StegoError};
pub use processing::envelope::{AuthCode, AuthRequest, Envelope};
pub use processing::{DecodeResult, PixelBuffer};
