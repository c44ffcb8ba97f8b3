//! # Bit Framing
//!
//! Converts a single-byte-per-character payload into a self-delimited bit frame and back.
//!
//! ## Frame Layout
//!
//! ```text
//! [char 0: 8 bits MSB first][char 1: 8 bits] ... [terminator: 1111111111111110]
//! ```
//!
//! The frame carries no length prefix. A reader stops at the first occurrence of the 16-bit
//! terminator, at any bit offset. A payload whose own bits happen to contain the terminator
//! pattern (for example the characters `'\u{ff}'` followed by `'\u{fe}'`) is therefore
//! truncated on decode. Images encoded by earlier versions rely on this layout, so it is kept
//! as is.

use crate::error::{Result, StegoError};

/// The 16-bit end-of-message marker, `1111111111111110`.
pub const TERMINATOR: u16 = 0xFFFE;

/// Number of bits in [`TERMINATOR`].
pub const TERMINATOR_BITS: usize = 16;

/// Number of frame bits spent on every payload character.
pub const BITS_PER_CHAR: usize = 8;

/// The terminator as a bit sequence, most-significant bit first.
pub fn terminator_bits() -> [bool; TERMINATOR_BITS] {
    let mut bits = [false; TERMINATOR_BITS];
    for (i, bit) in bits.iter_mut().enumerate() {
        *bit = (TERMINATOR >> (TERMINATOR_BITS - 1 - i)) & 1 == 1;
    }
    bits
}

/// Number of bits `frame` produces for a payload of `char_count` characters.
pub fn framed_len(char_count: usize) -> u64 {
    (char_count as u64) * BITS_PER_CHAR as u64 + TERMINATOR_BITS as u64
}

/// Checks that a message can be handed to the framer.
///
/// Rejects empty messages and any character whose code point does not fit in one byte.
pub fn validate_payload(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(StegoError::InvalidPayload(
            "no text provided for encoding".to_string(),
        ));
    }
    check_single_byte(text)
}

fn check_single_byte(text: &str) -> Result<()> {
    match text.chars().find(|c| u32::from(*c) > 0xFF) {
        Some(c) => Err(StegoError::InvalidPayload(format!(
            "character {:?} (U+{:04X}) is outside the single-byte range",
            c,
            u32::from(c)
        ))),
        None => Ok(()),
    }
}

/// Converts text into its bit frame: 8 bits per character followed by the terminator.
///
/// The terminator is appended even when `text` is empty, so the output always holds exactly
/// `8 * chars + 16` bits.
///
/// # Errors
/// - `InvalidPayload` if a character has a code point above 255
pub fn frame(text: &str) -> Result<Vec<bool>> {
    check_single_byte(text)?;

    let mut bits = Vec::with_capacity(framed_len(text.chars().count()) as usize);
    for c in text.chars() {
        let byte = u32::from(c) as u8;
        for shift in (0..BITS_PER_CHAR).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    bits.extend_from_slice(&terminator_bits());
    Ok(bits)
}

/// Recovers text from a bit sequence.
///
/// Everything from the first terminator onwards is discarded. Without a terminator the whole
/// input is treated as payload. A trailing group of fewer than 8 bits is dropped.
pub fn unframe(bits: &[bool]) -> String {
    let payload = match find_terminator(bits) {
        Some(index) => &bits[..index],
        None => bits,
    };

    payload
        .chunks_exact(BITS_PER_CHAR)
        .map(|chunk| {
            let byte = chunk
                .iter()
                .fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit));
            char::from(byte)
        })
        .collect()
}

/// Index of the first bit of the first terminator occurrence, if any.
fn find_terminator(bits: &[bool]) -> Option<usize> {
    let marker = terminator_bits();
    bits.windows(TERMINATOR_BITS)
        .position(|window| *window == marker)
}
