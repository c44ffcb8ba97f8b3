//! # Pixel Channel Mutator
//!
//! Reads and writes one bit per channel sample of a flat RGB buffer
//! (`R, G, B, R, G, B, ...`, row-major).
//!
//! Writes are minimal-perturbation: a sample is nudged by exactly one toward the wanted
//! parity, or left alone when its LSB already matches. No sample ever moves by more than 1.

use log::debug;

use crate::error::{Result, StegoError};
use crate::processing::framing::{terminator_bits, TERMINATOR_BITS};

/// Usable channels per pixel (R, G, B).
pub const CHANNELS_PER_PIXEL: u64 = 3;

/// Number of bits a `width` x `height` image can carry.
pub fn capacity_bits(width: u32, height: u32) -> u64 {
    u64::from(width) * u64::from(height) * CHANNELS_PER_PIXEL
}

/// Whether a frame of `bit_length` bits fits in a `width` x `height` image.
pub fn can_fit(width: u32, height: u32, bit_length: u64) -> bool {
    capacity_bits(width, height) >= bit_length
}

/// Writes `bits` into the LSBs of the first `bits.len()` samples of `buffer`.
///
/// Samples past the end of the frame are untouched. Nothing is written if the frame does not
/// fit.
///
/// # Errors
/// - `CapacityExceeded` if the frame is longer than the capacity of the declared dimensions or
///   than the buffer itself
pub fn embed(buffer: &mut [u8], width: u32, height: u32, bits: &[bool]) -> Result<()> {
    let required = bits.len() as u64;
    let capacity = capacity_bits(width, height).min(buffer.len() as u64);
    if required > capacity {
        return Err(StegoError::CapacityExceeded { required, capacity });
    }

    let mut changed = 0usize;
    for (sample, &bit) in buffer.iter_mut().zip(bits) {
        let odd = *sample & 1 == 1;
        if bit && !odd {
            *sample += 1;
            changed += 1;
        } else if !bit && odd {
            *sample -= 1;
            changed += 1;
        }
    }

    debug!(
        "Embedded {} bits ({} samples changed, {} bits capacity)",
        required, changed, capacity
    );
    Ok(())
}

/// Reads sample LSBs in order, stopping right after the first terminator.
///
/// The terminator stays at the end of the returned bits. If no terminator is seen the whole
/// buffer is read.
pub fn extract(buffer: &[u8]) -> Vec<bool> {
    let marker = terminator_bits();
    let mut bits = Vec::new();

    for &sample in buffer {
        bits.push(sample & 1 == 1);
        if bits.len() >= TERMINATOR_BITS && bits[bits.len() - TERMINATOR_BITS..] == marker {
            debug!("Terminator found after {} bits", bits.len());
            return bits;
        }
    }

    debug!("No terminator found, read all {} bits", bits.len());
    bits
}
