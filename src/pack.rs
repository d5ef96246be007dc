//! Sub-byte pixel packing.
//!
//! Pixels are laid out left to right, row after row, with no row padding.
//! Within a byte the leftmost pixel occupies the most-significant bits:
//!
//! ```text
//! byte = sum(v[i] << (bpp * (ppb - 1 - i)))    ppb = 8 / bpp
//! ```
//!
//! A trailing short group is packed with its missing slots as zero.

use alloc::vec::Vec;

use crate::error::SlotError;

/// Validate a packable depth and return it as a shift width.
fn packable_bits(bits_per_pixel: u8) -> Result<u32, SlotError> {
    match bits_per_pixel {
        1 | 2 | 4 | 8 => Ok(u32::from(bits_per_pixel)),
        other => Err(SlotError::UnsupportedDepth(u32::from(other))),
    }
}

/// Pack pixel values at `bits_per_pixel` (1, 2, 4 or 8).
///
/// Fails with [`SlotError::UnsupportedDepth`] when the depth does not divide
/// 8, and with [`SlotError::ValueOutOfRange`] when a value needs more bits
/// than the depth provides. Values are never truncated.
pub fn pack(values: &[u8], bits_per_pixel: u8) -> Result<Vec<u8>, SlotError> {
    let bits = packable_bits(bits_per_pixel)?;
    if bits == 8 {
        return Ok(values.to_vec());
    }
    let ppb = (8 / bits) as usize;
    let max = (1u32 << bits) - 1;

    let mut out = Vec::with_capacity(values.len().div_ceil(ppb));
    for group in values.chunks(ppb) {
        let mut byte = 0u32;
        for (i, &value) in group.iter().enumerate() {
            let value = u32::from(value);
            if value > max {
                return Err(SlotError::ValueOutOfRange {
                    value,
                    bits: bits_per_pixel,
                });
            }
            byte |= value << (bits * (ppb - 1 - i) as u32);
        }
        out.push(byte as u8);
    }
    Ok(out)
}

/// Unpack exactly `count` pixel values from a buffer packed at
/// `bits_per_pixel`.
///
/// Values recovered past `count` from the final byte are dropped, and bytes
/// beyond the last needed one are ignored.
pub fn unpack(buffer: &[u8], bits_per_pixel: u8, count: usize) -> Result<Vec<u8>, SlotError> {
    let bits = packable_bits(bits_per_pixel)?;
    let ppb = (8 / bits) as usize;
    let needed = count.div_ceil(ppb);
    if buffer.len() < needed {
        return Err(SlotError::BufferTooSmall {
            needed,
            actual: buffer.len(),
        });
    }
    if bits == 8 {
        return Ok(buffer[..count].to_vec());
    }

    let mask = ((1u32 << bits) - 1) as u8;
    let mut out = Vec::with_capacity(needed * ppb);
    for &byte in &buffer[..needed] {
        for slot in (0..ppb as u32).rev() {
            out.push((byte >> (slot * bits)) & mask);
        }
    }
    out.truncate(count);
    Ok(out)
}
