use alloc::vec::Vec;
use enough::Stop;

use crate::error::SlotError;
use crate::pixel::Rgba;

/// Parse farbfeld header, returning (width, height).
pub(crate) fn parse_header(data: &[u8]) -> Result<(u32, u32), SlotError> {
    if data.len() < 16 {
        return Err(SlotError::UnexpectedEof);
    }
    if &data[0..8] != b"farbfeld" {
        return Err(SlotError::UnrecognizedFormat);
    }
    let width = u32::from_be_bytes([data[8], data[9], data[10], data[11]]);
    let height = u32::from_be_bytes([data[12], data[13], data[14], data[15]]);

    if width == 0 {
        return Err(SlotError::InvalidHeader("farbfeld width is zero".into()));
    }
    if height == 0 {
        return Err(SlotError::InvalidHeader("farbfeld height is zero".into()));
    }
    Ok((width, height))
}

/// Decode big-endian RGBA16 samples, keeping the high byte of each.
pub(crate) fn decode_pixels(
    data: &[u8],
    width: u32,
    height: u32,
    stop: &dyn Stop,
) -> Result<Vec<Rgba>, SlotError> {
    let pixel_count = (width as usize)
        .checked_mul(height as usize)
        .ok_or(SlotError::DimensionsTooLarge { width, height })?;
    let input_bytes = pixel_count
        .checked_mul(8)
        .ok_or(SlotError::DimensionsTooLarge { width, height })?;

    let pixel_data = data
        .get(16..16 + input_bytes)
        .ok_or(SlotError::UnexpectedEof)?;

    let mut out = Vec::with_capacity(pixel_count);
    for (row_idx, row) in pixel_data.chunks_exact(width as usize * 8).enumerate() {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        // high byte of each big-endian sample
        out.extend(
            row.chunks_exact(8)
                .map(|px| Rgba::new(px[0], px[2], px[4], px[6])),
        );
    }
    Ok(out)
}
