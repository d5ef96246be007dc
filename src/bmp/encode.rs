//! BMP writer: uncompressed 1/2/4/8-bit with a color table, 24-bit and
//! 32-bit.

use alloc::vec::Vec;

use enough::Stop;

use crate::error::SlotError;
use crate::pack;
use crate::pixel::{BitDepth, Rgb, Rgba};
use crate::raster::RasterImage;

const FILE_HEADER_LEN: usize = 14;
const INFO_HEADER_LEN: usize = 40;

/// `2^bits` evenly spaced grays, the table written when a raster has no
/// palette of its own.
pub(crate) fn gray_ramp(depth: BitDepth) -> Vec<Rgb> {
    let n = depth.max_colors();
    let step = 255 / (n - 1);
    (0..n)
        .map(|i| {
            let v = (i * step) as u8;
            Rgb::new(v, v, v)
        })
        .collect()
}

/// Padded BMP row length for `width` pixels at `bpp`.
fn row_stride(width: u32, height: u32, bpp: usize) -> Result<usize, SlotError> {
    (width as usize)
        .checked_mul(bpp)
        .map(|bits| bits.div_ceil(32) * 4)
        .ok_or(SlotError::DimensionsTooLarge { width, height })
}

/// Encode a packed raster as a bottom-up BMP at the raster's own depth.
pub(crate) fn encode_raster(raster: &RasterImage, stop: &dyn Stop) -> Result<Vec<u8>, SlotError> {
    let (width, height) = (raster.width(), raster.height());
    let depth = raster.depth();
    let w = width as usize;
    let h = height as usize;
    let stride = row_stride(width, height, usize::from(depth.bits()))?;

    let palette = match (depth, raster.palette()) {
        (BitDepth::TwentyFour, _) => Vec::new(),
        (_, Some(p)) if !p.is_empty() => p.to_vec(),
        (indexed, _) => gray_ramp(indexed),
    };

    let pixel_data_size = stride
        .checked_mul(h)
        .ok_or(SlotError::DimensionsTooLarge { width, height })?;
    let mut out = begin_file(width, height, depth.bits().into(), &palette, pixel_data_size)?;

    stop.check()?;

    match depth {
        BitDepth::TwentyFour => {
            let row_bytes = w * 3;
            let pad = stride - row_bytes;
            for y in (0..h).rev() {
                if y % 16 == 0 {
                    stop.check()?;
                }
                let row = &raster.pixels()[y * row_bytes..(y + 1) * row_bytes];
                for rgb in row.chunks_exact(3) {
                    out.extend_from_slice(&[rgb[2], rgb[1], rgb[0]]);
                }
                out.extend(core::iter::repeat_n(0u8, pad));
            }
        }
        indexed => {
            // raster rows are not byte aligned; pack each row on its own
            let values = raster.pixel_values()?;
            for y in (0..h).rev() {
                if y % 16 == 0 {
                    stop.check()?;
                }
                let row = pack::pack(&values[y * w..(y + 1) * w], indexed.bits())?;
                let pad = stride - row.len();
                out.extend_from_slice(&row);
                out.extend(core::iter::repeat_n(0u8, pad));
            }
        }
    }
    Ok(out)
}

/// Encode RGBA pixels as a bottom-up 32-bit BMP (B, G, R, A).
pub(crate) fn encode_rgba(
    pixels: &[Rgba],
    width: u32,
    height: u32,
    stop: &dyn Stop,
) -> Result<Vec<u8>, SlotError> {
    let w = width as usize;
    let h = height as usize;
    let expected = w
        .checked_mul(h)
        .ok_or(SlotError::DimensionsTooLarge { width, height })?;
    if pixels.len() < expected {
        return Err(SlotError::BufferTooSmall {
            needed: expected,
            actual: pixels.len(),
        });
    }
    let pixel_data_size = expected
        .checked_mul(4)
        .ok_or(SlotError::DimensionsTooLarge { width, height })?;
    let mut out = begin_file(width, height, 32, &[], pixel_data_size)?;

    stop.check()?;

    for y in (0..h).rev() {
        if y % 16 == 0 {
            stop.check()?;
        }
        for px in &pixels[y * w..(y + 1) * w] {
            out.extend_from_slice(&[px.b, px.g, px.r, px.a]);
        }
    }
    Ok(out)
}

/// Write the file header, info header and color table.
fn begin_file(
    width: u32,
    height: u32,
    bpp: u16,
    palette: &[Rgb],
    pixel_data_size: usize,
) -> Result<Vec<u8>, SlotError> {
    let too_large = SlotError::DimensionsTooLarge { width, height };
    let data_offset = FILE_HEADER_LEN + INFO_HEADER_LEN + palette.len() * 4;
    let file_size = data_offset
        .checked_add(pixel_data_size)
        .filter(|&n| u32::try_from(n).is_ok())
        .ok_or(too_large)?;
    let signed_width = i32::try_from(width).map_err(|_| SlotError::DimensionsTooLarge { width, height })?;
    let signed_height = i32::try_from(height).map_err(|_| SlotError::DimensionsTooLarge { width, height })?;

    let mut out = Vec::with_capacity(file_size);

    // File header (14 bytes)
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // reserved
    out.extend_from_slice(&(data_offset as u32).to_le_bytes());

    // BITMAPINFOHEADER (40 bytes)
    out.extend_from_slice(&(INFO_HEADER_LEN as u32).to_le_bytes());
    out.extend_from_slice(&signed_width.to_le_bytes());
    out.extend_from_slice(&signed_height.to_le_bytes()); // positive = bottom-up
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&bpp.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    out.extend_from_slice(&2835u32.to_le_bytes()); // h resolution (72 DPI)
    out.extend_from_slice(&2835u32.to_le_bytes()); // v resolution
    out.extend_from_slice(&(palette.len() as u32).to_le_bytes()); // colors used
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors

    for c in palette {
        out.extend_from_slice(&[c.b, c.g, c.r, 0]);
    }
    Ok(out)
}
