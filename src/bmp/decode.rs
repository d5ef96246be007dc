//! BMP reader for device bitmaps.
//!
//! Handles uncompressed 1/2/4/8/24-bit files (returned packed, as the device
//! stores them) and 32-bit files (returned as RGBA). Bottom-up and top-down
//! row orders, OS/2 and Windows info headers.

use alloc::vec::Vec;

use enough::Stop;

use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::pack;
use crate::pixel::{BitDepth, Rgb, Rgba};
use crate::raster::RasterImage;

const BI_RGB: u32 = 0;
const BI_RLE8: u32 = 1;
const BI_RLE4: u32 = 2;
const BI_BITFIELDS: u32 = 3;
const BI_ALPHABITFIELDS: u32 = 6;

// ── Cursor for reading from &[u8] ───────────────────────────────────

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], SlotError> {
        let end = self.pos.checked_add(N).ok_or(SlotError::UnexpectedEof)?;
        let bytes = self.data.get(self.pos..end).ok_or(SlotError::UnexpectedEof)?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn u16(&mut self) -> Result<u16, SlotError> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    fn u32(&mut self) -> Result<u32, SlotError> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    fn i32(&mut self) -> Result<i32, SlotError> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    fn seek(&mut self, pos: usize) -> Result<(), SlotError> {
        if pos > self.data.len() {
            return Err(SlotError::UnexpectedEof);
        }
        self.pos = pos;
        Ok(())
    }
}

// ── Parsed BMP header info ──────────────────────────────────────────

pub(crate) struct BmpHeader {
    pub width: u32,
    pub height: u32,
    pub bpp: u16,
    top_down: bool,
    data_offset: usize,
    /// R, G, B, A masks; only meaningful for 32-bit files.
    masks: [u32; 4],
    pub palette: Vec<Rgb>,
}

impl BmpHeader {
    fn row_stride(&self) -> Result<usize, SlotError> {
        (self.width as usize)
            .checked_mul(usize::from(self.bpp))
            .map(|bits| bits.div_ceil(32) * 4)
            .ok_or(SlotError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            })
    }

    /// Pixel rows in top-down order.
    fn rows<'a>(&self, data: &'a [u8]) -> Result<Vec<&'a [u8]>, SlotError> {
        let stride = self.row_stride()?;
        let h = self.height as usize;
        let size = stride.checked_mul(h).ok_or(SlotError::DimensionsTooLarge {
            width: self.width,
            height: self.height,
        })?;
        let end = self.data_offset.checked_add(size).ok_or(SlotError::UnexpectedEof)?;
        let pixels = data.get(self.data_offset..end).ok_or(SlotError::UnexpectedEof)?;
        let mut rows: Vec<&[u8]> = pixels.chunks_exact(stride).collect();
        if !self.top_down {
            rows.reverse();
        }
        Ok(rows)
    }
}

/// Parse the file and info headers plus the color table.
pub(crate) fn parse_bmp_header(data: &[u8]) -> Result<BmpHeader, SlotError> {
    let mut cur = Cursor::new(data);
    if cur.take::<2>()? != *b"BM" {
        return Err(SlotError::UnrecognizedFormat);
    }
    let _file_size = cur.u32()?;
    let _reserved = cur.u32()?;
    let data_offset = cur.u32()? as usize;
    let ihsize = cur.u32()?;

    let (width, height, planes, bpp, compression, colors_used);
    match ihsize {
        12 => {
            // OS/2 BITMAPCOREHEADER: unsigned 16-bit dimensions, always bottom-up
            width = i32::from(cur.u16()?);
            height = i32::from(cur.u16()?);
            planes = cur.u16()?;
            bpp = cur.u16()?;
            compression = BI_RGB;
            colors_used = 0;
        }
        40 | 52 | 56 | 64 | 108 | 124 => {
            width = cur.i32()?;
            height = cur.i32()?;
            planes = cur.u16()?;
            bpp = cur.u16()?;
            compression = cur.u32()?;
            let _image_size = cur.u32()?;
            let _x_ppm = cur.u32()?;
            let _y_ppm = cur.u32()?;
            colors_used = cur.u32()?;
            let _important = cur.u32()?;
        }
        other => {
            return Err(SlotError::InvalidHeader(alloc::format!(
                "unknown BMP info header size: {other}"
            )));
        }
    }

    if planes != 1 {
        return Err(SlotError::InvalidHeader(alloc::format!(
            "BMP planes field is {planes}, expected 1"
        )));
    }
    if width <= 0 || height == 0 || height == i32::MIN {
        return Err(SlotError::InvalidHeader(alloc::format!(
            "invalid BMP dimensions {width}x{height}"
        )));
    }

    match compression {
        BI_RGB => {}
        BI_BITFIELDS | BI_ALPHABITFIELDS if bpp == 32 => {}
        BI_RLE8 | BI_RLE4 => {
            return Err(SlotError::UnsupportedVariant(
                "RLE-compressed BMP".into(),
            ));
        }
        other => {
            return Err(SlotError::UnsupportedVariant(alloc::format!(
                "BMP compression {other} at {bpp} bpp"
            )));
        }
    }
    if !matches!(bpp, 1 | 2 | 4 | 8 | 24 | 32) {
        return Err(SlotError::UnsupportedVariant(alloc::format!(
            "BMP bit depth {bpp} unsupported"
        )));
    }

    // BI_RGB 32-bit files are B, G, R, A; bitfield files carry their own masks.
    let mut masks = [0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000];
    if compression != BI_RGB {
        cur.seek(14 + 40)?;
        masks[0] = cur.u32()?;
        masks[1] = cur.u32()?;
        masks[2] = cur.u32()?;
        masks[3] = if ihsize >= 56 || compression == BI_ALPHABITFIELDS {
            cur.u32()?
        } else {
            0
        };
    }

    let mut palette = Vec::new();
    if bpp <= 8 {
        let max = 1usize << bpp;
        let count = if colors_used == 0 { max } else { colors_used as usize };
        if count > max {
            return Err(SlotError::PaletteTooLarge { len: count, max });
        }
        let mut table_start = 14 + ihsize as usize;
        if ihsize == 40 && compression == BI_BITFIELDS {
            table_start += 12;
        }
        cur.seek(table_start)?;
        palette.reserve(count);
        for _ in 0..count {
            let entry = if ihsize == 12 {
                let [b, g, r] = cur.take::<3>()?;
                Rgb::new(r, g, b)
            } else {
                let [b, g, r, _] = cur.take::<4>()?;
                Rgb::new(r, g, b)
            };
            palette.push(entry);
        }
    }

    Ok(BmpHeader {
        width: width as u32,
        height: height.unsigned_abs(),
        bpp,
        top_down: height < 0,
        data_offset,
        masks,
        palette,
    })
}

/// Decode a 1/2/4/8/24-bit BMP to a packed raster with no row padding.
pub(crate) fn decode_raster(
    header: BmpHeader,
    data: &[u8],
    stop: &dyn Stop,
) -> Result<RasterImage, SlotError> {
    let depth = BitDepth::from_bits(u32::from(header.bpp))?;
    let w = header.width as usize;
    let rows = header.rows(data)?;
    let mut values = Vec::with_capacity(
        w * rows.len() * if depth.is_indexed() { 1 } else { 3 },
    );
    for (y, row) in rows.iter().enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        match depth {
            BitDepth::TwentyFour => {
                for bgr in row[..w * 3].chunks_exact(3) {
                    values.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
                }
            }
            indexed => values.extend(pack::unpack(row, indexed.bits(), w)?),
        }
    }
    let palette = depth.is_indexed().then_some(header.palette);
    RasterImage::from_values(header.width, header.height, depth, &values, palette)
}

#[derive(Clone, Copy)]
struct Channel {
    shift: u32,
    present: bool,
}

impl Channel {
    /// Only full 8-bit channels on byte boundaries are supported.
    fn from_mask(mask: u32) -> Result<Self, SlotError> {
        if mask == 0 {
            return Ok(Self {
                shift: 0,
                present: false,
            });
        }
        let shift = mask.trailing_zeros();
        if mask >> shift != 0xFF || shift % 8 != 0 {
            return Err(SlotError::UnsupportedVariant(alloc::format!(
                "BMP bitfield mask {mask:#010x}"
            )));
        }
        Ok(Self {
            shift,
            present: true,
        })
    }

    #[inline]
    fn extract(self, v: u32, missing: u8) -> u8 {
        if self.present {
            (v >> self.shift) as u8
        } else {
            missing
        }
    }
}

/// Decode a 32-bit BMP to RGBA.
///
/// Files whose alpha channel is zero everywhere are treated as opaque,
/// since most writers leave the fourth byte unused.
pub(crate) fn decode_rgba(
    header: BmpHeader,
    data: &[u8],
    stop: &dyn Stop,
) -> Result<GenericImage, SlotError> {
    if header.bpp != 32 {
        return Err(SlotError::UnsupportedVariant(alloc::format!(
            "expected 32-bit BMP, got {} bpp",
            header.bpp
        )));
    }
    let [r, g, b, a] = header.masks.map(Channel::from_mask);
    let (r, g, b, a) = (r?, g?, b?, a?);
    let w = header.width as usize;
    let rows = header.rows(data)?;
    let mut pixels = Vec::with_capacity(w * rows.len());
    for (y, row) in rows.iter().enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        for px in row[..w * 4].chunks_exact(4) {
            let v = u32::from_le_bytes([px[0], px[1], px[2], px[3]]);
            pixels.push(Rgba::new(
                r.extract(v, 0),
                g.extract(v, 0),
                b.extract(v, 0),
                a.extract(v, 255),
            ));
        }
    }
    if a.present && pixels.iter().all(|p| p.a == 0) {
        pixels.iter_mut().for_each(|p| p.a = 255);
    }
    GenericImage::rgba(header.width, header.height, pixels)
}
