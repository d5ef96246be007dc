//! The canonical packed bitmap exchanged with device slots.

use alloc::vec::Vec;

use crate::error::SlotError;
use crate::pack;
use crate::pixel::{BitDepth, Rgb};

/// A packed device bitmap.
///
/// For depths up to 8 the buffer holds palette indices packed
/// most-significant-first with no row padding, `ceil(w * h / ppb)` bytes.
/// For 24 bpp it holds `w * h * 3` bytes of R, G, B. Only indexed depths
/// carry a palette.
///
/// Two rasters are equal when dimensions, depth, pixel bytes and palette
/// all match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    depth: BitDepth,
    pixels: Vec<u8>,
    palette: Option<Vec<Rgb>>,
}

impl RasterImage {
    /// Build a raster from an already packed pixel buffer.
    ///
    /// `bits_per_pixel` must be one of 1, 2, 4, 8 or 24. The buffer must be
    /// exactly the packed length for the dimensions, and a palette may not
    /// exceed `2^bits_per_pixel` entries.
    pub fn from_packed(
        width: u32,
        height: u32,
        bits_per_pixel: u32,
        pixels: Vec<u8>,
        palette: Option<Vec<Rgb>>,
    ) -> Result<Self, SlotError> {
        let depth = BitDepth::from_bits(bits_per_pixel)?;
        Self::new(width, height, depth, pixels, palette)
    }

    /// Build a raster from unpacked pixel values (palette indices for
    /// indexed depths, R, G, B bytes for 24 bpp).
    pub fn from_values(
        width: u32,
        height: u32,
        depth: BitDepth,
        values: &[u8],
        palette: Option<Vec<Rgb>>,
    ) -> Result<Self, SlotError> {
        let pixels = match depth {
            BitDepth::TwentyFour => values.to_vec(),
            indexed => pack::pack(values, indexed.bits())?,
        };
        Self::new(width, height, depth, pixels, palette)
    }

    pub(crate) fn new(
        width: u32,
        height: u32,
        depth: BitDepth,
        pixels: Vec<u8>,
        palette: Option<Vec<Rgb>>,
    ) -> Result<Self, SlotError> {
        if width == 0 || height == 0 {
            return Err(SlotError::InvalidDimensions { width, height });
        }
        let expected = depth
            .buffer_len(width, height)
            .ok_or(SlotError::DimensionsTooLarge { width, height })?;
        if pixels.len() != expected {
            return Err(SlotError::MalformedBuffer {
                expected,
                actual: pixels.len(),
            });
        }
        match (&palette, depth) {
            (Some(p), BitDepth::TwentyFour) => {
                return Err(SlotError::PaletteTooLarge {
                    len: p.len(),
                    max: 0,
                });
            }
            (Some(p), indexed) if p.len() > indexed.max_colors() => {
                return Err(SlotError::PaletteTooLarge {
                    len: p.len(),
                    max: indexed.max_colors(),
                });
            }
            _ => {}
        }
        Ok(Self {
            width,
            height,
            depth,
            pixels,
            palette,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn depth(&self) -> BitDepth {
        self.depth
    }

    pub fn bits_per_pixel(&self) -> u8 {
        self.depth.bits()
    }

    /// The packed pixel buffer.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn palette(&self) -> Option<&[Rgb]> {
        self.palette.as_deref()
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Unpacked pixel values in raster order.
    ///
    /// Indexed depths yield one palette index per pixel. 24 bpp yields the
    /// flat R, G, B bytes, three per pixel.
    pub fn pixel_values(&self) -> Result<Vec<u8>, SlotError> {
        match self.depth {
            BitDepth::TwentyFour => Ok(self.pixels.clone()),
            indexed => pack::unpack(&self.pixels, indexed.bits(), self.pixel_count()),
        }
    }

    /// Whether this raster can go to a slot as-is: same depth and
    /// dimensions, and for indexed depths the first `colors_used` palette
    /// entries match.
    pub fn fits(
        &self,
        depth: BitDepth,
        width: u32,
        height: u32,
        palette: &[Rgb],
        colors_used: usize,
    ) -> bool {
        if self.depth != depth || self.width != width || self.height != height {
            return false;
        }
        if !depth.is_indexed() {
            return true;
        }
        let ours = self.palette.as_deref().unwrap_or(&[]);
        let k = colors_used.min(palette.len());
        ours.len() >= k && ours[..k] == palette[..k]
    }

    pub fn into_parts(self) -> (Vec<u8>, Option<Vec<Rgb>>) {
        (self.pixels, self.palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn bw() -> Vec<Rgb> {
        vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]
    }

    #[test]
    fn validates_buffer_length() {
        assert!(RasterImage::from_packed(10, 10, 1, vec![0; 13], Some(bw())).is_ok());
        assert!(matches!(
            RasterImage::from_packed(10, 10, 1, vec![0; 12], Some(bw())),
            Err(SlotError::MalformedBuffer {
                expected: 13,
                actual: 12
            })
        ));
        assert!(matches!(
            RasterImage::from_packed(2, 2, 24, vec![0; 11], None),
            Err(SlotError::MalformedBuffer {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn validates_palette_size() {
        let palette = vec![Rgb::new(1, 2, 3); 3];
        assert!(matches!(
            RasterImage::from_packed(4, 1, 1, vec![0], Some(palette.clone())),
            Err(SlotError::PaletteTooLarge { len: 3, max: 2 })
        ));
        assert!(RasterImage::from_packed(4, 1, 2, vec![0], Some(palette)).is_ok());
    }

    #[test]
    fn rejects_unsupported_depth() {
        assert!(matches!(
            RasterImage::from_packed(1, 1, 16, vec![0, 0], None),
            Err(SlotError::UnsupportedDepth(16))
        ));
    }

    #[test]
    fn pixel_values_stop_at_pixel_count() {
        let raster = RasterImage::from_values(3, 1, BitDepth::Two, &[1, 0, 2], Some(bw())).unwrap();
        assert_eq!(raster.pixels(), &[0b01_00_10_00]);
        assert_eq!(raster.pixel_values().unwrap(), vec![1, 0, 2]);
    }

    #[test]
    fn fits_compares_palette_prefix() {
        let mut palette = bw();
        palette.push(Rgb::new(255, 0, 255));
        let raster = RasterImage::from_values(2, 1, BitDepth::Two, &[0, 1], Some(palette)).unwrap();
        let slot_palette = [Rgb::new(0, 0, 0), Rgb::new(255, 255, 255), Rgb::new(9, 9, 9)];
        assert!(raster.fits(BitDepth::Two, 2, 1, &slot_palette, 2));
        assert!(!raster.fits(BitDepth::Two, 2, 1, &slot_palette, 3));
        assert!(!raster.fits(BitDepth::Four, 2, 1, &slot_palette, 2));
        assert!(!raster.fits(BitDepth::Two, 1, 2, &slot_palette, 2));
    }
}
