use crate::error::SlotError;

/// Palette entry and true-color pixel, channel order R, G, B.
pub type Rgb = rgb::RGB8;

/// True-color pixel with straight (non-premultiplied) alpha.
pub type Rgba = rgb::RGBA8;

/// Source container detected from magic bytes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    /// Windows bitmap, the on-device file layout.
    Bmp,
    /// PNM family: PBM (P4), PGM (P5), PPM (P6), PAM (P7).
    Pnm,
    /// Farbfeld (RGBA 16-bit).
    Farbfeld,
}

impl SourceFormat {
    /// Guess the format from the leading bytes. `None` if nothing matches.
    pub fn detect(data: &[u8]) -> Option<Self> {
        match data {
            [b'B', b'M', ..] => Some(Self::Bmp),
            [b'P', b'4' | b'5' | b'6' | b'7', ..] => Some(Self::Pnm),
            _ if data.starts_with(b"farbfeld") => Some(Self::Farbfeld),
            _ => None,
        }
    }
}

/// Bits per pixel a device slot can hold.
///
/// Depths up to 8 are palette indices packed most-significant-first;
/// 24 is three bytes of R, G, B per pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BitDepth {
    One,
    Two,
    Four,
    Eight,
    TwentyFour,
}

impl BitDepth {
    /// Map a raw bits-per-pixel count to a depth.
    pub fn from_bits(bits: u32) -> Result<Self, SlotError> {
        match bits {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            24 => Ok(Self::TwentyFour),
            other => Err(SlotError::UnsupportedDepth(other)),
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
            Self::TwentyFour => 24,
        }
    }

    /// Whether pixels are palette indices.
    pub const fn is_indexed(self) -> bool {
        !matches!(self, Self::TwentyFour)
    }

    /// Number of palette entries addressable at this depth; 0 for 24 bpp.
    pub const fn max_colors(self) -> usize {
        if self.is_indexed() {
            1 << self.bits()
        } else {
            0
        }
    }

    /// Length of a packed pixel buffer holding `width * height` pixels.
    pub fn buffer_len(self, width: u32, height: u32) -> Option<usize> {
        let count = (width as usize).checked_mul(height as usize)?;
        match self {
            Self::TwentyFour => count.checked_mul(3),
            _ => Some(count.div_ceil(8 / self.bits() as usize)),
        }
    }
}

impl core::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} bpp", self.bits())
    }
}

/// Color model of a [`GenericImage`](crate::GenericImage).
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    /// One value per pixel, 0 = black, 1 = white.
    Mono,
    /// 8-bit luminance.
    Gray,
    /// 8-bit palette indices.
    Indexed,
    /// 8-bit R, G, B.
    Rgb,
    /// 8-bit R, G, B, A.
    Rgba,
}

impl ColorMode {
    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::Rgba)
    }
}

/// Squared Euclidean distance between two colors.
#[inline]
pub(crate) fn distance_sq(a: Rgb, b: Rgb) -> u32 {
    let dr = i32::from(a.r) - i32::from(b.r);
    let dg = i32::from(a.g) - i32::from(b.g);
    let db = i32::from(a.b) - i32::from(b.b);
    (dr * dr + dg * dg + db * db) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_from_bits() {
        assert_eq!(BitDepth::from_bits(4).unwrap(), BitDepth::Four);
        assert!(matches!(
            BitDepth::from_bits(3),
            Err(SlotError::UnsupportedDepth(3))
        ));
        assert!(matches!(
            BitDepth::from_bits(32),
            Err(SlotError::UnsupportedDepth(32))
        ));
    }

    #[test]
    fn buffer_len_rounds_up() {
        assert_eq!(BitDepth::One.buffer_len(10, 10), Some(13));
        assert_eq!(BitDepth::Two.buffer_len(3, 1), Some(1));
        assert_eq!(BitDepth::Four.buffer_len(3, 3), Some(5));
        assert_eq!(BitDepth::Eight.buffer_len(3, 3), Some(9));
        assert_eq!(BitDepth::TwentyFour.buffer_len(2, 2), Some(12));
    }

    #[test]
    fn detect_formats() {
        assert_eq!(SourceFormat::detect(b"BM\0\0"), Some(SourceFormat::Bmp));
        assert_eq!(SourceFormat::detect(b"P6\n1 1\n255\n"), Some(SourceFormat::Pnm));
        assert_eq!(SourceFormat::detect(b"farbfeld"), Some(SourceFormat::Farbfeld));
        assert_eq!(SourceFormat::detect(b"\x89PNG"), None);
    }
}
