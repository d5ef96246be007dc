//! Pixel-addressable images in the color models common file formats use.

use alloc::borrow::Cow;
use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use rgb::{AsPixels as _, ComponentBytes as _};

use crate::error::SlotError;
use crate::pixel::{ColorMode, Rgb, Rgba};

/// A decoded image in one of the supported color models.
///
/// Buffers built by the constructors here are exactly `width * height`
/// pixels. Variants built directly may carry a row stride: conversions read
/// through rows, and [`GenericImage::to_contiguous`] drops the padding.
/// Indexed pixels may reference entries past the end of their palette;
/// those resolve to black.
#[derive(Clone, Debug)]
pub enum GenericImage {
    /// One value per pixel: 0 is black, anything else is white.
    Mono(ImgVec<u8>),
    /// 8-bit luminance.
    Gray(ImgVec<u8>),
    /// 8-bit palette indices.
    Indexed { pixels: ImgVec<u8>, palette: Vec<Rgb> },
    Rgb(ImgVec<Rgb>),
    Rgba(ImgVec<Rgba>),
}

fn check_len(width: u32, height: u32, actual: usize, per_pixel: usize) -> Result<(), SlotError> {
    if width == 0 || height == 0 {
        return Err(SlotError::InvalidDimensions { width, height });
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(per_pixel))
        .ok_or(SlotError::DimensionsTooLarge { width, height })?;
    if actual != expected {
        return Err(SlotError::MalformedBuffer { expected, actual });
    }
    Ok(())
}

/// Copy out the visible pixels row by row, skipping stride padding.
fn collect_rows<T: Copy>(img: ImgRef<'_, T>) -> Vec<T> {
    let mut out = Vec::with_capacity(img.width() * img.height());
    for row in img.rows() {
        out.extend_from_slice(row);
    }
    out
}

fn is_packed<T>(img: &ImgVec<T>) -> bool {
    img.buf().len() == img.width() * img.height()
}

fn repack<T: Copy>(img: ImgVec<T>) -> ImgVec<T> {
    if is_packed(&img) {
        return img;
    }
    let (w, h) = (img.width(), img.height());
    ImgVec::new(collect_rows(img.as_ref()), w, h)
}

impl GenericImage {
    pub fn mono(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SlotError> {
        check_len(width, height, pixels.len(), 1)?;
        Ok(Self::Mono(ImgVec::new(pixels, width as usize, height as usize)))
    }

    pub fn gray(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, SlotError> {
        check_len(width, height, pixels.len(), 1)?;
        Ok(Self::Gray(ImgVec::new(pixels, width as usize, height as usize)))
    }

    pub fn indexed(
        width: u32,
        height: u32,
        pixels: Vec<u8>,
        palette: Vec<Rgb>,
    ) -> Result<Self, SlotError> {
        check_len(width, height, pixels.len(), 1)?;
        if palette.len() > 256 {
            return Err(SlotError::PaletteTooLarge {
                len: palette.len(),
                max: 256,
            });
        }
        Ok(Self::Indexed {
            pixels: ImgVec::new(pixels, width as usize, height as usize),
            palette,
        })
    }

    pub fn rgb(width: u32, height: u32, pixels: Vec<Rgb>) -> Result<Self, SlotError> {
        check_len(width, height, pixels.len(), 1)?;
        Ok(Self::Rgb(ImgVec::new(pixels, width as usize, height as usize)))
    }

    pub fn rgba(width: u32, height: u32, pixels: Vec<Rgba>) -> Result<Self, SlotError> {
        check_len(width, height, pixels.len(), 1)?;
        Ok(Self::Rgba(ImgVec::new(pixels, width as usize, height as usize)))
    }

    /// Build an image from raw interleaved bytes in the given mode.
    ///
    /// Mono and Gray take one byte per pixel, Rgb three, Rgba four.
    /// Indexed takes one byte per pixel plus a flat R, G, B palette.
    pub fn from_raw(
        mode: ColorMode,
        width: u32,
        height: u32,
        bytes: &[u8],
        palette: Option<&[u8]>,
    ) -> Result<Self, SlotError> {
        match mode {
            ColorMode::Mono => Self::mono(width, height, bytes.to_vec()),
            ColorMode::Gray => Self::gray(width, height, bytes.to_vec()),
            ColorMode::Indexed => {
                let flat = palette.unwrap_or(&[]);
                if flat.len() % 3 != 0 {
                    return Err(SlotError::InvalidData(alloc::format!(
                        "flat palette length {} is not a multiple of 3",
                        flat.len()
                    )));
                }
                let entries: &[Rgb] = flat.as_pixels();
                Self::indexed(width, height, bytes.to_vec(), entries.to_vec())
            }
            ColorMode::Rgb => {
                check_len(width, height, bytes.len(), 3)?;
                let px: &[Rgb] = bytes.as_pixels();
                Self::rgb(width, height, px.to_vec())
            }
            ColorMode::Rgba => {
                check_len(width, height, bytes.len(), 4)?;
                let px: &[Rgba] = bytes.as_pixels();
                Self::rgba(width, height, px.to_vec())
            }
        }
    }

    pub fn mode(&self) -> ColorMode {
        match self {
            Self::Mono(_) => ColorMode::Mono,
            Self::Gray(_) => ColorMode::Gray,
            Self::Indexed { .. } => ColorMode::Indexed,
            Self::Rgb(_) => ColorMode::Rgb,
            Self::Rgba(_) => ColorMode::Rgba,
        }
    }

    pub fn width(&self) -> u32 {
        let w = match self {
            Self::Mono(img) | Self::Gray(img) => img.width(),
            Self::Indexed { pixels, .. } => pixels.width(),
            Self::Rgb(img) => img.width(),
            Self::Rgba(img) => img.width(),
        };
        w as u32
    }

    pub fn height(&self) -> u32 {
        let h = match self {
            Self::Mono(img) | Self::Gray(img) => img.height(),
            Self::Indexed { pixels, .. } => pixels.height(),
            Self::Rgb(img) => img.height(),
            Self::Rgba(img) => img.height(),
        };
        h as u32
    }

    pub fn has_alpha(&self) -> bool {
        self.mode().has_alpha()
    }

    pub fn palette(&self) -> Option<&[Rgb]> {
        match self {
            Self::Indexed { palette, .. } => Some(palette),
            _ => None,
        }
    }

    /// Whether every buffer holds exactly `width * height` pixels.
    pub fn is_contiguous(&self) -> bool {
        match self {
            Self::Mono(img) | Self::Gray(img) => is_packed(img),
            Self::Indexed { pixels, .. } => is_packed(pixels),
            Self::Rgb(img) => is_packed(img),
            Self::Rgba(img) => is_packed(img),
        }
    }

    /// The same image with any row padding removed.
    pub fn into_contiguous(self) -> Self {
        match self {
            Self::Mono(img) => Self::Mono(repack(img)),
            Self::Gray(img) => Self::Gray(repack(img)),
            Self::Indexed { pixels, palette } => Self::Indexed {
                pixels: repack(pixels),
                palette,
            },
            Self::Rgb(img) => Self::Rgb(repack(img)),
            Self::Rgba(img) => Self::Rgba(repack(img)),
        }
    }

    /// Borrow as-is when already contiguous, otherwise copy without padding.
    pub fn to_contiguous(&self) -> Cow<'_, Self> {
        if self.is_contiguous() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.clone().into_contiguous())
        }
    }

    /// Raw interleaved pixel bytes, as accepted by [`GenericImage::from_raw`].
    pub fn raw_bytes(&self) -> Vec<u8> {
        match self {
            Self::Mono(img) | Self::Gray(img) => collect_rows(img.as_ref()),
            Self::Indexed { pixels, .. } => collect_rows(pixels.as_ref()),
            Self::Rgb(img) => collect_rows(img.as_ref()).as_bytes().to_vec(),
            Self::Rgba(img) => collect_rows(img.as_ref()).as_bytes().to_vec(),
        }
    }

    /// The palette flattened to R, G, B bytes.
    pub fn flat_palette(&self) -> Option<Vec<u8>> {
        self.palette().map(|p| p.as_bytes().to_vec())
    }

    /// Resolve every pixel to opaque RGB. Alpha, if any, is dropped.
    pub fn to_rgb(&self) -> ImgVec<Rgb> {
        let (w, h) = (self.width() as usize, self.height() as usize);
        let mut buf = Vec::with_capacity(w * h);
        match self {
            Self::Mono(img) => {
                for row in img.rows() {
                    buf.extend(row.iter().map(|&v| {
                        if v == 0 { Rgb::new(0, 0, 0) } else { Rgb::new(255, 255, 255) }
                    }));
                }
            }
            Self::Gray(img) => {
                for row in img.rows() {
                    buf.extend(row.iter().map(|&v| Rgb::new(v, v, v)));
                }
            }
            Self::Indexed { pixels, palette } => {
                for row in pixels.rows() {
                    buf.extend(
                        row.iter()
                            .map(|&i| palette.get(usize::from(i)).copied().unwrap_or_default()),
                    );
                }
            }
            Self::Rgb(img) => {
                for row in img.rows() {
                    buf.extend_from_slice(row);
                }
            }
            Self::Rgba(img) => {
                for row in img.rows() {
                    buf.extend(row.iter().map(|p| Rgb::new(p.r, p.g, p.b)));
                }
            }
        }
        ImgVec::new(buf, w, h)
    }

    /// Borrow the index plane of an indexed or mono image.
    pub(crate) fn index_plane(&self) -> Option<ImgRef<'_, u8>> {
        match self {
            Self::Mono(img) => Some(img.as_ref()),
            Self::Indexed { pixels, .. } => Some(pixels.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn rejects_wrong_buffer_length() {
        assert!(matches!(
            GenericImage::gray(2, 2, vec![0; 3]),
            Err(SlotError::MalformedBuffer {
                expected: 4,
                actual: 3
            })
        ));
        assert!(matches!(
            GenericImage::from_raw(ColorMode::Rgb, 2, 1, &[0; 5], None),
            Err(SlotError::MalformedBuffer {
                expected: 6,
                actual: 5
            })
        ));
        assert!(matches!(
            GenericImage::mono(0, 3, vec![]),
            Err(SlotError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn raw_bytes_roundtrip_through_from_raw() {
        let bytes = [10u8, 20, 30, 40, 50, 60];
        let img = GenericImage::from_raw(ColorMode::Rgb, 2, 1, &bytes, None).unwrap();
        assert_eq!(img.mode(), ColorMode::Rgb);
        assert_eq!(img.raw_bytes(), bytes);

        let img =
            GenericImage::from_raw(ColorMode::Indexed, 3, 1, &[0, 1, 1], Some(&[1, 2, 3, 4, 5, 6]))
                .unwrap();
        assert_eq!(img.palette().unwrap(), &[Rgb::new(1, 2, 3), Rgb::new(4, 5, 6)]);
        assert_eq!(img.flat_palette().unwrap(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn to_rgb_resolves_each_mode() {
        let mono = GenericImage::mono(2, 1, vec![0, 1]).unwrap();
        assert_eq!(mono.to_rgb().buf(), &[Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]);

        let indexed = GenericImage::indexed(2, 1, vec![0, 7], vec![Rgb::new(9, 8, 7)]).unwrap();
        assert_eq!(indexed.to_rgb().buf(), &[Rgb::new(9, 8, 7), Rgb::new(0, 0, 0)]);

        let rgba = GenericImage::rgba(1, 1, vec![Rgba::new(1, 2, 3, 0)]).unwrap();
        assert!(rgba.has_alpha());
        assert_eq!(rgba.to_rgb().buf(), &[Rgb::new(1, 2, 3)]);
    }

    #[test]
    fn strided_buffers_skip_padding() {
        let white = Rgb::new(255, 255, 255);
        let black = Rgb::new(0, 0, 0);
        // stride 3, third column of each row is padding
        let img = GenericImage::Rgb(ImgVec::new_stride(
            vec![white, white, white, black, black, white],
            2,
            2,
            3,
        ));
        assert!(!img.is_contiguous());
        assert_eq!(img.to_rgb().buf(), &[white, white, black, black]);
        assert_eq!(img.raw_bytes(), [[255u8; 6], [0; 6]].concat());

        let packed = img.into_contiguous();
        assert!(packed.is_contiguous());
        assert_eq!(packed.raw_bytes().len(), 12);
    }
}
