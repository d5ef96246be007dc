//! Conversion between packed [`RasterImage`]s and [`GenericImage`]s.

use alloc::vec::Vec;

use rgb::{AsPixels as _, ComponentBytes as _};

use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::pack;
use crate::pixel::{BitDepth, Rgb};
use crate::raster::RasterImage;

/// Expand a raster into a generic image.
///
/// 1 bpp becomes [`GenericImage::Mono`]. 2 and 4 bpp are widened to one
/// index per byte and, like 8 bpp, become [`GenericImage::Indexed`] with
/// the raster's palette. 24 bpp becomes [`GenericImage::Rgb`].
pub fn to_generic(raster: &RasterImage) -> Result<GenericImage, SlotError> {
    let (w, h) = (raster.width(), raster.height());
    let count = raster.pixel_count();
    match raster.depth() {
        BitDepth::One => {
            let values = pack::unpack(raster.pixels(), 1, count)?;
            GenericImage::mono(w, h, values)
        }
        depth @ (BitDepth::Two | BitDepth::Four) => {
            let values = pack::unpack(raster.pixels(), depth.bits(), count)?;
            let widened = pack::pack(&values, 8)?;
            GenericImage::indexed(w, h, widened, palette_of(raster))
        }
        BitDepth::Eight => GenericImage::indexed(w, h, raster.pixels().to_vec(), palette_of(raster)),
        BitDepth::TwentyFour => {
            let px: &[Rgb] = raster.pixels().as_pixels();
            GenericImage::rgb(w, h, px.to_vec())
        }
    }
}

fn palette_of(raster: &RasterImage) -> Vec<Rgb> {
    raster.palette().map(<[Rgb]>::to_vec).unwrap_or_default()
}

/// Pack a generic image down to a raster at `target` depth.
///
/// Indexed depths need index data: an [`GenericImage::Indexed`] image keeps
/// its palette, a [`GenericImage::Mono`] image gets a black/white palette.
/// Every index must fit the target depth. 24 bpp accepts any opaque image.
/// RGBA images must have their alpha flattened first.
pub fn from_generic(image: &GenericImage, target: BitDepth) -> Result<RasterImage, SlotError> {
    let contiguous = image.to_contiguous();
    let image: &GenericImage = &contiguous;
    let (w, h) = (image.width(), image.height());
    if let GenericImage::Rgba(_) = image {
        return Err(SlotError::UnsupportedVariant(
            "RGBA image must be flattened before packing".into(),
        ));
    }
    match target {
        BitDepth::TwentyFour => {
            let rgb = image.to_rgb();
            RasterImage::new(w, h, target, rgb.buf().as_bytes().to_vec(), None)
        }
        indexed => {
            let (indices, palette) = match image {
                GenericImage::Indexed { pixels, palette } => (pixels.buf(), palette.clone()),
                GenericImage::Mono(pixels) => (
                    pixels.buf(),
                    alloc::vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)],
                ),
                other => {
                    return Err(SlotError::UnsupportedVariant(alloc::format!(
                        "{:?} image must be quantized before packing to {target}",
                        other.mode()
                    )));
                }
            };
            let indices: Vec<u8> = match image {
                // mono stores any nonzero value as white
                GenericImage::Mono(_) => indices.iter().map(|&v| u8::from(v != 0)).collect(),
                _ => indices.clone(),
            };
            let packed = pack::pack(&indices, indexed.bits())?;
            if palette.len() > indexed.max_colors() {
                return Err(SlotError::PaletteTooLarge {
                    len: palette.len(),
                    max: indexed.max_colors(),
                });
            }
            RasterImage::new(w, h, indexed, packed, Some(palette))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::ColorMode;
    use alloc::vec;

    fn four_gray() -> Vec<Rgb> {
        (0..4).map(|i| Rgb::new(i * 85, i * 85, i * 85)).collect()
    }

    #[test]
    fn one_bpp_becomes_mono() {
        let raster =
            RasterImage::from_values(3, 1, BitDepth::One, &[1, 0, 1], Some(vec![Rgb::new(0, 0, 0)]))
                .unwrap();
        let img = to_generic(&raster).unwrap();
        assert_eq!(img.mode(), ColorMode::Mono);
        assert_eq!(img.raw_bytes(), vec![1, 0, 1]);
    }

    #[test]
    fn two_bpp_widens_to_indexed() {
        let raster =
            RasterImage::from_values(5, 1, BitDepth::Two, &[3, 2, 1, 0, 3], Some(four_gray()))
                .unwrap();
        let img = to_generic(&raster).unwrap();
        assert_eq!(img.mode(), ColorMode::Indexed);
        assert_eq!(img.raw_bytes(), vec![3, 2, 1, 0, 3]);
        assert_eq!(img.palette().unwrap(), &four_gray()[..]);
    }

    #[test]
    fn twenty_four_bpp_is_rgb() {
        let raster = RasterImage::from_packed(2, 1, 24, vec![1, 2, 3, 4, 5, 6], None).unwrap();
        let img = to_generic(&raster).unwrap();
        assert_eq!(img.mode(), ColorMode::Rgb);
        assert_eq!(img.raw_bytes(), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn indexed_repacks_to_target_depth() {
        let img = GenericImage::indexed(5, 1, vec![3, 2, 1, 0, 3], four_gray()).unwrap();
        let raster = from_generic(&img, BitDepth::Two).unwrap();
        assert_eq!(raster.pixels(), &[0b11_10_01_00, 0b11_00_00_00]);
        assert_eq!(raster.palette().unwrap(), &four_gray()[..]);
        assert_eq!(to_generic(&raster).unwrap().raw_bytes(), img.raw_bytes());
    }

    #[test]
    fn index_too_large_for_target() {
        let img = GenericImage::indexed(1, 1, vec![5], four_gray()).unwrap();
        assert!(matches!(
            from_generic(&img, BitDepth::Two),
            Err(SlotError::ValueOutOfRange { value: 5, bits: 2 })
        ));
    }

    #[test]
    fn true_color_needs_quantizing_for_indexed_target() {
        let img = GenericImage::rgb(1, 1, vec![Rgb::new(1, 1, 1)]).unwrap();
        assert!(matches!(
            from_generic(&img, BitDepth::Eight),
            Err(SlotError::UnsupportedVariant(_))
        ));
        let raster = from_generic(&img, BitDepth::TwentyFour).unwrap();
        assert_eq!(raster.pixels(), &[1, 1, 1]);
        assert!(raster.palette().is_none());
    }

    #[test]
    fn strided_index_plane_packs_visible_pixels() {
        let pixels = imgref::ImgVec::new_stride(vec![1u8, 0, 9, 0, 1, 9], 2, 2, 3);
        let img = GenericImage::Indexed {
            pixels,
            palette: vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)],
        };
        let raster = from_generic(&img, BitDepth::One).unwrap();
        assert_eq!(raster.pixel_values().unwrap(), vec![1, 0, 0, 1]);
    }
}
