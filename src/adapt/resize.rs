//! Direct stretch to the slot size. Aspect ratio is not preserved: slot
//! dimensions are fixed by the hardware.

use alloc::vec::Vec;

use enough::Stop;
use imgref::{ImgRef, ImgVec};

use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::pixel::Rgb;

/// Stretch `image` to exactly `width` x `height`.
///
/// Index planes (mono, indexed) use nearest-neighbour sampling since indices
/// cannot be interpolated. Gray and RGB images are sampled bilinearly.
/// Alpha is flattened before resizing, so RGBA input is refused.
pub(super) fn resize(
    image: &GenericImage,
    width: u32,
    height: u32,
    stop: &dyn Stop,
) -> Result<GenericImage, SlotError> {
    let (w, h) = (width as usize, height as usize);
    Ok(match image {
        GenericImage::Mono(img) => GenericImage::Mono(nearest(img.as_ref(), w, h, stop)?),
        GenericImage::Indexed { pixels, palette } => GenericImage::Indexed {
            pixels: nearest(pixels.as_ref(), w, h, stop)?,
            palette: palette.clone(),
        },
        GenericImage::Gray(img) => GenericImage::Gray(bilinear(img.as_ref(), w, h, stop)?),
        GenericImage::Rgb(img) => GenericImage::Rgb(bilinear(img.as_ref(), w, h, stop)?),
        GenericImage::Rgba(_) => {
            return Err(SlotError::UnsupportedVariant(
                "RGBA image must be flattened before resizing".into(),
            ));
        }
    })
}

fn row_of<'s, T>(img: &'s ImgRef<'_, T>, y: usize) -> &'s [T] {
    let start = y * img.stride();
    &img.buf()[start..start + img.width()]
}

/// Source index for destination index `d` by pixel-center mapping.
#[inline]
fn nearest_coord(d: usize, src_len: usize, dst_len: usize) -> usize {
    ((2 * d + 1) * src_len / (2 * dst_len)).min(src_len - 1)
}

fn nearest<T: Copy>(
    src: ImgRef<'_, T>,
    dst_width: usize,
    dst_height: usize,
    stop: &dyn Stop,
) -> Result<ImgVec<T>, SlotError> {
    let xs: Vec<usize> = (0..dst_width)
        .map(|x| nearest_coord(x, src.width(), dst_width))
        .collect();
    let mut buf = Vec::with_capacity(dst_width * dst_height);
    for y in 0..dst_height {
        if y % 16 == 0 {
            stop.check()?;
        }
        let src_row = row_of(&src, nearest_coord(y, src.height(), dst_height));
        buf.extend(xs.iter().map(|&x| src_row[x]));
    }
    Ok(ImgVec::new(buf, dst_width, dst_height))
}

/// Pixel types that can be interpolated channel-wise.
trait Lerp: Copy {
    fn to_f32(self) -> [f32; 4];
    fn from_f32(c: [f32; 4]) -> Self;
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v + 0.5).clamp(0.0, 255.0) as u8
}

impl Lerp for u8 {
    fn to_f32(self) -> [f32; 4] {
        [f32::from(self), 0.0, 0.0, 0.0]
    }
    fn from_f32(c: [f32; 4]) -> Self {
        to_u8(c[0])
    }
}

impl Lerp for Rgb {
    fn to_f32(self) -> [f32; 4] {
        [f32::from(self.r), f32::from(self.g), f32::from(self.b), 0.0]
    }
    fn from_f32(c: [f32; 4]) -> Self {
        Rgb::new(to_u8(c[0]), to_u8(c[1]), to_u8(c[2]))
    }
}

/// Source coordinate for a destination position, pixel-center mapping,
/// split into the lower sample, the upper sample and the weight of the
/// upper one.
#[inline]
fn sample_pos(d: usize, src_len: usize, dst_len: usize) -> (usize, usize, f32) {
    let scale = src_len as f32 / dst_len as f32;
    let max = (src_len - 1) as f32;
    let s = ((d as f32 + 0.5) * scale - 0.5).clamp(0.0, max);
    let lo = s as usize;
    let hi = (lo + 1).min(src_len - 1);
    (lo, hi, s - lo as f32)
}

fn bilinear<T: Lerp>(
    src: ImgRef<'_, T>,
    dst_width: usize,
    dst_height: usize,
    stop: &dyn Stop,
) -> Result<ImgVec<T>, SlotError> {
    let xs: Vec<(usize, usize, f32)> = (0..dst_width)
        .map(|x| sample_pos(x, src.width(), dst_width))
        .collect();
    let mut buf = Vec::with_capacity(dst_width * dst_height);
    for y in 0..dst_height {
        if y % 16 == 0 {
            stop.check()?;
        }
        let (y0, y1, fy) = sample_pos(y, src.height(), dst_height);
        let (top, bottom) = (row_of(&src, y0), row_of(&src, y1));
        for &(x0, x1, fx) in &xs {
            let (a, b) = (top[x0].to_f32(), top[x1].to_f32());
            let (c, d) = (bottom[x0].to_f32(), bottom[x1].to_f32());
            let mut out = [0.0f32; 4];
            for i in 0..4 {
                let upper = a[i] + (b[i] - a[i]) * fx;
                let lower = c[i] + (d[i] - c[i]) * fx;
                out[i] = upper + (lower - upper) * fy;
            }
            buf.push(T::from_f32(out));
        }
    }
    Ok(ImgVec::new(buf, dst_width, dst_height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use enough::Unstoppable;

    #[test]
    fn nearest_upscale_duplicates() {
        let src = ImgVec::new(vec![1u8, 2, 3, 4], 2, 2);
        let out = nearest(src.as_ref(), 4, 2, &Unstoppable).unwrap();
        assert_eq!(out.buf(), &[1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn nearest_downscale_picks_centers() {
        let src = ImgVec::new((0u8..9).collect::<Vec<_>>(), 9, 1);
        let out = nearest(src.as_ref(), 3, 1, &Unstoppable).unwrap();
        assert_eq!(out.buf(), &[1, 4, 7]);
    }

    #[test]
    fn bilinear_flat_stays_flat() {
        let src = ImgVec::new(vec![Rgb::new(200, 100, 50); 6], 3, 2);
        let out = bilinear(src.as_ref(), 7, 5, &Unstoppable).unwrap();
        assert_eq!(out.width(), 7);
        assert_eq!(out.height(), 5);
        assert!(out.buf().iter().all(|&p| p == Rgb::new(200, 100, 50)));
    }

    #[test]
    fn bilinear_interpolates_between_columns() {
        let src = ImgVec::new(vec![0u8, 255], 2, 1);
        let out = bilinear(src.as_ref(), 4, 1, &Unstoppable).unwrap();
        // edges clamp, inner samples blend
        assert_eq!(out.buf()[0], 0);
        assert_eq!(out.buf()[3], 255);
        assert!(out.buf()[1] > 0 && out.buf()[1] < 128);
        assert!(out.buf()[2] > 128 && out.buf()[2] < 255);
    }

    #[test]
    fn resize_keeps_palette() {
        let img = GenericImage::indexed(1, 1, vec![1], vec![Rgb::new(0, 0, 0), Rgb::new(9, 9, 9)])
            .unwrap();
        let out = resize(&img, 3, 2, &Unstoppable).unwrap();
        assert_eq!(out.width(), 3);
        assert_eq!(out.height(), 2);
        assert_eq!(out.raw_bytes(), vec![1; 6]);
        assert_eq!(out.palette(), img.palette());
    }

    #[test]
    fn rgba_must_be_flattened_first() {
        let img = GenericImage::rgba(1, 1, vec![crate::pixel::Rgba::new(1, 2, 3, 4)]).unwrap();
        assert!(matches!(
            resize(&img, 2, 2, &Unstoppable),
            Err(SlotError::UnsupportedVariant(_))
        ));
    }
}
