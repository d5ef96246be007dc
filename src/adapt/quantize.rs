//! Remapping colors onto a fixed slot palette.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;
use imgref::ImgVec;

use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::pixel::{Rgb, distance_sq};

/// How colors between palette entries are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Dither {
    /// Each pixel takes its nearest palette entry.
    #[default]
    None,
    /// Floyd-Steinberg error diffusion in RGB.
    FloydSteinberg,
}

/// Index of the palette entry nearest to `color`; ties go to the lower index.
pub(crate) fn nearest_index(palette: &[Rgb], color: Rgb) -> u8 {
    let mut best = 0usize;
    let mut best_dist = u32::MAX;
    for (i, &entry) in palette.iter().enumerate() {
        let d = distance_sq(entry, color);
        if d < best_dist {
            best = i;
            best_dist = d;
            if d == 0 {
                break;
            }
        }
    }
    best as u8
}

/// Quantize `image` to exactly `palette`, returning an indexed image whose
/// palette is `palette` and whose indices are all below `palette.len()`.
pub(super) fn quantize(
    image: &GenericImage,
    palette: &[Rgb],
    dither: Dither,
    stop: &dyn Stop,
) -> Result<GenericImage, SlotError> {
    if palette.is_empty() || palette.len() > 256 {
        return Err(SlotError::InvalidSlot(alloc::format!(
            "cannot quantize to a palette of {} colors",
            palette.len()
        )));
    }
    let (w, h) = (image.width() as usize, image.height() as usize);
    let indices = match (dither, image.index_plane()) {
        (Dither::None, Some(plane)) => {
            // Map the source palette once instead of every pixel.
            let lut = source_lut(image, palette);
            let mut out = Vec::with_capacity(w * h);
            for (y, row) in plane.rows().enumerate() {
                if y % 16 == 0 {
                    stop.check()?;
                }
                out.extend(row.iter().map(|&i| lut[usize::from(i)]));
            }
            out
        }
        (Dither::None, None) => nearest_map(&image.to_rgb(), palette, stop)?,
        (Dither::FloydSteinberg, _) => floyd_steinberg(&image.to_rgb(), palette, stop)?,
    };
    Ok(GenericImage::Indexed {
        pixels: ImgVec::new(indices, w, h),
        palette: palette.to_vec(),
    })
}

/// Lookup from every possible source index to a target index.
fn source_lut(image: &GenericImage, palette: &[Rgb]) -> [u8; 256] {
    let mut lut = [0u8; 256];
    let black = nearest_index(palette, Rgb::new(0, 0, 0));
    match image {
        GenericImage::Mono(_) => {
            let white = nearest_index(palette, Rgb::new(255, 255, 255));
            lut.fill(white);
            lut[0] = black;
        }
        GenericImage::Indexed { palette: source, .. } => {
            lut.fill(black);
            for (slot, &color) in lut.iter_mut().zip(source.iter()) {
                *slot = nearest_index(palette, color);
            }
        }
        _ => {}
    }
    lut
}

fn nearest_map(
    rgb: &ImgVec<Rgb>,
    palette: &[Rgb],
    stop: &dyn Stop,
) -> Result<Vec<u8>, SlotError> {
    let mut out = Vec::with_capacity(rgb.width() * rgb.height());
    let mut last: Option<(Rgb, u8)> = None;
    for (y, row) in rgb.rows().enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        for &px in row {
            let idx = match last {
                Some((color, idx)) if color == px => idx,
                _ => {
                    let idx = nearest_index(palette, px);
                    last = Some((px, idx));
                    idx
                }
            };
            out.push(idx);
        }
    }
    Ok(out)
}

fn floyd_steinberg(
    rgb: &ImgVec<Rgb>,
    palette: &[Rgb],
    stop: &dyn Stop,
) -> Result<Vec<u8>, SlotError> {
    let w = rgb.width();
    let mut out = Vec::with_capacity(w * rgb.height());
    // error rows padded by one pixel on each side, 3 channels per pixel
    let mut cur = vec![0i32; (w + 2) * 3];
    let mut next = vec![0i32; (w + 2) * 3];

    for (y, row) in rgb.rows().enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        for (x, px) in row.iter().enumerate() {
            let e = (x + 1) * 3;
            let want = [
                (i32::from(px.r) + cur[e] / 16).clamp(0, 255),
                (i32::from(px.g) + cur[e + 1] / 16).clamp(0, 255),
                (i32::from(px.b) + cur[e + 2] / 16).clamp(0, 255),
            ];
            let idx = nearest_index(
                palette,
                Rgb::new(want[0] as u8, want[1] as u8, want[2] as u8),
            );
            out.push(idx);
            let got = palette[usize::from(idx)];
            let err = [
                want[0] - i32::from(got.r),
                want[1] - i32::from(got.g),
                want[2] - i32::from(got.b),
            ];
            for c in 0..3 {
                cur[e + 3 + c] += err[c] * 7;
                next[e - 3 + c] += err[c] * 3;
                next[e + c] += err[c] * 5;
                next[e + 3 + c] += err[c];
            }
        }
        core::mem::swap(&mut cur, &mut next);
        next.fill(0);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;

    fn bw() -> Vec<Rgb> {
        vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]
    }

    #[test]
    fn nearest_prefers_lower_index_on_ties() {
        let palette = [Rgb::new(0, 0, 0), Rgb::new(2, 0, 0)];
        assert_eq!(nearest_index(&palette, Rgb::new(1, 0, 0)), 0);
        assert_eq!(nearest_index(&palette, Rgb::new(2, 0, 0)), 1);
    }

    #[test]
    fn true_color_maps_to_nearest_entry() {
        let img = GenericImage::rgb(
            3,
            1,
            vec![Rgb::new(10, 10, 10), Rgb::new(250, 240, 230), Rgb::new(90, 90, 90)],
        )
        .unwrap();
        let out = quantize(&img, &bw(), Dither::None, &Unstoppable).unwrap();
        assert_eq!(out.raw_bytes(), vec![0, 1, 0]);
        assert_eq!(out.palette().unwrap(), &bw()[..]);
    }

    #[test]
    fn indexed_source_uses_palette_lookup() {
        let img = GenericImage::indexed(
            4,
            1,
            vec![0, 1, 2, 9],
            vec![Rgb::new(255, 255, 255), Rgb::new(20, 0, 0), Rgb::new(200, 200, 255)],
        )
        .unwrap();
        let out = quantize(&img, &bw(), Dither::None, &Unstoppable).unwrap();
        // index 9 is outside the source palette and resolves to black
        assert_eq!(out.raw_bytes(), vec![1, 0, 1, 0]);
    }

    #[test]
    fn mono_source_maps_black_and_white() {
        let img = GenericImage::mono(3, 1, vec![0, 1, 255]).unwrap();
        let palette = [Rgb::new(255, 255, 255), Rgb::new(0, 0, 0)];
        let out = quantize(&img, &palette, Dither::None, &Unstoppable).unwrap();
        assert_eq!(out.raw_bytes(), vec![1, 0, 0]);
    }

    #[test]
    fn dithering_stays_inside_palette() {
        let pixels: Vec<Rgb> = (0..64u8).map(|v| Rgb::new(v * 4, v * 2, 255 - v * 4)).collect();
        let img = GenericImage::rgb(8, 8, pixels).unwrap();
        let palette = [Rgb::new(0, 0, 0), Rgb::new(255, 0, 0), Rgb::new(0, 0, 255)];
        let out = quantize(&img, &palette, Dither::FloydSteinberg, &Unstoppable).unwrap();
        assert!(out.raw_bytes().iter().all(|&i| i < 3));
    }

    #[test]
    fn dithering_mid_gray_mixes_black_and_white() {
        let img = GenericImage::rgb(8, 8, vec![Rgb::new(128, 128, 128); 64]).unwrap();
        let out = quantize(&img, &bw(), Dither::FloydSteinberg, &Unstoppable).unwrap();
        let whites = out.raw_bytes().iter().filter(|&&i| i == 1).count();
        assert!((16..=48).contains(&whites), "got {whites} white pixels");
    }

    #[test]
    fn empty_palette_is_rejected() {
        let img = GenericImage::gray(1, 1, vec![0]).unwrap();
        assert!(matches!(
            quantize(&img, &[], Dither::None, &Unstoppable),
            Err(SlotError::InvalidSlot(_))
        ));
    }
}
