use imgref::{ImgRef, ImgVec};

use crate::pixel::{Rgb, Rgba};

/// Replace transparent pixels with `key`, dropping alpha.
///
/// Pixels with alpha at or above `threshold` keep their color unblended so
/// keyed pixels are exactly `key`.
pub(super) fn flatten(src: ImgRef<'_, Rgba>, key: Rgb, threshold: u8) -> ImgVec<Rgb> {
    let buf = src
        .rows()
        .flatten()
        .map(|p| if p.a >= threshold { Rgb::new(p.r, p.g, p.b) } else { key })
        .collect();
    ImgVec::new(buf, src.width(), src.height())
}
