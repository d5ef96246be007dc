use alloc::vec::Vec;
use enough::Stop;

use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::pixel::Rgba;

/// Encode an image to farbfeld, widening each 8-bit sample via `val * 257`.
pub(crate) fn encode_farbfeld(image: &GenericImage, stop: &dyn Stop) -> Result<Vec<u8>, SlotError> {
    let (width, height) = (image.width(), image.height());
    let w = width as usize;
    let h = height as usize;

    // Output: 16 header + w*h*8 pixel bytes
    let total = w
        .checked_mul(h)
        .and_then(|wh| wh.checked_mul(8))
        .and_then(|n| n.checked_add(16))
        .ok_or(SlotError::DimensionsTooLarge { width, height })?;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"farbfeld");
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());

    stop.check()?;

    let rgba: Vec<Rgba> = match image {
        GenericImage::Rgba(px) => px.buf().clone(),
        opaque => opaque
            .to_rgb()
            .buf()
            .iter()
            .map(|p| Rgba::new(p.r, p.g, p.b, 255))
            .collect(),
    };
    for (row_idx, row) in rgba.chunks_exact(w).enumerate() {
        if row_idx % 16 == 0 {
            stop.check()?;
        }
        for px in row {
            for v in [px.r, px.g, px.b, px.a] {
                out.extend_from_slice(&(u16::from(v) * 257).to_be_bytes());
            }
        }
    }
    Ok(out)
}
