//! Farbfeld decoder and encoder (internal).
//!
//! Farbfeld is a simple lossless format: 8-byte magic ("farbfeld"),
//! width/height as u32 big-endian, then RGBA u16 big-endian pixels.
//! Samples are reduced to 8 bits on decode and widened by 257 on encode.

mod decode;
mod encode;

use alloc::vec::Vec;
use enough::Stop;

use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::limits::Limits;

/// Decode farbfeld data to an RGBA image.
pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<GenericImage, SlotError> {
    let (width, height) = decode::parse_header(data)?;
    if let Some(limits) = limits {
        limits.check_image(width, height)?;
    }
    stop.check()?;
    let pixels = decode::decode_pixels(data, width, height, stop)?;
    GenericImage::rgba(width, height, pixels)
}

/// Encode any generic image as farbfeld. Images without alpha are written
/// fully opaque.
pub(crate) fn encode(image: &GenericImage, stop: &dyn Stop) -> Result<Vec<u8>, SlotError> {
    encode::encode_farbfeld(image, stop)
}
