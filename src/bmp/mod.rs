//! BMP, the layout device image slots are exchanged in (internal).
//!
//! Use [`crate::DecodeRequest`] and [`crate::EncodeRequest`].

mod decode;
mod encode;

use alloc::vec::Vec;

use enough::Stop;

use crate::bridge;
use crate::decode::SourceImage;
use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::limits::Limits;
use crate::pixel::BitDepth;
use crate::raster::RasterImage;

/// Decode BMP data. 32-bit files come back as RGBA, everything else as a
/// packed raster at the file's own depth.
pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<SourceImage, SlotError> {
    let header = decode::parse_bmp_header(data)?;
    if let Some(limits) = limits {
        limits.check_image(header.width, header.height)?;
    }
    stop.check()?;
    if header.bpp == 32 {
        decode::decode_rgba(header, data, stop).map(SourceImage::Generic)
    } else {
        decode::decode_raster(header, data, stop).map(SourceImage::Raster)
    }
}

/// Encode a raster at its own depth.
pub(crate) fn encode_raster(raster: &RasterImage, stop: &dyn Stop) -> Result<Vec<u8>, SlotError> {
    encode::encode_raster(raster, stop)
}

/// Encode a generic image at the narrowest depth that holds it losslessly:
/// mono at 1 bpp, indexed and gray at 8 bpp, RGB at 24 and RGBA at 32.
pub(crate) fn encode_generic(image: &GenericImage, stop: &dyn Stop) -> Result<Vec<u8>, SlotError> {
    let raster = match image {
        GenericImage::Mono(_) => bridge::from_generic(image, BitDepth::One)?,
        GenericImage::Indexed { .. } => bridge::from_generic(image, BitDepth::Eight)?,
        GenericImage::Gray(px) => RasterImage::new(
            image.width(),
            image.height(),
            BitDepth::Eight,
            px.buf().clone(),
            Some(encode::gray_ramp(BitDepth::Eight)),
        )?,
        GenericImage::Rgb(_) => bridge::from_generic(image, BitDepth::TwentyFour)?,
        GenericImage::Rgba(px) => {
            return encode::encode_rgba(px.buf(), image.width(), image.height(), stop);
        }
    };
    encode::encode_raster(&raster, stop)
}
