use alloc::vec::Vec;

use enough::Stop;

use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::pixel::SourceFormat;
use crate::raster::RasterImage;

/// Builder for writing images out.
///
/// ```
/// use zenslot::{BitDepth, EncodeRequest, RasterImage, Unstoppable};
///
/// let raster = RasterImage::from_values(2, 1, BitDepth::One, &[1, 0], None)?;
/// let bmp = EncodeRequest::bmp().encode_raster(&raster, Unstoppable)?;
/// assert!(bmp.starts_with(b"BM"));
/// # Ok::<(), zenslot::SlotError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct EncodeRequest {
    format: SourceFormat,
}

impl EncodeRequest {
    /// Windows bitmap, the on-device layout.
    pub fn bmp() -> Self {
        Self {
            format: SourceFormat::Bmp,
        }
    }

    /// Binary PNM; the variant follows the image's color model.
    #[cfg(feature = "pnm")]
    pub fn pnm() -> Self {
        Self {
            format: SourceFormat::Pnm,
        }
    }

    /// Farbfeld, always RGBA.
    #[cfg(feature = "farbfeld")]
    pub fn farbfeld() -> Self {
        Self {
            format: SourceFormat::Farbfeld,
        }
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    /// Encode a packed raster. BMP keeps the raster's depth and palette;
    /// other formats receive the expanded image.
    pub fn encode_raster(&self, raster: &RasterImage, stop: impl Stop) -> Result<Vec<u8>, SlotError> {
        match self.format {
            SourceFormat::Bmp => crate::bmp::encode_raster(raster, &stop),
            _ => self.encode_generic(&crate::bridge::to_generic(raster)?, stop),
        }
    }

    pub fn encode_generic(&self, image: &GenericImage, stop: impl Stop) -> Result<Vec<u8>, SlotError> {
        let contiguous = image.to_contiguous();
        let image: &GenericImage = &contiguous;
        match self.format {
            SourceFormat::Bmp => crate::bmp::encode_generic(image, &stop),
            #[cfg(feature = "pnm")]
            SourceFormat::Pnm => crate::pnm::encode(image, &stop),
            #[cfg(feature = "farbfeld")]
            SourceFormat::Farbfeld => crate::farbfeld::encode(image, &stop),
            #[allow(unreachable_patterns)]
            other => Err(SlotError::UnsupportedVariant(alloc::format!(
                "{other:?} support not compiled in"
            ))),
        }
    }
}
