//! Turning arbitrary image bytes into something a slot can be fed.

use alloc::vec::Vec;

use enough::Stop;
use tracing::{debug, trace};

use crate::error::{DecodeAttempt, SlotError};
use crate::generic::GenericImage;
use crate::limits::Limits;
use crate::pixel::SourceFormat;
use crate::raster::RasterImage;

/// Input to slot adaptation: an already packed device raster, or a
/// decoded image in any color model.
#[derive(Clone, Debug)]
pub enum SourceImage {
    Raster(RasterImage),
    Generic(GenericImage),
}

impl SourceImage {
    pub fn width(&self) -> u32 {
        match self {
            Self::Raster(r) => r.width(),
            Self::Generic(g) => g.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Raster(r) => r.height(),
            Self::Generic(g) => g.height(),
        }
    }
}

impl From<RasterImage> for SourceImage {
    fn from(raster: RasterImage) -> Self {
        Self::Raster(raster)
    }
}

impl From<GenericImage> for SourceImage {
    fn from(image: GenericImage) -> Self {
        Self::Generic(image)
    }
}

/// Decoders tried in order when no format is forced.
const PROBE_ORDER: &[SourceFormat] = &[SourceFormat::Bmp, SourceFormat::Pnm, SourceFormat::Farbfeld];

/// Builder for decoding source bytes.
///
/// BMP files at 1, 2, 4, 8 or 24 bpp decode to a [`SourceImage::Raster`]
/// so a matching slot can take them unchanged; everything else decodes to
/// a [`SourceImage::Generic`].
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    format: Option<SourceFormat>,
    limits: Option<&'a Limits>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            format: None,
            limits: None,
        }
    }

    /// Only try this decoder.
    pub fn with_format(mut self, format: SourceFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Try each decoder in turn and return the first success.
    ///
    /// If every decoder fails the error lists each attempt. Cancellation
    /// and limit violations end the search immediately.
    pub fn decode(self, stop: impl Stop) -> Result<SourceImage, SlotError> {
        self.decode_inner(&stop)
    }

    pub(crate) fn decode_inner(&self, stop: &dyn Stop) -> Result<SourceImage, SlotError> {
        let formats = match &self.format {
            Some(format) => core::slice::from_ref(format),
            None => PROBE_ORDER,
        };
        let mut attempts = Vec::new();
        for &format in formats {
            match self.decode_as(format, stop) {
                Ok(image) => {
                    debug!(
                        ?format,
                        width = image.width(),
                        height = image.height(),
                        "decoded source image"
                    );
                    return Ok(image);
                }
                Err(error) if error.is_fatal_for_probe() => return Err(error),
                Err(error) => {
                    trace!(?format, %error, "decoder rejected source");
                    attempts.push(DecodeAttempt { format, error });
                }
            }
        }
        Err(SlotError::UnrecognizedSourceImage { attempts })
    }

    fn decode_as(&self, format: SourceFormat, stop: &dyn Stop) -> Result<SourceImage, SlotError> {
        match format {
            SourceFormat::Bmp => crate::bmp::decode(self.data, self.limits, stop),
            #[cfg(feature = "pnm")]
            SourceFormat::Pnm => crate::pnm::decode(self.data, self.limits, stop).map(Into::into),
            #[cfg(feature = "farbfeld")]
            SourceFormat::Farbfeld => {
                crate::farbfeld::decode(self.data, self.limits, stop).map(Into::into)
            }
            #[allow(unreachable_patterns)]
            other => Err(SlotError::UnsupportedVariant(alloc::format!(
                "{other:?} support not compiled in"
            ))),
        }
    }
}
