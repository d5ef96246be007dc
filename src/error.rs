use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;
use enough::StopReason;

use crate::pixel::SourceFormat;

/// Errors from bit packing, raster construction, slot adaptation and the
/// BMP/PNM/farbfeld codecs.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SlotError {
    #[error("{0}-bit color depth is not supported")]
    UnsupportedDepth(u32),

    #[error("value {value} cannot be represented by {bits} bits")]
    ValueOutOfRange { value: u32, bits: u8 },

    #[error("malformed pixel buffer: expected {expected} bytes, got {actual}")]
    MalformedBuffer { expected: usize, actual: usize },

    #[error("palette has {len} entries, at most {max} allowed")]
    PaletteTooLarge { len: usize, max: usize },

    #[error("unrecognized source image ({})", DisplayAttempts(.attempts))]
    UnrecognizedSourceImage { attempts: Vec<DecodeAttempt> },

    #[error("image slot {index} is not writable")]
    SlotNotWritable { index: u32 },

    #[error("cannot upload {images} images to {slots} slots")]
    SlotCountMismatch { images: usize, slots: usize },

    #[error("invalid slot descriptor: {0}")]
    InvalidSlot(String),

    #[error("unrecognized format magic bytes")]
    UnrecognizedFormat,

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unsupported format variant: {0}")]
    UnsupportedVariant(String),

    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("device transport failed")]
    Transport(#[source] Box<dyn core::error::Error + Send + Sync>),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for SlotError {
    fn from(r: StopReason) -> Self {
        SlotError::Cancelled(r)
    }
}

impl SlotError {
    /// Whether a decoder that produced this error should stop the search
    /// for another decoder instead of recording the failure.
    pub(crate) fn is_fatal_for_probe(&self) -> bool {
        matches!(self, SlotError::Cancelled(_) | SlotError::LimitExceeded(_))
    }
}

/// One failed decoder attempt, kept for diagnostics.
#[derive(Debug)]
pub struct DecodeAttempt {
    pub format: SourceFormat,
    pub error: SlotError,
}

struct DisplayAttempts<'a>(&'a [DecodeAttempt]);

impl fmt::Display for DisplayAttempts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no decoders available");
        }
        for (i, attempt) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{:?}: {}", attempt.format, attempt.error)?;
        }
        Ok(())
    }
}
