//! Fitting arbitrary images into fixed-format device slots.
//!
//! A slot dictates depth, dimensions and (for indexed depths) the palette.
//! [`AdaptRequest::adapt`] returns a source raster untouched when it already
//! matches, and otherwise flattens alpha onto the slot's transparency color,
//! stretches to the slot size, quantizes to the slot palette and packs to
//! the slot depth, in that order.

mod alpha;
mod quantize;
mod resize;

pub use quantize::Dither;

use alloc::vec::Vec;

use enough::Stop;
use tracing::debug;

use crate::bridge;
use crate::decode::SourceImage;
use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::limits::Limits;
use crate::pixel::{BitDepth, Rgb};
use crate::raster::RasterImage;

/// Color substituted for transparent pixels unless a slot says otherwise.
pub const DEFAULT_TRANSPARENCY: Rgb = Rgb::new(255, 0, 255);

/// What a device image slot accepts.
///
/// For indexed depths only the first `colors_used` palette entries matter:
/// comparisons and quantization use that prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotDescriptor {
    pub index: u32,
    pub depth: BitDepth,
    pub width: u32,
    pub height: u32,
    pub palette: Vec<Rgb>,
    pub colors_used: usize,
    pub writable: bool,
    /// Replaces transparent source pixels; the device has no alpha.
    pub transparency: Rgb,
}

impl SlotDescriptor {
    /// A writable slot with no palette and magenta transparency.
    pub fn new(index: u32, bits_per_pixel: u32, width: u32, height: u32) -> Result<Self, SlotError> {
        let depth = BitDepth::from_bits(bits_per_pixel)?;
        if width == 0 || height == 0 {
            return Err(SlotError::InvalidDimensions { width, height });
        }
        Ok(Self {
            index,
            depth,
            width,
            height,
            palette: Vec::new(),
            colors_used: 0,
            writable: true,
            transparency: DEFAULT_TRANSPARENCY,
        })
    }

    pub fn with_palette(mut self, palette: Vec<Rgb>, colors_used: usize) -> Self {
        self.palette = palette;
        self.colors_used = colors_used;
        self
    }

    pub fn with_transparency(mut self, color: Rgb) -> Self {
        self.transparency = color;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// The meaningful palette prefix, `palette[..colors_used]`.
    pub fn target_palette(&self) -> &[Rgb] {
        &self.palette[..self.colors_used.min(self.palette.len())]
    }

    /// Check internal consistency before any conversion work.
    pub fn validate(&self) -> Result<(), SlotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SlotError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !self.depth.is_indexed() {
            return Ok(());
        }
        let max = self.depth.max_colors();
        if self.palette.len() > max {
            return Err(SlotError::PaletteTooLarge {
                len: self.palette.len(),
                max,
            });
        }
        if self.colors_used == 0 || self.colors_used > self.palette.len() {
            return Err(SlotError::InvalidSlot(alloc::format!(
                "slot {} uses {} colors but has {} palette entries",
                self.index,
                self.colors_used,
                self.palette.len()
            )));
        }
        Ok(())
    }
}

/// Conversion knobs for [`AdaptRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdaptOptions {
    pub dither: Dither,
    /// Source pixels with alpha at or above this value are kept; the rest
    /// become the slot's transparency color.
    pub alpha_threshold: u8,
}

impl Default for AdaptOptions {
    fn default() -> Self {
        Self {
            dither: Dither::None,
            alpha_threshold: 128,
        }
    }
}

/// Hook notified of each step the adapter takes.
///
/// All methods default to doing nothing.
pub trait AdaptObserver {
    fn direct_fit(&self, _slot: &SlotDescriptor) {}
    fn alpha_flattened(&self, _transparency: Rgb) {}
    fn resized(&self, _from: (u32, u32), _to: (u32, u32)) {}
    fn quantized(&self, _colors: usize) {}
    fn repacked(&self, _depth: BitDepth) {}
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoObserver;

impl AdaptObserver for NoObserver {}

/// Builder for fitting one source image to one slot.
pub struct AdaptRequest<'a> {
    slot: &'a SlotDescriptor,
    options: AdaptOptions,
    limits: Option<&'a Limits>,
    observer: &'a dyn AdaptObserver,
}

impl<'a> AdaptRequest<'a> {
    pub fn new(slot: &'a SlotDescriptor) -> Self {
        Self {
            slot,
            options: AdaptOptions::default(),
            limits: None,
            observer: &NoObserver,
        }
    }

    pub fn with_options(mut self, options: AdaptOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn AdaptObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Produce a raster the slot accepts.
    ///
    /// Either a fully valid raster comes back or an error does; there is no
    /// partial output. Writability is the caller's check, see
    /// [`crate::device::upload`].
    pub fn adapt(
        self,
        source: impl Into<SourceImage>,
        stop: impl Stop,
    ) -> Result<RasterImage, SlotError> {
        self.adapt_inner(source.into(), &stop)
    }

    pub(crate) fn adapt_inner(
        &self,
        source: SourceImage,
        stop: &dyn Stop,
    ) -> Result<RasterImage, SlotError> {
        let slot = self.slot;
        slot.validate()?;
        if let Some(limits) = self.limits {
            limits.check_image(slot.width, slot.height)?;
        }

        let image = match source {
            SourceImage::Raster(raster) => {
                if raster.fits(slot.depth, slot.width, slot.height, &slot.palette, slot.colors_used)
                {
                    debug!(slot = slot.index, bpp = slot.depth.bits(), "raster fits slot as-is");
                    self.observer.direct_fit(slot);
                    return Ok(raster);
                }
                debug!(
                    slot = slot.index,
                    bpp = raster.bits_per_pixel(),
                    width = raster.width(),
                    height = raster.height(),
                    "raster does not fit slot, converting"
                );
                raster_to_generic(&raster)?
            }
            SourceImage::Generic(image) => image.into_contiguous(),
        };
        if let Some(limits) = self.limits {
            limits.check_image(image.width(), image.height())?;
        }
        stop.check()?;

        let image = match image {
            GenericImage::Rgba(px) => {
                debug!(
                    slot = slot.index,
                    r = slot.transparency.r,
                    g = slot.transparency.g,
                    b = slot.transparency.b,
                    "replacing alpha with transparency color"
                );
                self.observer.alpha_flattened(slot.transparency);
                GenericImage::Rgb(alpha::flatten(
                    px.as_ref(),
                    slot.transparency,
                    self.options.alpha_threshold,
                ))
            }
            opaque => opaque,
        };

        let from = (image.width(), image.height());
        let image = if from != (slot.width, slot.height) {
            debug!(
                slot = slot.index,
                width = slot.width,
                height = slot.height,
                "resizing image"
            );
            self.observer.resized(from, (slot.width, slot.height));
            resize::resize(&image, slot.width, slot.height, stop)?
        } else {
            image
        };

        let raster = match slot.depth {
            BitDepth::TwentyFour => {
                let rgb = match image {
                    GenericImage::Rgb(px) => GenericImage::Rgb(px),
                    other => GenericImage::Rgb(other.to_rgb()),
                };
                bridge::from_generic(&rgb, BitDepth::TwentyFour)?
            }
            indexed => {
                let target = slot.target_palette();
                let image = if uses_palette(&image, target) {
                    image
                } else {
                    debug!(
                        slot = slot.index,
                        colors = target.len(),
                        "quantizing image to slot palette"
                    );
                    self.observer.quantized(target.len());
                    quantize::quantize(&image, target, self.options.dither, stop)?
                };
                bridge::from_generic(&image, indexed)?
            }
        };
        debug!(slot = slot.index, bpp = slot.depth.bits(), "packed image for slot");
        self.observer.repacked(slot.depth);
        Ok(raster)
    }
}

/// Like [`bridge::to_generic`], but a 1 bpp raster keeps its palette so a
/// non black/white color table resolves to the right colors.
fn raster_to_generic(raster: &RasterImage) -> Result<GenericImage, SlotError> {
    match (bridge::to_generic(raster)?, raster.palette()) {
        (GenericImage::Mono(pixels), Some(palette)) if !palette.is_empty() => {
            Ok(GenericImage::Indexed {
                pixels,
                palette: palette.to_vec(),
            })
        }
        (image, _) => Ok(image),
    }
}

/// Whether an indexed image already uses exactly `target` as its palette
/// with every index inside it.
fn uses_palette(image: &GenericImage, target: &[Rgb]) -> bool {
    match image {
        GenericImage::Indexed { pixels, palette } => {
            palette.as_slice() == target
                && pixels.rows().flatten().all(|&i| usize::from(i) < target.len())
        }
        _ => false,
    }
}
