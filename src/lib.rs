//! # zenslot
//!
//! Conversion engine for devices that store images in fixed-format slots:
//! each slot has a set bit depth, fixed dimensions and (for indexed
//! depths) a fixed palette.
//!
//! ## Pieces
//!
//! - [`pack`]: sub-byte packing of palette indices, most-significant first.
//! - [`RasterImage`]: the packed device bitmap (1, 2, 4, 8 or 24 bpp).
//! - [`GenericImage`]: a pixel-addressable image in mono, gray, indexed,
//!   RGB or RGBA.
//! - [`bridge`]: lossless conversion between the two.
//! - [`AdaptRequest`]: fits any source to a [`SlotDescriptor`] by
//!   flattening alpha onto the slot's transparency color, stretching,
//!   quantizing to the slot palette and packing. A raster that already
//!   fits is returned unchanged.
//! - [`DecodeRequest`] / [`EncodeRequest`]: BMP (always), PNM and
//!   farbfeld (features `pnm`, `farbfeld`).
//! - [`device`]: upload and download against an [`ImageDevice`].
//!
//! ## Non-Goals
//!
//! - Compressed BMP (RLE) and 16-bit BMP
//! - Aspect-preserving resize
//! - Color management
//!
//! ## Usage
//!
//! ```
//! use zenslot::{AdaptRequest, GenericImage, Rgb, SlotDescriptor, Unstoppable};
//!
//! let photo = GenericImage::rgb(10, 10, vec![Rgb::new(200, 30, 30); 100])?;
//! let slot = SlotDescriptor::new(0, 1, 10, 10)?
//!     .with_palette(vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)], 2);
//!
//! let raster = AdaptRequest::new(&slot).adapt(photo, Unstoppable)?;
//! assert_eq!(raster.bits_per_pixel(), 1);
//! assert_eq!(raster.pixels().len(), 13);
//! # Ok::<(), zenslot::SlotError>(())
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod error;
mod generic;
mod limits;
mod pixel;
mod raster;

pub mod bridge;
pub mod pack;

mod bmp;
#[cfg(feature = "farbfeld")]
mod farbfeld;
#[cfg(feature = "pnm")]
mod pnm;

pub mod adapt;
mod decode;
pub mod device;
mod encode;

// Re-exports
pub use adapt::{
    AdaptObserver, AdaptOptions, AdaptRequest, DEFAULT_TRANSPARENCY, Dither, NoObserver,
    SlotDescriptor,
};
pub use decode::{DecodeRequest, SourceImage};
pub use device::ImageDevice;
pub use encode::EncodeRequest;
pub use enough::{Stop, Unstoppable};
pub use error::{DecodeAttempt, SlotError};
pub use generic::GenericImage;
pub use limits::Limits;
pub use pixel::{BitDepth, ColorMode, Rgb, Rgba, SourceFormat};
pub use raster::RasterImage;
