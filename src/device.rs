//! Moving images to and from a device that stores them in fixed slots.
//!
//! The transport is abstract: implement [`ImageDevice`] over whatever link
//! reaches the hardware and report failures as [`SlotError::Transport`].

use alloc::vec::Vec;

use enough::Stop;
use tracing::{debug, info};

use crate::adapt::{AdaptOptions, AdaptRequest, SlotDescriptor};
use crate::decode::DecodeRequest;
use crate::error::SlotError;
use crate::limits::Limits;
use crate::raster::RasterImage;

/// A device exposing numbered image slots.
pub trait ImageDevice {
    /// Describe every slot the device has.
    fn slots(&mut self) -> Result<Vec<SlotDescriptor>, SlotError>;

    /// Store a raster that already matches the slot.
    fn put(&mut self, index: u32, raster: &RasterImage) -> Result<(), SlotError>;

    /// Read the raster currently held by a slot.
    fn get(&mut self, index: u32) -> Result<RasterImage, SlotError>;
}

fn find_slot(slots: Vec<SlotDescriptor>, index: u32) -> Result<SlotDescriptor, SlotError> {
    slots
        .into_iter()
        .find(|s| s.index == index)
        .ok_or_else(|| SlotError::InvalidSlot(alloc::format!("device has no slot {index}")))
}

/// Indices of the slots that accept uploads.
pub fn writable_slots<D: ImageDevice + ?Sized>(device: &mut D) -> Result<Vec<u32>, SlotError> {
    Ok(device
        .slots()?
        .into_iter()
        .filter(|s| s.writable)
        .map(|s| s.index)
        .collect())
}

/// Decode `data`, fit it to slot `index` and store it.
///
/// Read-only slots are refused before any decoding happens.
pub fn upload<D: ImageDevice + ?Sized>(
    device: &mut D,
    index: u32,
    data: &[u8],
    options: AdaptOptions,
    limits: Option<&Limits>,
    stop: impl Stop,
) -> Result<(), SlotError> {
    upload_inner(device, index, data, options, limits, &stop)
}

fn upload_inner<D: ImageDevice + ?Sized>(
    device: &mut D,
    index: u32,
    data: &[u8],
    options: AdaptOptions,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<(), SlotError> {
    let slot = find_slot(device.slots()?, index)?;
    if !slot.writable {
        return Err(SlotError::SlotNotWritable { index });
    }

    let mut decode = DecodeRequest::new(data);
    if let Some(limits) = limits {
        decode = decode.with_limits(limits);
    }
    let source = decode.decode_inner(stop)?;

    let mut adapt = AdaptRequest::new(&slot).with_options(options);
    if let Some(limits) = limits {
        adapt = adapt.with_limits(limits);
    }
    let raster = adapt.adapt_inner(source, stop)?;

    debug!(slot = index, bytes = raster.pixels().len(), "sending image to device");
    device.put(index, &raster)?;
    info!(slot = index, width = slot.width, height = slot.height, "uploaded image");
    Ok(())
}

/// Upload several images, pairing them in order with `indices`, or with
/// every writable slot when `indices` is `None`.
///
/// The counts must match before anything is decoded. Stops at the first
/// failure; slots before it keep their new image.
pub fn upload_all<D: ImageDevice + ?Sized>(
    device: &mut D,
    images: &[&[u8]],
    indices: Option<&[u32]>,
    options: AdaptOptions,
    limits: Option<&Limits>,
    stop: impl Stop,
) -> Result<Vec<u32>, SlotError> {
    let indices = match indices {
        Some(indices) => indices.to_vec(),
        None => writable_slots(device)?,
    };
    if images.len() != indices.len() {
        return Err(SlotError::SlotCountMismatch {
            images: images.len(),
            slots: indices.len(),
        });
    }
    for (&index, data) in indices.iter().zip(images) {
        upload_inner(device, index, data, options, limits, &stop)?;
    }
    Ok(indices)
}

/// Read slot `index` and check the raster against the slot's description.
pub fn download<D: ImageDevice + ?Sized>(device: &mut D, index: u32) -> Result<RasterImage, SlotError> {
    let slot = find_slot(device.slots()?, index)?;
    let raster = device.get(index)?;
    if raster.width() != slot.width
        || raster.height() != slot.height
        || raster.depth() != slot.depth
    {
        return Err(SlotError::InvalidData(alloc::format!(
            "slot {index} returned a {}x{} {} image, expected {}x{} {}",
            raster.width(),
            raster.height(),
            raster.depth(),
            slot.width,
            slot.height,
            slot.depth
        )));
    }
    Ok(raster)
}
