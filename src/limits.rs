use crate::error::SlotError;

/// Caps applied to source images before they are decoded or adapted.
///
/// Every field defaults to `None`, meaning no cap.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Cap on width * height.
    pub max_pixels: Option<u64>,
    /// Cap on the RGBA8 working buffer an image of this size needs.
    pub max_memory_bytes: Option<u64>,
}

fn exceeded(what: &str, value: u64, cap: Option<u64>) -> Result<(), SlotError> {
    match cap {
        Some(cap) if value > cap => Err(SlotError::LimitExceeded(alloc::format!(
            "{what} {value} exceeds limit {cap}"
        ))),
        _ => Ok(()),
    }
}

impl Limits {
    /// Reject a `width` x `height` image that breaks any cap.
    pub(crate) fn check_image(&self, width: u32, height: u32) -> Result<(), SlotError> {
        let (w, h) = (u64::from(width), u64::from(height));
        let pixels = w * h;
        exceeded("width", w, self.max_width)?;
        exceeded("height", h, self.max_height)?;
        exceeded("pixel count", pixels, self.max_pixels)?;
        exceeded("working buffer bytes", pixels.saturating_mul(4), self.max_memory_bytes)
    }
}
