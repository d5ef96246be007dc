#![no_main]
use libfuzzer_sys::fuzz_target;
use zenslot::*;

fuzz_target!(|data: &[u8]| {
    // Auto-detect decode (BMP, PNM, farbfeld) must never panic
    let Ok(source) = DecodeRequest::new(data).decode(enough::Unstoppable) else {
        return;
    };

    // Whatever decoded must also adapt to a small indexed slot without panicking
    let slot = SlotDescriptor::new(0, 2, 5, 3)
        .unwrap()
        .with_palette(vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255), Rgb::new(255, 0, 0)], 3);
    let limits = Limits {
        max_pixels: Some(1 << 22),
        ..Default::default()
    };
    let _ = AdaptRequest::new(&slot)
        .with_limits(&limits)
        .adapt(source, enough::Unstoppable);
});
