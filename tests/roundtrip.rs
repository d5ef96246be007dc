use enough::Unstoppable;
use zenslot::*;

fn checkerboard(w: usize, h: usize) -> Vec<Rgb> {
    (0..w * h)
        .map(|i| {
            let (x, y) = (i % w, i / w);
            if (x + y) % 2 == 0 {
                Rgb::new(255, 0, 128)
            } else {
                Rgb::new(0, 200, 50)
            }
        })
        .collect()
}

fn noise(len: usize) -> Vec<u8> {
    let mut state: u32 = 0xDEAD_BEEF;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

fn decode_raster(data: &[u8]) -> RasterImage {
    match DecodeRequest::new(data).decode(Unstoppable).unwrap() {
        SourceImage::Raster(r) => r,
        SourceImage::Generic(g) => panic!("expected a raster, got {:?}", g.mode()),
    }
}

fn decode_generic(data: &[u8]) -> GenericImage {
    match DecodeRequest::new(data).decode(Unstoppable).unwrap() {
        SourceImage::Generic(g) => g,
        SourceImage::Raster(r) => panic!("expected a generic image, got {} bpp", r.bits_per_pixel()),
    }
}

// ── BMP rasters ──────────────────────────────────────────────────────

#[test]
fn bmp_raster_roundtrip_odd_width() {
    // 13 pixels per row: neither rows nor the packed buffer are byte aligned
    for bits in [1u32, 2, 4, 8] {
        let depth = BitDepth::from_bits(bits).unwrap();
        let max = depth.max_colors();
        let values: Vec<u8> = noise(13 * 5).iter().map(|&v| (usize::from(v) % max) as u8).collect();
        let palette: Vec<Rgb> = (0..max).map(|i| Rgb::new(i as u8, 255 - i as u8, 7)).collect();
        let raster = RasterImage::from_values(13, 5, depth, &values, Some(palette)).unwrap();

        let encoded = EncodeRequest::bmp().encode_raster(&raster, Unstoppable).unwrap();
        assert_eq!(&encoded[0..2], b"BM");
        let decoded = decode_raster(&encoded);
        assert_eq!(decoded, raster, "{bits} bpp");
        assert_eq!(decoded.pixel_values().unwrap(), values);
    }
}

#[test]
fn bmp_true_color_roundtrip() {
    let pixels = checkerboard(3, 2);
    let image = GenericImage::rgb(3, 2, pixels.clone()).unwrap();
    let encoded = EncodeRequest::bmp().encode_generic(&image, Unstoppable).unwrap();
    let raster = decode_raster(&encoded);
    assert_eq!(raster.depth(), BitDepth::TwentyFour);
    assert_eq!(raster.palette(), None);
    let back = bridge::to_generic(&raster).unwrap();
    assert_eq!(back.to_rgb().buf(), &pixels);
}

#[test]
fn bmp_mono_encodes_at_one_bit() {
    let image = GenericImage::mono(9, 2, (0..18).map(|i| (i % 2) as u8).collect()).unwrap();
    let encoded = EncodeRequest::bmp().encode_generic(&image, Unstoppable).unwrap();
    let raster = decode_raster(&encoded);
    assert_eq!(raster.depth(), BitDepth::One);
    assert_eq!(raster.pixels().len(), 3);
    assert_eq!(
        raster.palette().unwrap(),
        &[Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]
    );
}

#[test]
fn bmp_indexed_keeps_short_palette() {
    let palette = vec![Rgb::new(1, 1, 1), Rgb::new(2, 2, 2), Rgb::new(3, 3, 3)];
    let image = GenericImage::indexed(2, 2, vec![0, 1, 2, 1], palette.clone()).unwrap();
    let encoded = EncodeRequest::bmp().encode_generic(&image, Unstoppable).unwrap();
    let raster = decode_raster(&encoded);
    assert_eq!(raster.depth(), BitDepth::Eight);
    assert_eq!(raster.palette().unwrap(), &palette[..]);
    assert_eq!(raster.pixels(), &[0, 1, 2, 1]);
}

#[test]
fn bmp_rgba_decodes_generic() {
    let px = vec![Rgba::new(255, 0, 0, 255), Rgba::new(0, 0, 255, 0)];
    let image = GenericImage::rgba(2, 1, px.clone()).unwrap();
    let encoded = EncodeRequest::bmp().encode_generic(&image, Unstoppable).unwrap();
    let GenericImage::Rgba(out) = decode_generic(&encoded) else {
        panic!("expected RGBA");
    };
    assert_eq!(out.buf(), &px);
}

// ── PNM and farbfeld ─────────────────────────────────────────────────

#[cfg(feature = "pnm")]
#[test]
fn ppm_roundtrip() {
    let pixels = checkerboard(4, 3);
    let image = GenericImage::rgb(4, 3, pixels.clone()).unwrap();
    let encoded = EncodeRequest::pnm().encode_generic(&image, Unstoppable).unwrap();
    assert!(encoded.starts_with(b"P6"));
    let decoded = decode_generic(&encoded);
    assert_eq!(decoded.mode(), ColorMode::Rgb);
    assert_eq!(decoded.to_rgb().buf(), &pixels);
}

#[cfg(feature = "pnm")]
#[test]
fn pgm_noise_roundtrip() {
    let pixels = noise(16 * 12);
    let image = GenericImage::gray(16, 12, pixels.clone()).unwrap();
    let encoded = EncodeRequest::pnm().encode_generic(&image, Unstoppable).unwrap();
    assert_eq!(decode_generic(&encoded).raw_bytes(), pixels);
}

#[cfg(feature = "pnm")]
#[test]
fn raster_to_pnm_expands_palette() {
    let raster = RasterImage::from_values(
        2,
        1,
        BitDepth::Two,
        &[3, 0],
        Some(vec![Rgb::new(0, 0, 0), Rgb::new(1, 1, 1), Rgb::new(2, 2, 2), Rgb::new(9, 9, 9)]),
    )
    .unwrap();
    let encoded = EncodeRequest::pnm().encode_raster(&raster, Unstoppable).unwrap();
    assert_eq!(decode_generic(&encoded).raw_bytes(), vec![9, 9, 9, 0, 0, 0]);
}

#[cfg(feature = "farbfeld")]
#[test]
fn farbfeld_roundtrip() {
    let bytes = noise(5 * 7 * 4);
    let image = GenericImage::from_raw(ColorMode::Rgba, 5, 7, &bytes, None).unwrap();
    let encoded = EncodeRequest::farbfeld().encode_generic(&image, Unstoppable).unwrap();
    assert!(encoded.starts_with(b"farbfeld"));
    assert_eq!(decode_generic(&encoded).raw_bytes(), bytes);
}

// ── Detection and limits ─────────────────────────────────────────────

#[cfg(all(feature = "pnm", feature = "farbfeld"))]
#[test]
fn every_encoder_output_is_detected() {
    let image = GenericImage::rgb(2, 2, checkerboard(2, 2)).unwrap();
    for (request, format) in [
        (EncodeRequest::bmp(), SourceFormat::Bmp),
        (EncodeRequest::pnm(), SourceFormat::Pnm),
        (EncodeRequest::farbfeld(), SourceFormat::Farbfeld),
    ] {
        let encoded = request.encode_generic(&image, Unstoppable).unwrap();
        assert_eq!(SourceFormat::detect(&encoded), Some(format));
        assert_eq!(request.format(), format);
    }
}

#[cfg(feature = "pnm")]
#[test]
fn limit_violation_stops_probing() {
    let image = GenericImage::gray(64, 64, vec![0; 64 * 64]).unwrap();
    let encoded = EncodeRequest::pnm().encode_generic(&image, Unstoppable).unwrap();
    let limits = Limits {
        max_pixels: Some(100),
        ..Default::default()
    };
    let err = DecodeRequest::new(&encoded)
        .with_limits(&limits)
        .decode(Unstoppable)
        .unwrap_err();
    assert!(matches!(err, SlotError::LimitExceeded(_)), "{err}");
}

#[test]
fn cancelled_decode_reports_cancellation() {
    struct Cancelled;
    impl Stop for Cancelled {
        fn check(&self) -> Result<(), enough::StopReason> {
            Err(enough::StopReason::Cancelled)
        }
    }
    let image = GenericImage::gray(4, 4, vec![9; 16]).unwrap();
    let encoded = EncodeRequest::bmp().encode_generic(&image, Unstoppable).unwrap();
    let err = DecodeRequest::new(&encoded).decode(Cancelled).unwrap_err();
    assert!(matches!(err, SlotError::Cancelled(_)), "{err}");
}
