#![no_main]
use libfuzzer_sys::fuzz_target;
use zenslot::*;

fuzz_target!(|data: &[u8]| {
    // A decoded BMP raster must survive re-encoding bit for bit
    let Ok(SourceImage::Raster(raster)) = DecodeRequest::new(data)
        .with_format(SourceFormat::Bmp)
        .decode(enough::Unstoppable)
    else {
        return;
    };

    let encoded = EncodeRequest::bmp()
        .encode_raster(&raster, enough::Unstoppable)
        .expect("decoded raster must re-encode");
    let Ok(SourceImage::Raster(again)) = DecodeRequest::new(&encoded).decode(enough::Unstoppable)
    else {
        panic!("re-encoded raster failed to decode");
    };

    assert_eq!(raster, again, "roundtrip raster mismatch");
});
