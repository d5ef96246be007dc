//! PNM family: P4 (PBM), P5 (PGM), P6 (PPM), P7 (PAM). Binary variants
//! only, with maxval up to 65535 rescaled to 8 bits.

mod decode;
mod encode;

use alloc::vec::Vec;
use enough::Stop;

use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::limits::Limits;

/// Decode PNM data (called from DecodeRequest).
pub(crate) fn decode(
    data: &[u8],
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<GenericImage, SlotError> {
    let header = decode::parse_header(data)?;
    if let Some(limits) = limits {
        limits.check_image(header.width, header.height)?;
    }
    stop.check()?;
    decode::decode_body(data, &header, stop)
}

/// Encode to PNM (called from EncodeRequest).
pub(crate) fn encode(image: &GenericImage, stop: &dyn Stop) -> Result<Vec<u8>, SlotError> {
    encode::encode_pnm(image, stop)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::{ColorMode, Rgb, Rgba};
    use alloc::vec;
    use enough::Unstoppable;

    fn roundtrip(image: &GenericImage) -> GenericImage {
        let bytes = encode(image, &Unstoppable).unwrap();
        decode(&bytes, None, &Unstoppable).unwrap()
    }

    #[test]
    fn mono_uses_pbm() {
        let image = GenericImage::mono(10, 2, (0..20).map(|i| (i % 3 == 0) as u8).collect()).unwrap();
        let bytes = encode(&image, &Unstoppable).unwrap();
        assert!(bytes.starts_with(b"P4\n10 2\n"));
        // two bytes per row
        assert_eq!(bytes.len(), 8 + 4);
        let out = roundtrip(&image);
        assert_eq!(out.mode(), ColorMode::Mono);
        assert_eq!(out.raw_bytes(), image.raw_bytes());
    }

    #[test]
    fn pbm_one_bits_are_black() {
        let GenericImage::Mono(px) = decode(b"P4\n3 1\n\xa0", None, &Unstoppable).unwrap() else {
            panic!("expected mono");
        };
        assert_eq!(px.buf(), &[0, 1, 0]);
    }

    #[test]
    fn gray_and_rgba_roundtrip() {
        let gray = GenericImage::gray(2, 1, vec![7, 200]).unwrap();
        assert_eq!(roundtrip(&gray).raw_bytes(), vec![7, 200]);

        let rgba = GenericImage::rgba(1, 1, vec![Rgba::new(1, 2, 3, 4)]).unwrap();
        let out = roundtrip(&rgba);
        assert_eq!(out.mode(), ColorMode::Rgba);
        assert_eq!(out.raw_bytes(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn indexed_is_written_as_ppm() {
        let image = GenericImage::indexed(2, 1, vec![1, 0], vec![Rgb::new(9, 8, 7), Rgb::new(1, 2, 3)])
            .unwrap();
        let out = roundtrip(&image);
        assert_eq!(out.mode(), ColorMode::Rgb);
        assert_eq!(out.raw_bytes(), vec![1, 2, 3, 9, 8, 7]);
    }

    #[test]
    fn sixteen_bit_samples_are_scaled() {
        let mut data = b"P5\n2 1\n65535\n".to_vec();
        data.extend_from_slice(&[0xFF, 0xFF, 0x00, 0x00]);
        let out = decode(&data, None, &Unstoppable).unwrap();
        assert_eq!(out.raw_bytes(), vec![255, 0]);
    }

    #[test]
    fn gray_alpha_pam_expands_to_rgba() {
        let mut data =
            b"P7\nWIDTH 1\nHEIGHT 1\nDEPTH 2\nMAXVAL 255\nTUPLTYPE GRAYSCALE_ALPHA\nENDHDR\n".to_vec();
        data.extend_from_slice(&[50, 60]);
        let out = decode(&data, None, &Unstoppable).unwrap();
        assert_eq!(out.raw_bytes(), vec![50, 50, 50, 60]);
    }

    #[test]
    fn short_body_is_eof() {
        assert!(matches!(
            decode(b"P6\n2 2\n255\n\x00\x00\x00", None, &Unstoppable),
            Err(SlotError::UnexpectedEof)
        ));
    }
}
