//! PNM encoder: P4 for mono, P5 for gray, P6 for indexed and RGB, P7
//! RGB_ALPHA for RGBA.

use alloc::format;
use alloc::vec::Vec;

use enough::Stop;
use rgb::ComponentBytes as _;

use crate::error::SlotError;
use crate::generic::GenericImage;

/// Encode an image in the PNM variant that matches its color model.
pub(crate) fn encode_pnm(image: &GenericImage, stop: &dyn Stop) -> Result<Vec<u8>, SlotError> {
    let (width, height) = (image.width(), image.height());
    stop.check()?;

    match image {
        GenericImage::Mono(px) => encode_pbm(px.buf(), width, height, stop),
        GenericImage::Gray(px) => {
            let header = format!("P5\n{width} {height}\n255\n");
            Ok(with_header(&header, px.buf()))
        }
        GenericImage::Indexed { .. } | GenericImage::Rgb(_) => {
            let header = format!("P6\n{width} {height}\n255\n");
            Ok(with_header(&header, image.to_rgb().buf().as_bytes()))
        }
        GenericImage::Rgba(px) => {
            let header = format!(
                "P7\nWIDTH {width}\nHEIGHT {height}\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n"
            );
            Ok(with_header(&header, px.buf().as_bytes()))
        }
    }
}

fn with_header(header: &str, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(header.len() + body.len());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(body);
    out
}

/// P4: rows packed MSB first and padded to a byte, 1 = black.
fn encode_pbm(pixels: &[u8], width: u32, height: u32, stop: &dyn Stop) -> Result<Vec<u8>, SlotError> {
    let w = width as usize;
    let row_bytes = w.div_ceil(8);
    let header = format!("P4\n{width} {height}\n");
    let mut out = Vec::with_capacity(header.len() + row_bytes * height as usize);
    out.extend_from_slice(header.as_bytes());
    for (y, row) in pixels.chunks_exact(w).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        for group in row.chunks(8) {
            let byte = group
                .iter()
                .enumerate()
                .filter(|&(_, &v)| v == 0)
                .fold(0u8, |acc, (i, _)| acc | (0x80 >> i));
            out.push(byte);
        }
    }
    Ok(out)
}
