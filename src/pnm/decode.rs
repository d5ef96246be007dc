//! PNM header parsing and sample decoding.

use alloc::vec::Vec;

use enough::Stop;

use crate::error::SlotError;
use crate::generic::GenericImage;
use crate::pixel::{Rgb, Rgba};

/// Sample layout of a PNM/PAM body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Tuple {
    /// P4 bitmap, one bit per pixel, 1 = black, rows padded to a byte.
    PackedBits,
    /// PAM BLACKANDWHITE, one sample per pixel, 1 = white.
    BlackAndWhite,
    Gray,
    GrayAlpha,
    Rgb,
    RgbAlpha,
}

impl Tuple {
    fn channels(self) -> usize {
        match self {
            Self::PackedBits | Self::BlackAndWhite | Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::RgbAlpha => 4,
        }
    }
}

pub(crate) struct PnmHeader {
    pub width: u32,
    pub height: u32,
    pub maxval: u32,
    pub tuple: Tuple,
    pub data_offset: usize,
}

struct Tokens<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn skip_space_and_comments(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b == b'#' {
                while let Some(&c) = self.data.get(self.pos) {
                    self.pos += 1;
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                }
            } else if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn word(&mut self) -> Result<&'a [u8], SlotError> {
        self.skip_space_and_comments();
        let start = self.pos;
        while self
            .data
            .get(self.pos)
            .is_some_and(|b| !b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(SlotError::UnexpectedEof);
        }
        Ok(&self.data[start..self.pos])
    }

    fn number(&mut self) -> Result<u32, SlotError> {
        let word = self.word()?;
        parse_u32(word)
    }

    /// Consume the single whitespace byte separating the header from
    /// binary data.
    fn end_of_header(&mut self) -> Result<usize, SlotError> {
        match self.data.get(self.pos) {
            Some(b) if b.is_ascii_whitespace() => Ok(self.pos + 1),
            Some(_) => Err(SlotError::InvalidHeader(
                "missing whitespace after PNM header".into(),
            )),
            None => Err(SlotError::UnexpectedEof),
        }
    }

    /// Rest of the current line, trimmed.
    fn line(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self.data.get(self.pos).is_some_and(|&b| b != b'\n') {
            self.pos += 1;
        }
        self.data[start..self.pos].trim_ascii()
    }
}

fn parse_u32(word: &[u8]) -> Result<u32, SlotError> {
    core::str::from_utf8(word)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            SlotError::InvalidHeader(alloc::format!(
                "expected a number, found {:?}",
                alloc::string::String::from_utf8_lossy(word)
            ))
        })
}

/// Parse a P4, P5, P6 or P7 header.
pub(crate) fn parse_header(data: &[u8]) -> Result<PnmHeader, SlotError> {
    let magic = data.get(..2).ok_or(SlotError::UnexpectedEof)?;
    let mut tokens = Tokens { data, pos: 2 };
    let header = match magic {
        b"P4" => {
            let width = tokens.number()?;
            let height = tokens.number()?;
            PnmHeader {
                width,
                height,
                maxval: 1,
                tuple: Tuple::PackedBits,
                data_offset: tokens.end_of_header()?,
            }
        }
        b"P5" | b"P6" => {
            let width = tokens.number()?;
            let height = tokens.number()?;
            let maxval = tokens.number()?;
            PnmHeader {
                width,
                height,
                maxval,
                tuple: if magic == b"P5" { Tuple::Gray } else { Tuple::Rgb },
                data_offset: tokens.end_of_header()?,
            }
        }
        b"P7" => parse_pam(&mut tokens)?,
        [b'P', b'1' | b'2' | b'3', ..] => {
            return Err(SlotError::UnsupportedVariant(
                "ASCII PNM formats are not supported".into(),
            ));
        }
        _ => return Err(SlotError::UnrecognizedFormat),
    };

    if header.width == 0 || header.height == 0 {
        return Err(SlotError::InvalidDimensions {
            width: header.width,
            height: header.height,
        });
    }
    if header.maxval == 0 || header.maxval > 65535 {
        return Err(SlotError::InvalidHeader(alloc::format!(
            "maxval {} out of range 1..=65535",
            header.maxval
        )));
    }
    Ok(header)
}

fn parse_pam(tokens: &mut Tokens<'_>) -> Result<PnmHeader, SlotError> {
    let (mut width, mut height, mut depth, mut maxval) = (None, None, None, None);
    let mut tupltype: Option<&[u8]> = None;
    loop {
        match tokens.word()? {
            b"WIDTH" => width = Some(tokens.number()?),
            b"HEIGHT" => height = Some(tokens.number()?),
            b"DEPTH" => depth = Some(tokens.number()?),
            b"MAXVAL" => maxval = Some(tokens.number()?),
            b"TUPLTYPE" => tupltype = Some(tokens.line()),
            b"ENDHDR" => break,
            other => {
                return Err(SlotError::InvalidHeader(alloc::format!(
                    "unknown PAM header field {:?}",
                    alloc::string::String::from_utf8_lossy(other)
                )));
            }
        }
    }
    let data_offset = tokens.end_of_header()?;
    let missing = |field: &str| SlotError::InvalidHeader(alloc::format!("PAM header lacks {field}"));
    let depth = depth.ok_or_else(|| missing("DEPTH"))?;
    let maxval = maxval.ok_or_else(|| missing("MAXVAL"))?;

    let tuple = match (tupltype, depth) {
        (Some(b"BLACKANDWHITE"), 1) => Tuple::BlackAndWhite,
        (Some(b"GRAYSCALE"), 1) | (None, 1) => Tuple::Gray,
        (Some(b"GRAYSCALE_ALPHA" | b"BLACKANDWHITE_ALPHA"), 2) | (None, 2) => Tuple::GrayAlpha,
        (Some(b"RGB"), 3) | (None, 3) => Tuple::Rgb,
        (Some(b"RGB_ALPHA"), 4) | (None, 4) => Tuple::RgbAlpha,
        (t, d) => {
            return Err(SlotError::UnsupportedVariant(alloc::format!(
                "PAM tuple type {:?} with depth {d}",
                t.map(alloc::string::String::from_utf8_lossy)
            )));
        }
    };
    Ok(PnmHeader {
        width: width.ok_or_else(|| missing("WIDTH"))?,
        height: height.ok_or_else(|| missing("HEIGHT"))?,
        maxval,
        tuple,
        data_offset,
    })
}

/// Decode the body described by `header` into a generic image.
pub(crate) fn decode_body(
    data: &[u8],
    header: &PnmHeader,
    stop: &dyn Stop,
) -> Result<GenericImage, SlotError> {
    let (width, height) = (header.width, header.height);
    let w = width as usize;
    let h = height as usize;
    let body = data.get(header.data_offset..).ok_or(SlotError::UnexpectedEof)?;

    if header.tuple == Tuple::PackedBits {
        let row_bytes = w.div_ceil(8);
        let needed = row_bytes
            .checked_mul(h)
            .ok_or(SlotError::DimensionsTooLarge { width, height })?;
        let body = body.get(..needed).ok_or(SlotError::UnexpectedEof)?;
        let mut pixels = Vec::with_capacity(w * h);
        for (y, row) in body.chunks_exact(row_bytes).enumerate() {
            if y % 16 == 0 {
                stop.check()?;
            }
            // PBM stores 1 for black
            pixels.extend((0..w).map(|x| u8::from(row[x / 8] & (0x80 >> (x % 8)) == 0)));
        }
        return GenericImage::mono(width, height, pixels);
    }

    let channels = header.tuple.channels();
    let wide = header.maxval > 255;
    let sample_bytes = if wide { 2 } else { 1 };
    let row_bytes = w
        .checked_mul(channels * sample_bytes)
        .ok_or(SlotError::DimensionsTooLarge { width, height })?;
    let needed = row_bytes
        .checked_mul(h)
        .ok_or(SlotError::DimensionsTooLarge { width, height })?;
    let body = body.get(..needed).ok_or(SlotError::UnexpectedEof)?;

    let maxval = header.maxval;
    let mut samples = Vec::with_capacity(w * h * channels);
    for (y, row) in body.chunks_exact(row_bytes).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        if wide {
            samples.extend(
                row.chunks_exact(2)
                    .map(|s| scale(u32::from(u16::from_be_bytes([s[0], s[1]])), maxval)),
            );
        } else if maxval == 255 {
            samples.extend_from_slice(row);
        } else {
            samples.extend(row.iter().map(|&s| scale(u32::from(s), maxval)));
        }
    }

    match header.tuple {
        Tuple::BlackAndWhite | Tuple::PackedBits => GenericImage::mono(width, height, samples),
        Tuple::Gray => GenericImage::gray(width, height, samples),
        Tuple::GrayAlpha => GenericImage::rgba(
            width,
            height,
            samples
                .chunks_exact(2)
                .map(|s| Rgba::new(s[0], s[0], s[0], s[1]))
                .collect(),
        ),
        Tuple::Rgb => GenericImage::rgb(
            width,
            height,
            samples
                .chunks_exact(3)
                .map(|s| Rgb::new(s[0], s[1], s[2]))
                .collect(),
        ),
        Tuple::RgbAlpha => GenericImage::rgba(
            width,
            height,
            samples
                .chunks_exact(4)
                .map(|s| Rgba::new(s[0], s[1], s[2], s[3]))
                .collect(),
        ),
    }
}

/// Rescale a sample in `0..=maxval` to `0..=255`, rounding. Values above
/// maxval saturate.
#[inline]
fn scale(v: u32, maxval: u32) -> u8 {
    ((v.min(maxval) * 255 + maxval / 2) / maxval) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_comments_are_skipped() {
        let data = b"P5\n# made by hand\n3 # width\n2\n255\nabcdef";
        let h = parse_header(data).unwrap();
        assert_eq!((h.width, h.height, h.maxval), (3, 2, 255));
        assert_eq!(h.tuple, Tuple::Gray);
        assert_eq!(h.data_offset, data.len() - 6);
    }

    #[test]
    fn pam_without_tupltype_infers_from_depth() {
        let h = parse_header(b"P7\nWIDTH 1\nHEIGHT 1\nDEPTH 4\nMAXVAL 255\nENDHDR\n").unwrap();
        assert_eq!(h.tuple, Tuple::RgbAlpha);
    }

    #[test]
    fn pam_depth_mismatch_is_rejected() {
        let err = parse_header(b"P7\nWIDTH 1\nHEIGHT 1\nDEPTH 2\nMAXVAL 255\nTUPLTYPE RGB\nENDHDR\n");
        assert!(matches!(err, Err(SlotError::UnsupportedVariant(_))));
    }

    #[test]
    fn ascii_variants_are_unsupported() {
        assert!(matches!(
            parse_header(b"P3\n1 1\n255\n0 0 0\n"),
            Err(SlotError::UnsupportedVariant(_))
        ));
    }

    #[test]
    fn scale_rounds_and_saturates() {
        assert_eq!(scale(0, 1), 0);
        assert_eq!(scale(1, 1), 255);
        assert_eq!(scale(32768, 65535), 128);
        assert_eq!(scale(65535, 65535), 255);
        assert_eq!(scale(20, 15), 255);
    }
}
