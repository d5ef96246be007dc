#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // PPM 2x2
    let ppm = b"P6\n2 2\n255\n\xff\x00\x00\x00\xff\x00\x00\x00\xff\x80\x80\x80";
    fs::write(format!("{dir}/ppm_2x2.ppm"), ppm).unwrap();

    // PGM 3x2
    let pgm = b"P5\n3 2\n255\n\x00\x40\x80\xc0\xff\x64";
    fs::write(format!("{dir}/pgm_3x2.pgm"), pgm).unwrap();

    // PAM RGBA 1x1
    let pam = b"P7\nWIDTH 1\nHEIGHT 1\nDEPTH 4\nMAXVAL 255\nTUPLTYPE RGB_ALPHA\nENDHDR\n\xff\x00\x00\xff";
    fs::write(format!("{dir}/pam_rgba_1x1.pam"), pam).unwrap();

    // Minimal BMP 1x1 24-bit
    let mut bmp = vec![0u8; 58]; // 54 header + 4 pixel (3 + 1 padding)
    bmp[0] = b'B'; bmp[1] = b'M';
    bmp[2..6].copy_from_slice(&58u32.to_le_bytes()); // file size
    bmp[10..14].copy_from_slice(&54u32.to_le_bytes()); // data offset
    bmp[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    bmp[18..22].copy_from_slice(&1i32.to_le_bytes()); // width
    bmp[22..26].copy_from_slice(&1i32.to_le_bytes()); // height
    bmp[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    bmp[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    bmp[54] = 0xff; bmp[55] = 0x00; bmp[56] = 0x00; // BGR
    fs::write(format!("{dir}/bmp_1x1.bmp"), &bmp).unwrap();

    // Same file at 1 bpp with a two-entry color table
    let mut mono = vec![0u8; 66]; // 54 header + 8 palette + 4 pixel row
    mono[..54].copy_from_slice(&bmp[..54]);
    mono[2..6].copy_from_slice(&66u32.to_le_bytes());
    mono[10..14].copy_from_slice(&62u32.to_le_bytes());
    mono[28..30].copy_from_slice(&1u16.to_le_bytes());
    mono[46..50].copy_from_slice(&2u32.to_le_bytes()); // colors used
    mono[58..61].copy_from_slice(&[0xff, 0xff, 0xff]);
    mono[62] = 0x80;
    fs::write(format!("{dir}/bmp_1bpp_1x1.bmp"), mono).unwrap();

    // PBM 10x1
    fs::write(format!("{dir}/pbm_10x1.pbm"), b"P4\n10 1\n\xaa\x40").unwrap();

    // farbfeld 1x1
    let mut ff = b"farbfeld".to_vec();
    ff.extend_from_slice(&1u32.to_be_bytes());
    ff.extend_from_slice(&1u32.to_be_bytes());
    ff.extend_from_slice(&[0xff, 0xff, 0, 0, 0, 0, 0xff, 0xff]);
    fs::write(format!("{dir}/farbfeld_1x1.ff"), ff).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_p6.bin"), b"P6").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    fs::write(format!("{dir}/p7_no_endhdr.bin"), b"P7\nWIDTH 1\nHEIGHT 1\n").unwrap();

    println!("Generated seed corpus in {dir}/");
}
