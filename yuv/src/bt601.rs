//! YCbCr-to-RGB decode

/// 1.402 in 4.12 fixed point.
const CR_TO_R: i32 = 0x166E;

/// -0.3437 in 4.12 fixed point.
const CB_TO_G: i32 = -0x57F;

/// -0.7143 in 4.12 fixed point.
const CR_TO_G: i32 = -0xB6D;

/// 1.772 in 4.12 fixed point.
const CB_TO_B: i32 = 0x1C5A;

const FRACTION_BITS: i32 = 12;

/// Saturate a reconstructed sample to the device's native signed range.
#[inline]
fn saturate(v: i32) -> i32 {
    v.clamp(-128, 127)
}

/// Turn a saturated sample into the byte the output stage sees.
///
/// Unsigned output is offset-binary, which for a value already in
/// `-128..=127` is the same as flipping the top bit.
#[inline]
fn to_output_byte(v: i32, signed: bool) -> u8 {
    let byte = v as i8 as u8;
    if signed {
        byte
    } else {
        byte ^ 0x80
    }
}

/// Pack three output bytes as `R | G << 8 | B << 16`.
#[inline]
pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    u32::from(r) | (u32::from(g) << 8) | (u32::from(b) << 16)
}

mod scalar_impl {
    use super::*;

    /// Convert one pixel, yielding saturated signed components.
    #[inline]
    pub fn convert_pixel(y: i32, cb: i32, cr: i32) -> (i32, i32, i32) {
        let r = (cr * CR_TO_R) >> FRACTION_BITS;
        let g = (cb * CB_TO_G + cr * CR_TO_G) >> FRACTION_BITS;
        let b = (cb * CB_TO_B) >> FRACTION_BITS;

        (saturate(y + r), saturate(y + g), saturate(y + b))
    }
}

mod simd_impl {
    use super::*;
    use std::ops::Shr;
    use wide::i32x8;

    /// Same as `scalar_impl::convert_pixel`, but converts a row of 8 pixels
    /// in parallel.
    #[inline]
    pub fn convert_row(y: [i32; 8], cb: [i32; 8], cr: [i32; 8]) -> [[i32; 8]; 3] {
        let y = i32x8::from(y);
        let cb = i32x8::from(cb);
        let cr = i32x8::from(cr);

        let r = (cr * i32x8::splat(CR_TO_R)).shr(FRACTION_BITS);
        let g = (cb * i32x8::splat(CB_TO_G) + cr * i32x8::splat(CR_TO_G)).shr(FRACTION_BITS);
        let b = (cb * i32x8::splat(CB_TO_B)).shr(FRACTION_BITS);

        let lo = i32x8::splat(-128);
        let hi = i32x8::splat(127);

        [
            (y + r).max(lo).min(hi).to_array(),
            (y + g).max(lo).min(hi).to_array(),
            (y + b).max(lo).min(hi).to_array(),
        ]
    }
}

pub use scalar_impl::convert_pixel;
use simd_impl::convert_row;

/// Convert one luma block and the shared chroma blocks into RGB pixels.
///
/// The 16x16 macroblock is covered by four 8x8 luma blocks; `origin` is the
/// `(x, y)` pixel offset of the quadrant `luma` covers. `chroma_r` and
/// `chroma_b` cover the whole macroblock at half resolution and are sampled
/// accordingly. Converted pixels are written into `rgb` (row-major, 16
/// pixels per row) as packed `R | G << 8 | B << 16`.
pub fn ycbcr_to_rgb(
    origin: (usize, usize),
    chroma_r: &[i16; 64],
    chroma_b: &[i16; 64],
    luma: &[i16; 64],
    signed: bool,
    rgb: &mut [u32; 256],
) {
    let (xx, yy) = origin;

    for row in 0..8 {
        let chroma_row = ((row + yy) / 2) * 8;

        let y: [i32; 8] = std::array::from_fn(|x| i32::from(luma[x + row * 8]));
        let cb: [i32; 8] = std::array::from_fn(|x| i32::from(chroma_b[(x + xx) / 2 + chroma_row]));
        let cr: [i32; 8] = std::array::from_fn(|x| i32::from(chroma_r[(x + xx) / 2 + chroma_row]));

        let [r, g, b] = convert_row(y, cb, cr);

        for x in 0..8 {
            rgb[(x + xx) + (row + yy) * 16] = pack_rgb(
                to_output_byte(r[x], signed),
                to_output_byte(g[x], signed),
                to_output_byte(b[x], signed),
            );
        }
    }
}

/// Convert a luma block directly into greyscale intensities.
///
/// Only the first 64 entries of `mono` are written.
pub fn y_to_mono(luma: &[i16; 64], signed: bool, mono: &mut [u32]) {
    for (out, &y) in mono.iter_mut().zip(luma.iter()) {
        *out = u32::from(to_output_byte(saturate(i32::from(y)), signed));
    }
}
