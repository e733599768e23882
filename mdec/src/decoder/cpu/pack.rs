//! Output word packing

use crate::types::DataOutputDepth;

/// Serialize a decoded macroblock into 32-bit output words.
///
/// `pixels` holds packed `R | G << 8 | B << 16` pixels for colour depths, or
/// one intensity byte per entry (in its first 64 entries) for monochrome
/// depths. Each finished word is handed to `emit` in output order.
pub fn pack_macroblock(
    depth: DataOutputDepth,
    bit15: bool,
    pixels: &[u32; 256],
    mut emit: impl FnMut(u32),
) {
    match depth {
        DataOutputDepth::FourBit => {
            for samples in pixels[..64].chunks_exact(8) {
                let word = samples
                    .iter()
                    .enumerate()
                    .fold(0, |word, (i, &s)| word | (((s & 0xFF) >> 4) << (i * 4)));
                emit(word);
            }
        }
        DataOutputDepth::EightBit => {
            for samples in pixels[..64].chunks_exact(4) {
                let word = samples
                    .iter()
                    .enumerate()
                    .fold(0, |word, (i, &s)| word | ((s & 0xFF) << (i * 8)));
                emit(word);
            }
        }
        DataOutputDepth::TwentyFourBit => {
            let mut bytes = [0u8; 256 * 3];
            for (rgb, &pixel) in bytes.chunks_exact_mut(3).zip(pixels.iter()) {
                rgb.copy_from_slice(&pixel.to_le_bytes()[..3]);
            }

            for word in bytes.chunks_exact(4) {
                emit(u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
            }
        }
        DataOutputDepth::FifteenBit => {
            let alpha = u32::from(bit15) << 15;
            let to_15 = |pixel: u32| {
                let r = (pixel >> 3) & 0x1F;
                let g = (pixel >> 11) & 0x1F;
                let b = (pixel >> 19) & 0x1F;
                r | (g << 5) | (b << 10) | alpha
            };

            for pair in pixels.chunks_exact(2) {
                emit(to_15(pair[0]) | (to_15(pair[1]) << 16));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::decoder::cpu::pack::pack_macroblock;
    use crate::types::DataOutputDepth;

    fn pack(depth: DataOutputDepth, bit15: bool, pixels: &[u32; 256]) -> Vec<u32> {
        let mut words = Vec::new();
        pack_macroblock(depth, bit15, pixels, |w| words.push(w));
        words
    }

    #[test]
    fn word_counts_per_depth() {
        let pixels = [0u32; 256];
        assert_eq!(pack(DataOutputDepth::FourBit, false, &pixels).len(), 8);
        assert_eq!(pack(DataOutputDepth::EightBit, false, &pixels).len(), 16);
        assert_eq!(pack(DataOutputDepth::TwentyFourBit, false, &pixels).len(), 192);
        assert_eq!(pack(DataOutputDepth::FifteenBit, false, &pixels).len(), 128);
    }

    #[test]
    fn greyscale_first_sample_is_lowest() {
        let mut pixels = [0u32; 256];
        for (i, p) in pixels.iter_mut().take(8).enumerate() {
            *p = (i as u32) * 0x11;
        }

        let four = pack(DataOutputDepth::FourBit, false, &pixels);
        assert_eq!(four[0], 0x7654_3210);
        assert_eq!(four[1], 0);

        let eight = pack(DataOutputDepth::EightBit, false, &pixels);
        assert_eq!(eight[0], 0x3322_1100);
        assert_eq!(eight[1], 0x7766_5544);
    }

    #[test]
    fn truecolor_is_tightly_packed() {
        let mut pixels = [0u32; 256];
        pixels[0] = 0x00_33_22_11;
        pixels[1] = 0x00_66_55_44;
        pixels[2] = 0x00_99_88_77;
        pixels[3] = 0x00_CC_BB_AA;

        let words = pack(DataOutputDepth::TwentyFourBit, false, &pixels);
        assert_eq!(&words[..3], &[0x4433_2211, 0x8877_6655, 0xCCBB_AA99]);
    }

    #[test]
    fn highcolor_carries_bit15() {
        let mut pixels = [0u32; 256];
        pixels[0] = 0x00_FF_00_FF; // magenta
        pixels[1] = 0x00_00_FF_00; // green

        let words = pack(DataOutputDepth::FifteenBit, true, &pixels);
        assert_eq!(words[0], (0x83E0 << 16) | 0xFC1F);
        assert_eq!(words[1], 0x8000_8000);

        let words = pack(DataOutputDepth::FifteenBit, false, &pixels);
        assert_eq!(words[0], (0x03E0 << 16) | 0x7C1F);
    }
}
