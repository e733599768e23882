//! Macroblock reconstruction and the copy-out gate

use crate::decoder::block::BlockSet;
use crate::types::{OutputFormat, TickCount};
use bincode::{Decode, Encode};
use itertools::iproduct;
use mdec_rs_yuv::bt601::{y_to_mono, ycbcr_to_rgb};

/// Processing time charged per decoded 8x8 block.
pub const TICKS_PER_BLOCK: TickCount = 256;

/// The reconstructed pixels of one macroblock, 16 per row.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct PixelBuffer(pub [u32; 256]);

impl Default for PixelBuffer {
    fn default() -> Self {
        Self([0; 256])
    }
}

impl PixelBuffer {
    /// Reconstruct pixels from a fully transformed block set.
    ///
    /// Monochrome formats take intensities straight from slot 0. Colour
    /// formats combine the Cr and Cb slots with each luma quadrant.
    pub fn convert(&mut self, format: OutputFormat, blocks: &BlockSet) {
        if format.depth.is_monochrome() {
            y_to_mono(&blocks.0[0], format.signed, &mut self.0[..64]);
            return;
        }

        let [chroma_r, chroma_b, luma @ ..] = &blocks.0;
        for ((y, x), luma) in iproduct!([0, 8], [0, 8]).zip(luma.iter()) {
            ycbcr_to_rgb((x, y), chroma_r, chroma_b, luma, format.signed, &mut self.0);
        }
    }
}

/// The delay between a macroblock's conversion and its release to the
/// output FIFO.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct CopyOutTimer {
    /// Ticks left until release.
    pub ticks: TickCount,

    /// Whether a converted macroblock is waiting to be released.
    pub pending: bool,
}

impl CopyOutTimer {
    /// Start counting down to the release of a macroblock of `blocks` blocks.
    pub fn arm(&mut self, blocks: usize) -> TickCount {
        self.ticks = TICKS_PER_BLOCK * blocks as TickCount;
        self.pending = true;
        self.ticks
    }

    /// Let `ticks` pass, returning `true` once the macroblock is due.
    pub fn advance(&mut self, ticks: TickCount) -> bool {
        if !self.pending {
            return false;
        }

        self.ticks -= ticks;
        self.ticks <= 0
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    pub fn remaining(&self) -> Option<TickCount> {
        self.pending.then_some(self.ticks.max(0))
    }
}

#[cfg(test)]
mod tests {
    use crate::decoder::block::BlockSet;
    use crate::decoder::macroblock::{CopyOutTimer, PixelBuffer, TICKS_PER_BLOCK};
    use crate::types::{DataOutputDepth, OutputFormat};

    #[test]
    fn timer_releases_after_cost() {
        let mut timer = CopyOutTimer::default();
        assert!(!timer.advance(10_000));
        assert_eq!(timer.remaining(), None);

        assert_eq!(timer.arm(6), 6 * TICKS_PER_BLOCK);
        assert!(!timer.advance(6 * TICKS_PER_BLOCK - 1));
        assert_eq!(timer.remaining(), Some(1));
        assert!(timer.advance(1));

        timer.cancel();
        assert_eq!(timer, CopyOutTimer::default());
    }

    #[test]
    fn monochrome_uses_first_slot_only() {
        let mut blocks = BlockSet::default();
        blocks.0[0] = [12; 64];
        blocks.0[2] = [-100; 64];
        let mut pixels = PixelBuffer([0xFFFF_FFFF; 256]);

        let format = OutputFormat {
            depth: DataOutputDepth::EightBit,
            signed: false,
            bit15: false,
        };
        pixels.convert(format, &blocks);

        assert!(pixels.0[..64].iter().all(|&p| p == 140));
        assert!(pixels.0[64..].iter().all(|&p| p == 0xFFFF_FFFF));
    }

    #[test]
    fn colour_places_luma_quadrants() {
        let mut blocks = BlockSet::default();
        blocks.0[2] = [-40; 64];
        blocks.0[3] = [-20; 64];
        blocks.0[4] = [20; 64];
        blocks.0[5] = [40; 64];
        let mut pixels = PixelBuffer::default();

        let format = OutputFormat {
            depth: DataOutputDepth::TwentyFourBit,
            signed: true,
            bit15: false,
        };
        pixels.convert(format, &blocks);

        let grey = |v: i8| {
            let b = u32::from(v as u8);
            b | (b << 8) | (b << 16)
        };
        assert_eq!(pixels.0[0], grey(-40));
        assert_eq!(pixels.0[15], grey(-20));
        assert_eq!(pixels.0[8 * 16], grey(20));
        assert_eq!(pixels.0[255], grey(40));
    }
}
