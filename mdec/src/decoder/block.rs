//! Block decoding

use crate::decoder::cpu::{dequantize_ac, dequantize_dc, sign_extend_10, ZIGZAG_SCAN};
use bincode::{Decode, Encode};

/// Padding before a block's first token; as a run it ends the block.
pub const END_OF_BLOCK: u16 = 0xFE00;

/// Number of coefficient block slots in a macroblock.
pub const NUM_BLOCKS: usize = 6;

/// Coefficient index meaning "the next token starts a new block".
const AWAITING_DC: u16 = 64;

/// What feeding a single token did to the block being decoded.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenOutcome {
    /// The token was padding ahead of a block and was ignored.
    Padding,

    /// The token was stored; the block needs more tokens.
    NeedMore,

    /// The token finished the block.
    BlockComplete,
}

/// The coefficient blocks of one macroblock.
///
/// For colour output slot 0 holds Cr, slot 1 holds Cb and slots 2 through 5
/// hold the four luma quadrants in raster order. Monochrome output only
/// uses slot 0.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct BlockSet(pub [[i16; 64]; NUM_BLOCKS]);

impl Default for BlockSet {
    fn default() -> Self {
        Self([[0; 64]; NUM_BLOCKS])
    }
}

/// Progress through the blocks of the macroblock being decoded.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct DecodeCursor {
    /// Slot of the block being decoded.
    pub block: u8,

    /// Scan index of the last coefficient written, or 64 between blocks.
    pub coefficient: u16,

    /// Quantization scale latched from the block's leading token.
    pub q_scale: u16,
}

impl Default for DecodeCursor {
    fn default() -> Self {
        Self {
            block: 0,
            coefficient: AWAITING_DC,
            q_scale: 0,
        }
    }
}

impl DecodeCursor {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_between_blocks(&self) -> bool {
        self.coefficient == AWAITING_DC
    }

    /// Feed one run-length token into `block`, dequantizing against `quant`.
    ///
    /// A block's leading token packs a 6-bit quantization scale above a
    /// 10-bit DC amplitude. Every later token packs a 6-bit run of zero
    /// coefficients to skip above the next 10-bit amplitude. The block ends
    /// once the scan position reaches the last coefficient, which the
    /// end-of-block token always forces.
    pub fn feed(&mut self, token: u16, block: &mut [i16; 64], quant: &[u8; 64]) -> TokenOutcome {
        let amplitude = sign_extend_10(token);

        if self.is_between_blocks() {
            if token == END_OF_BLOCK {
                return TokenOutcome::Padding;
            }

            block.fill(0);
            self.coefficient = 0;
            self.q_scale = (token >> 10) & 0x3F;
            block[0] = dequantize_dc(amplitude, quant[0], self.q_scale);

            return TokenOutcome::NeedMore;
        }

        self.coefficient += ((token >> 10) & 0x3F) + 1;
        let k = self.coefficient as usize;

        if k < 64 {
            let value = dequantize_ac(amplitude, quant[k], self.q_scale);

            // A zero scale stores coefficients in scan order, unzigzagged.
            if self.q_scale == 0 {
                block[k] = value;
            } else {
                block[ZIGZAG_SCAN[k]] = value;
            }
        }

        if k >= 63 {
            self.coefficient = AWAITING_DC;
            TokenOutcome::BlockComplete
        } else {
            TokenOutcome::NeedMore
        }
    }

    /// Move on to the next block slot of a macroblock made of `blocks`
    /// blocks, returning `true` if that wrapped around to a new macroblock.
    pub fn advance_block(&mut self, blocks: usize) -> bool {
        self.block += 1;

        if usize::from(self.block) >= blocks {
            self.block = 0;
            return true;
        }

        false
    }

    pub(crate) fn is_consistent(&self) -> bool {
        usize::from(self.block) < NUM_BLOCKS && self.coefficient <= AWAITING_DC
    }
}
