//! Decoder primitives implemented on the CPU

mod idct;
mod pack;
mod rle;

pub use idct::idct_block;
pub use pack::pack_macroblock;
pub use rle::{dequantize_ac, dequantize_dc, sign_extend_10, ZIGZAG_SCAN};
