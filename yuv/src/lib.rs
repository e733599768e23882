//! Colorspace conversion for MDEC macroblocks.
//!
//! The decoder produces signed 8x8 sample blocks; this crate turns them into
//! the packed 24-bit pixels the output stage serializes.

pub mod bt601;
