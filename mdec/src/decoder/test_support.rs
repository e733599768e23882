//! Fixtures shared by the decoder's tests

use crate::decoder::state::Mdec;
use crate::decoder::types::DecoderOption;
use crate::traits::{DmaChannel, DmaController, Platform};
use crate::types::{DataOutputDepth, TickCount};
use std::cell::RefCell;
use std::rc::Rc;

const STANDARD_SCALE_TABLE_BITS: [u16; 64] = [
    0x5A82, 0x5A82, 0x5A82, 0x5A82, 0x5A82, 0x5A82, 0x5A82, 0x5A82, //
    0x7D8A, 0x6A6D, 0x471C, 0x18F8, 0xE707, 0xB8E3, 0x9592, 0x8275, //
    0x7641, 0x30FB, 0xCF04, 0x89BE, 0x89BE, 0xCF04, 0x30FB, 0x7641, //
    0x6A6D, 0xE707, 0x8275, 0xB8E3, 0x471C, 0x7D8A, 0x18F8, 0x9592, //
    0x5A82, 0xA57D, 0xA57D, 0x5A82, 0x5A82, 0xA57D, 0xA57D, 0x5A82, //
    0x471C, 0x8275, 0x18F8, 0x6A6D, 0x9592, 0xE707, 0x7D8A, 0xB8E3, //
    0x30FB, 0x89BE, 0x7641, 0xCF04, 0xCF04, 0x7641, 0x89BE, 0x30FB, //
    0x18F8, 0xB8E3, 0x6A6D, 0x8275, 0x7D8A, 0x9592, 0x471C, 0xE707, //
];

/// The 8x8 DCT basis in 1.15 fixed point, as system software uploads it.
pub const STANDARD_SCALE_TABLE: [i16; 64] = {
    let mut table = [0i16; 64];
    let mut i = 0;
    while i < 64 {
        table[i] = STANDARD_SCALE_TABLE_BITS[i] as i16;
        i += 1;
    }
    table
};

/// A scheduler that records every downcount it is asked for.
#[derive(Clone, Default)]
pub struct RecordingPlatform(Rc<RefCell<Vec<TickCount>>>);

impl RecordingPlatform {
    pub fn downcounts(&self) -> Vec<TickCount> {
        self.0.borrow().clone()
    }
}

impl Platform for RecordingPlatform {
    fn set_downcount(&mut self, ticks: TickCount) {
        self.0.borrow_mut().push(ticks);
    }
}

/// A DMA controller that remembers the current level of both request lines.
#[derive(Clone, Default)]
pub struct RecordingDma(Rc<RefCell<(bool, bool)>>);

impl RecordingDma {
    pub fn requested(&self, channel: DmaChannel) -> bool {
        let lines = self.0.borrow();
        match channel {
            DmaChannel::MdecIn => lines.0,
            DmaChannel::MdecOut => lines.1,
        }
    }
}

impl DmaController for RecordingDma {
    fn set_request(&mut self, channel: DmaChannel, requested: bool) {
        let mut lines = self.0.borrow_mut();
        match channel {
            DmaChannel::MdecIn => lines.0 = requested,
            DmaChannel::MdecOut => lines.1 = requested,
        }
    }
}

pub fn device() -> (Mdec, RecordingPlatform, RecordingDma) {
    device_with(DecoderOption::empty())
}

pub fn device_with(options: DecoderOption) -> (Mdec, RecordingPlatform, RecordingDma) {
    let platform = RecordingPlatform::default();
    let dma = RecordingDma::default();
    let mdec = Mdec::builder()
        .platform(platform.clone())
        .dma_controller(dma.clone())
        .options(options)
        .build()
        .unwrap();

    (mdec, platform, dma)
}

/// A decode command header for `words` parameter words.
pub fn decode_header(depth: DataOutputDepth, signed: bool, words: u16) -> u32 {
    (1 << 29) | (depth.bits() << 27) | (u32::from(signed) << 26) | u32::from(words)
}

/// One quantization table's worth of parameter words, entry `i` being `f(i)`.
pub fn quant_table_words(f: impl Fn(usize) -> u8) -> [u32; 16] {
    std::array::from_fn(|i| {
        let base = i * 4;
        u32::from_le_bytes([f(base), f(base + 1), f(base + 2), f(base + 3)])
    })
}

/// A command loading `value` into every entry of both quantization tables.
pub fn flat_quant_table(value: u8) -> Vec<u32> {
    let mut words = vec![0x4000_0001];
    words.extend(quant_table_words(|_| value));
    words.extend(quant_table_words(|_| value));
    words
}

pub fn load_scale_table(mdec: &mut Mdec, table: &[i16; 64]) {
    let mut words = vec![0x6000_0000];
    words.extend(
        table
            .chunks_exact(2)
            .map(|pair| u32::from(pair[0] as u16) | (u32::from(pair[1] as u16) << 16)),
    );
    mdec.dma_write(&words);
}
