//! Register-level MDEC types

use bincode::{Decode, Encode};

/// A count of system clock ticks, as handed out by the platform scheduler.
pub type TickCount = i32;

/// Offset of the combined command/data register.
pub const DATA_REGISTER: u32 = 0;

/// Offset of the combined status/control register.
pub const STATUS_REGISTER: u32 = 4;

/// The pixel format decoded macroblocks are serialized in.
///
/// The two narrow depths decode a single luma block per macroblock; the two
/// wide ones decode full colour macroblocks.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum DataOutputDepth {
    /// 4-bit greyscale, eight samples per output word.
    #[default]
    FourBit = 0,

    /// 8-bit greyscale, four samples per output word.
    EightBit = 1,

    /// 24-bit RGB, tightly packed.
    TwentyFourBit = 2,

    /// 15-bit RGB with a caller-supplied bit 15, two pixels per word.
    FifteenBit = 3,
}

impl DataOutputDepth {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 3 {
            0 => Self::FourBit,
            1 => Self::EightBit,
            2 => Self::TwentyFourBit,
            _ => Self::FifteenBit,
        }
    }

    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn is_monochrome(self) -> bool {
        matches!(self, Self::FourBit | Self::EightBit)
    }

    /// How many 8x8 coefficient blocks make up one macroblock.
    pub fn blocks_per_macroblock(self) -> usize {
        if self.is_monochrome() {
            1
        } else {
            6
        }
    }
}

/// The operation selected by a command header.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum Command {
    /// No command; also what the reserved codes 4 through 7 decode as.
    #[default]
    None = 0,

    DecodeMacroblock = 1,

    SetQuantTable = 2,

    SetScaleTable = 3,
}

impl Command {
    pub fn from_bits(bits: u32) -> Self {
        match bits & 7 {
            1 => Self::DecodeMacroblock,
            2 => Self::SetQuantTable,
            3 => Self::SetScaleTable,
            _ => Self::None,
        }
    }
}

/// A command header written to the command/data register while idle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CommandWord(pub u32);

impl CommandWord {
    pub fn command(self) -> Command {
        Command::from_bits(self.0 >> 29)
    }

    pub fn data_output_depth(self) -> DataOutputDepth {
        DataOutputDepth::from_bits(self.0 >> 27)
    }

    pub fn data_output_signed(self) -> bool {
        self.0 & (1 << 26) != 0
    }

    pub fn data_output_bit15(self) -> bool {
        self.0 & (1 << 25) != 0
    }

    /// Number of 32-bit parameter words a decode command will consume.
    pub fn parameter_word_count(self) -> u16 {
        self.0 as u16
    }

    /// For `SetQuantTable`: whether the chroma table follows the luma one.
    pub fn loads_chroma_table(self) -> bool {
        self.0 & 1 != 0
    }
}

/// The output format latched from the most recent command header.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct OutputFormat {
    pub depth: DataOutputDepth,
    pub signed: bool,
    pub bit15: bool,
}

impl From<CommandWord> for OutputFormat {
    fn from(word: CommandWord) -> Self {
        Self {
            depth: word.data_output_depth(),
            signed: word.data_output_signed(),
            bit15: word.data_output_bit15(),
        }
    }
}

/// The status register, as read from offset 4.
///
/// This is never stored by the decoder; it is rebuilt from device state on
/// every read.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusRegister(pub u32);

impl StatusRegister {
    const DATA_OUT_FIFO_EMPTY: u32 = 1 << 31;
    const DATA_IN_FIFO_FULL: u32 = 1 << 30;
    const COMMAND_BUSY: u32 = 1 << 29;
    const DATA_IN_REQUEST: u32 = 1 << 28;
    const DATA_OUT_REQUEST: u32 = 1 << 27;
    const DEPTH_SHIFT: u32 = 25;
    const DATA_OUTPUT_SIGNED: u32 = 1 << 24;
    const DATA_OUTPUT_BIT15: u32 = 1 << 23;
    const CURRENT_BLOCK_SHIFT: u32 = 16;

    fn flag(self, mask: u32) -> bool {
        self.0 & mask != 0
    }

    fn with_flag(self, mask: u32, set: bool) -> Self {
        if set {
            Self(self.0 | mask)
        } else {
            Self(self.0 & !mask)
        }
    }

    pub fn data_out_fifo_empty(self) -> bool {
        self.flag(Self::DATA_OUT_FIFO_EMPTY)
    }

    pub fn with_data_out_fifo_empty(self, set: bool) -> Self {
        self.with_flag(Self::DATA_OUT_FIFO_EMPTY, set)
    }

    pub fn data_in_fifo_full(self) -> bool {
        self.flag(Self::DATA_IN_FIFO_FULL)
    }

    pub fn with_data_in_fifo_full(self, set: bool) -> Self {
        self.with_flag(Self::DATA_IN_FIFO_FULL, set)
    }

    pub fn command_busy(self) -> bool {
        self.flag(Self::COMMAND_BUSY)
    }

    pub fn with_command_busy(self, set: bool) -> Self {
        self.with_flag(Self::COMMAND_BUSY, set)
    }

    pub fn data_in_request(self) -> bool {
        self.flag(Self::DATA_IN_REQUEST)
    }

    pub fn with_data_in_request(self, set: bool) -> Self {
        self.with_flag(Self::DATA_IN_REQUEST, set)
    }

    pub fn data_out_request(self) -> bool {
        self.flag(Self::DATA_OUT_REQUEST)
    }

    pub fn with_data_out_request(self, set: bool) -> Self {
        self.with_flag(Self::DATA_OUT_REQUEST, set)
    }

    pub fn data_output_depth(self) -> DataOutputDepth {
        DataOutputDepth::from_bits(self.0 >> Self::DEPTH_SHIFT)
    }

    pub fn data_output_signed(self) -> bool {
        self.flag(Self::DATA_OUTPUT_SIGNED)
    }

    pub fn data_output_bit15(self) -> bool {
        self.flag(Self::DATA_OUTPUT_BIT15)
    }

    pub fn with_output_format(self, format: OutputFormat) -> Self {
        let cleared = Self(self.0 & !(3 << Self::DEPTH_SHIFT))
            .with_flag(Self::DATA_OUTPUT_SIGNED, format.signed)
            .with_flag(Self::DATA_OUTPUT_BIT15, format.bit15);

        Self(cleared.0 | (format.depth.bits() << Self::DEPTH_SHIFT))
    }

    /// The block being decoded, in hardware numbering (0-3 luma, 4 Cr, 5 Cb).
    pub fn current_block(self) -> u8 {
        ((self.0 >> Self::CURRENT_BLOCK_SHIFT) & 7) as u8
    }

    pub fn with_current_block(self, block: u8) -> Self {
        let cleared = self.0 & !(7 << Self::CURRENT_BLOCK_SHIFT);
        Self(cleared | (u32::from(block & 7) << Self::CURRENT_BLOCK_SHIFT))
    }

    /// Parameter words left for the active command, minus one.
    pub fn parameter_words_remaining(self) -> u16 {
        self.0 as u16
    }

    pub fn with_parameter_words_remaining(self, words: u16) -> Self {
        Self((self.0 & 0xFFFF_0000) | u32::from(words))
    }
}

bitflags! {
    /// The control register, as written to offset 4.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ControlRegister : u32 {
        /// Abort the active command and flush both FIFOs.
        const RESET = 1 << 31;

        /// Raise DMA requests while the input FIFO has room.
        const ENABLE_DMA_IN = 1 << 30;

        /// Raise DMA requests while the output FIFO holds data.
        const ENABLE_DMA_OUT = 1 << 29;
    }
}
