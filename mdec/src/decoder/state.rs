//! MDEC device core

use crate::decoder::block::{BlockSet, DecodeCursor, NUM_BLOCKS};
use crate::decoder::macroblock::{CopyOutTimer, PixelBuffer};
use crate::decoder::types::{DecoderOption, Phase};
use crate::error::{Error, Result};
use crate::fifo::Fifo;
use crate::traits::{DmaChannel, DmaController, Platform};
use crate::types::{
    Command, ControlRegister, OutputFormat, StatusRegister, TickCount, DATA_REGISTER,
    STATUS_REGISTER,
};
use bincode::{Decode, Encode};

/// Capacity of the input FIFO, in halfwords.
pub const DATA_IN_FIFO_SIZE: usize = 512;

/// Capacity of the output FIFO, in words.
pub const DATA_OUT_FIFO_SIZE: usize = 192;

/// Free input halfwords needed before the input DMA request is raised.
const DATA_IN_REQUEST_SPACE: usize = 64;

/// Everything about the device that survives a snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub(super) struct DeviceState {
    pub enable_dma_in: bool,
    pub enable_dma_out: bool,

    pub data_in: Fifo<u16, DATA_IN_FIFO_SIZE>,
    pub data_out: Fifo<u32, DATA_OUT_FIFO_SIZE>,

    /// The command being executed; `None` while idle.
    pub command: Command,
    pub phase: Phase,
    pub output_format: OutputFormat,

    /// Input halfwords the active command has yet to consume.
    pub remaining_halfwords: u32,

    /// Luma (and monochrome) quantization table.
    pub iq_y: [u8; 64],

    /// Chroma quantization table.
    pub iq_uv: [u8; 64],

    /// IDCT basis matrix, as 1.15 fixed point.
    pub scale_table: [i16; 64],

    pub blocks: BlockSet,
    pub cursor: DecodeCursor,
    pub pixels: PixelBuffer,
    pub copy_out: CopyOutTimer,

    pub total_blocks_decoded: u32,
}

impl DeviceState {
    fn new() -> Self {
        Self {
            enable_dma_in: false,
            enable_dma_out: false,
            data_in: Fifo::new(),
            data_out: Fifo::new(),
            command: Command::None,
            phase: Phase::Idle,
            output_format: OutputFormat::default(),
            remaining_halfwords: 0,
            iq_y: [0; 64],
            iq_uv: [0; 64],
            scale_table: [0; 64],
            blocks: BlockSet::default(),
            cursor: DecodeCursor::default(),
            pixels: PixelBuffer::default(),
            copy_out: CopyOutTimer::default(),
            total_blocks_decoded: 0,
        }
    }
}

/// An emulated MDEC, wired to the scheduler and DMA controller of its host.
pub struct Mdec {
    pub(super) platform: Box<dyn Platform>,
    pub(super) dma: Box<dyn DmaController>,

    /// External decoder options enabled on this decoder.
    pub(super) options: DecoderOption,

    pub(super) state: DeviceState,
}

/// Collects the collaborators an [`Mdec`] cannot run without.
pub struct MdecBuilder {
    platform: Option<Box<dyn Platform>>,
    dma: Option<Box<dyn DmaController>>,
    options: DecoderOption,
}

impl Default for MdecBuilder {
    fn default() -> Self {
        Self {
            platform: None,
            dma: None,
            options: DecoderOption::empty(),
        }
    }
}

impl MdecBuilder {
    pub fn platform(mut self, platform: impl Platform + 'static) -> Self {
        self.platform = Some(Box::new(platform));
        self
    }

    pub fn dma_controller(mut self, dma: impl DmaController + 'static) -> Self {
        self.dma = Some(Box::new(dma));
        self
    }

    pub fn options(mut self, options: DecoderOption) -> Self {
        self.options = options;
        self
    }

    /// Construct the device in its power-on state.
    ///
    /// Fails if either collaborator was not supplied.
    pub fn build(self) -> Result<Mdec> {
        let platform = self.platform.ok_or(Error::MissingPlatform)?;
        let dma = self.dma.ok_or(Error::MissingDmaController)?;

        let mut mdec = Mdec {
            platform,
            dma,
            options: self.options,
            state: DeviceState::new(),
        };
        mdec.update_status();

        Ok(mdec)
    }
}

impl Mdec {
    pub fn builder() -> MdecBuilder {
        MdecBuilder::default()
    }

    /// Abort any command and flush both FIFOs.
    ///
    /// Quantization and scale tables are kept.
    pub fn reset(&mut self) {
        self.soft_reset();
        self.update_status();
    }

    /// Read a 32-bit register at `offset` from the device base.
    pub fn read_register(&mut self, offset: u32) -> u32 {
        match offset {
            DATA_REGISTER => {
                let value = self.read_data_register();
                self.update_status();
                value
            }
            STATUS_REGISTER => {
                let status = self.status();
                log::trace!("MDEC status read: {:08X}", status.0);
                status.0
            }
            _ => {
                log::warn!("Unknown MDEC register read: {offset:#X}");
                0xFFFF_FFFF
            }
        }
    }

    /// Write a 32-bit register at `offset` from the device base.
    pub fn write_register(&mut self, offset: u32, value: u32) {
        match offset {
            DATA_REGISTER => self.write_command_register(value),
            STATUS_REGISTER => self.write_control_register(value),
            _ => {
                log::warn!("Unknown MDEC register write: {offset:#X} <- {value:08X}");
                return;
            }
        }

        self.update_status();
    }

    /// Drain `words.len()` words from the data register, as DMA would.
    ///
    /// Reading past the end of the output FIFO repeats the last word read.
    pub fn dma_read(&mut self, words: &mut [u32]) {
        if words.len() > self.state.data_out.len() {
            log::warn!(
                "MDEC DMA read of {} words with {} words available",
                words.len(),
                self.state.data_out.len()
            );
        }

        for word in words.iter_mut() {
            *word = self.read_data_register();
        }

        self.update_status();
    }

    /// Feed `words` to the command/data register, as DMA would.
    pub fn dma_write(&mut self, words: &[u32]) {
        for &word in words {
            self.write_command_register(word);
        }

        self.update_status();
    }

    /// Let `ticks` of emulated time pass.
    pub fn execute(&mut self, ticks: TickCount) {
        if self.state.copy_out.advance(ticks) {
            self.copy_out_macroblock();
            self.execute_pending_command();
        }

        self.update_status();
    }

    /// The status register as it would read right now.
    pub fn status(&self) -> StatusRegister {
        let state = &self.state;
        let current_block = (usize::from(state.cursor.block) + 4) % NUM_BLOCKS;
        let words_remaining = ((state.remaining_halfwords / 2) as u16).wrapping_sub(1);

        StatusRegister::default()
            .with_data_out_fifo_empty(state.data_out.is_empty())
            .with_data_in_fifo_full(state.data_in.is_full())
            .with_command_busy(state.phase.is_busy())
            .with_data_in_request(
                state.enable_dma_in && state.data_in.space() >= DATA_IN_REQUEST_SPACE,
            )
            .with_data_out_request(state.enable_dma_out && !state.data_out.is_empty())
            .with_output_format(state.output_format)
            .with_current_block(current_block as u8)
            .with_parameter_words_remaining(words_remaining)
    }

    pub fn options(&self) -> DecoderOption {
        self.options
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn command(&self) -> Command {
        self.state.command
    }

    pub fn output_format(&self) -> OutputFormat {
        self.state.output_format
    }

    /// The luma and chroma quantization tables, in that order.
    pub fn quant_tables(&self) -> (&[u8; 64], &[u8; 64]) {
        (&self.state.iq_y, &self.state.iq_uv)
    }

    pub fn scale_table(&self) -> &[i16; 64] {
        &self.state.scale_table
    }

    /// Blocks run through the IDCT since power-on.
    pub fn total_blocks_decoded(&self) -> u32 {
        self.state.total_blocks_decoded
    }

    /// Ticks left until the converted macroblock is released, if one is.
    pub fn ticks_until_copy_out(&self) -> Option<TickCount> {
        self.state.copy_out.remaining()
    }

    /// Halfwords queued in the input FIFO.
    pub fn input_len(&self) -> usize {
        self.state.data_in.len()
    }

    /// Words queued in the output FIFO.
    pub fn output_len(&self) -> usize {
        self.state.data_out.len()
    }

    fn read_data_register(&mut self) -> u32 {
        if self.state.data_out.is_empty() {
            log::warn!("MDEC data out FIFO empty on read");
        }

        let value = self.state.data_out.pop_or_last();

        log::trace!("MDEC data register read: {value:08X}");

        if self.state.data_out.is_empty() {
            self.execute_pending_command();
        }

        value
    }

    fn write_command_register(&mut self, value: u32) {
        log::trace!("MDEC command/data register <- {value:08X}");

        let data_in = &mut self.state.data_in;
        if data_in.space() < 2 {
            log::warn!("MDEC data in FIFO full, dropping {value:08X}");
            return;
        }

        data_in.push(value as u16);
        data_in.push((value >> 16) as u16);

        self.execute_pending_command();
    }

    fn write_control_register(&mut self, value: u32) {
        log::debug!("MDEC control register <- {value:08X}");

        let control = ControlRegister::from_bits_truncate(value);
        if control.contains(ControlRegister::RESET) {
            self.soft_reset();
        }

        self.state.enable_dma_in = control.contains(ControlRegister::ENABLE_DMA_IN);
        self.state.enable_dma_out = control.contains(ControlRegister::ENABLE_DMA_OUT);
    }

    pub(super) fn soft_reset(&mut self) {
        log::debug!("MDEC soft reset");

        let state = &mut self.state;
        state.data_in.clear();
        state.data_out.clear();
        state.command = Command::None;
        state.phase = Phase::Idle;
        state.output_format = OutputFormat::default();
        state.remaining_halfwords = 0;
        state.cursor.reset();
        state.copy_out.cancel();
    }

    /// Push the request lines implied by the current status to the DMA
    /// controller.
    pub(super) fn update_status(&mut self) {
        let status = self.status();
        self.dma.set_request(DmaChannel::MdecIn, status.data_in_request());
        self.dma.set_request(DmaChannel::MdecOut, status.data_out_request());
    }
}

#[cfg(test)]
mod tests {
    use crate::decoder::test_support::{
        decode_header, device, flat_quant_table, load_scale_table, RecordingPlatform,
        STANDARD_SCALE_TABLE,
    };
    use crate::decoder::Phase;
    use crate::error::Error;
    use crate::traits::DmaChannel;
    use crate::types::{DataOutputDepth, DATA_REGISTER, STATUS_REGISTER};
    use crate::Mdec;

    const FLAT_BLOCK: u32 = 0xFE00_0464;

    fn prepared() -> Mdec {
        let (mut mdec, _, _) = device();
        mdec.dma_write(&flat_quant_table(1));
        load_scale_table(&mut mdec, &STANDARD_SCALE_TABLE);
        mdec
    }

    #[test]
    fn building_requires_collaborators() {
        assert!(matches!(
            Mdec::builder().build(),
            Err(Error::MissingPlatform)
        ));
        assert!(matches!(
            Mdec::builder().platform(RecordingPlatform::default()).build(),
            Err(Error::MissingDmaController)
        ));
    }

    #[test]
    fn power_on_status() {
        let (mut mdec, _, _) = device();

        assert_eq!(mdec.read_register(STATUS_REGISTER), 0x8004_FFFF);
        assert_eq!(mdec.phase(), Phase::Idle);
        assert_eq!(mdec.total_blocks_decoded(), 0);
        assert_eq!(mdec.read_register(DATA_REGISTER), 0);
    }

    #[test]
    fn unknown_offsets_are_open_bus() {
        let (mut mdec, _, _) = device();

        assert_eq!(mdec.read_register(8), 0xFFFF_FFFF);
        mdec.write_register(8, 0x2800_0001);
        assert_eq!(mdec.phase(), Phase::Idle);
        assert_eq!(mdec.input_len(), 0);
    }

    #[test]
    fn dma_requests_follow_the_fifos() {
        let (mut mdec, _, dma) = device();
        mdec.dma_write(&flat_quant_table(1));
        load_scale_table(&mut mdec, &STANDARD_SCALE_TABLE);
        assert!(!dma.requested(DmaChannel::MdecIn));

        mdec.write_register(STATUS_REGISTER, 0x6000_0000);
        assert!(dma.requested(DmaChannel::MdecIn));
        assert!(!dma.requested(DmaChannel::MdecOut));

        mdec.dma_write(&[decode_header(DataOutputDepth::EightBit, false, 1), FLAT_BLOCK]);
        mdec.execute(256);
        assert!(dma.requested(DmaChannel::MdecOut));
        assert!(mdec.status().data_out_request());

        let mut out = [0; 16];
        mdec.dma_read(&mut out);
        assert!(!dma.requested(DmaChannel::MdecOut));

        mdec.write_register(STATUS_REGISTER, 0);
        assert!(!dma.requested(DmaChannel::MdecIn));
    }

    #[test]
    fn empty_reads_repeat_the_last_word() {
        let mut mdec = prepared();
        mdec.dma_write(&[decode_header(DataOutputDepth::EightBit, true, 1), FLAT_BLOCK]);
        mdec.execute(256);

        let mut out = [0; 20];
        mdec.dma_read(&mut out);
        assert_eq!(out, [0x0C0C_0C0C; 20]);
        assert_eq!(mdec.read_register(DATA_REGISTER), 0x0C0C_0C0C);
        assert!(mdec.status().data_out_fifo_empty());
    }

    #[test]
    fn bulk_transfers_match_register_accesses() {
        let words = [decode_header(DataOutputDepth::FifteenBit, false, 6)]
            .into_iter()
            .chain([FLAT_BLOCK; 6])
            .collect::<Vec<_>>();

        let mut bulk = prepared();
        bulk.dma_write(&words);
        bulk.execute(6 * 256);
        let mut bulk_out = vec![0; 130];
        bulk.dma_read(&mut bulk_out);

        let mut scalar = prepared();
        for &word in &words {
            scalar.write_register(DATA_REGISTER, word);
        }
        scalar.execute(6 * 256);
        let scalar_out = (0..130)
            .map(|_| scalar.read_register(DATA_REGISTER))
            .collect::<Vec<_>>();

        assert_eq!(bulk_out, scalar_out);
        assert_eq!(bulk.status(), scalar.status());
        assert_eq!(bulk_out[127], bulk_out[129]);
    }

    #[test]
    fn full_macroblock_fills_the_output_fifo() {
        let mut mdec = prepared();
        let mut words = vec![decode_header(DataOutputDepth::TwentyFourBit, false, 6)];
        words.extend([FLAT_BLOCK; 6]);
        mdec.dma_write(&words);
        mdec.execute(6 * 256);

        assert_eq!(mdec.output_len(), 192);
        assert_eq!(mdec.phase(), Phase::Idle);
        assert!(!mdec.status().data_out_fifo_empty());
    }

    #[test]
    fn input_fifo_drops_words_when_full() {
        let mut mdec = prepared();

        // The second macroblock stalls until the first is read out, so
        // nothing drains the input FIFO afterwards.
        mdec.dma_write(&[
            decode_header(DataOutputDepth::EightBit, false, 0xFFFF),
            FLAT_BLOCK,
            FLAT_BLOCK,
        ]);
        assert_eq!(mdec.phase(), Phase::MacroblockReady);

        mdec.dma_write(&[0x0000_0464; 256]);
        assert_eq!(mdec.input_len(), 512);
        assert!(mdec.status().data_in_fifo_full());

        mdec.write_register(DATA_REGISTER, 0x1234_5678);
        assert_eq!(mdec.input_len(), 512);
    }

    #[test]
    fn reset_aborts_but_keeps_tables() {
        let mut mdec = prepared();
        mdec.dma_write(&[decode_header(DataOutputDepth::EightBit, false, 2), FLAT_BLOCK]);
        assert!(mdec.status().command_busy());

        mdec.write_register(STATUS_REGISTER, 0x8000_0000);
        assert_eq!(mdec.phase(), Phase::Idle);
        assert_eq!(mdec.input_len(), 0);
        assert_eq!(mdec.ticks_until_copy_out(), None);
        assert_eq!(mdec.read_register(STATUS_REGISTER), 0x8004_FFFF);
        assert_eq!(mdec.scale_table(), &STANDARD_SCALE_TABLE);
        assert_eq!(mdec.quant_tables().0, &[1; 64]);

        mdec.execute(10_000);
        assert_eq!(mdec.output_len(), 0);

        mdec.dma_write(&[decode_header(DataOutputDepth::EightBit, false, 1), FLAT_BLOCK]);
        mdec.execute(256);
        assert_eq!(mdec.read_register(DATA_REGISTER), 0x8C8C_8C8C);
    }
}
