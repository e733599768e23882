//! Command state machine

use crate::decoder::block::TokenOutcome;
use crate::decoder::cpu::{idct_block, pack_macroblock};
use crate::decoder::state::Mdec;
use crate::decoder::types::{DecoderOption, Phase};
use crate::types::{Command, CommandWord};

/// Halfwords making up one quantization table.
const QUANT_TABLE_HALFWORDS: u32 = 32;

/// Halfwords making up the scale table.
const SCALE_TABLE_HALFWORDS: u32 = 64;

impl Mdec {
    /// Advance the active command as far as queued input, output room and
    /// the copy-out timer allow.
    pub(super) fn execute_pending_command(&mut self) {
        while self.step() {}
    }

    /// Run one phase transition, returning `false` if the machine is stalled.
    fn step(&mut self) -> bool {
        match self.state.phase {
            Phase::Idle => self.parse_header(),
            Phase::HeaderParsed => self.load_table(),
            Phase::StreamingTokens => self.stream_tokens(),
            Phase::MacroblockReady => self.convert_macroblock(),
            Phase::PendingCopyOut => false,
        }
    }

    fn parse_header(&mut self) -> bool {
        let state = &mut self.state;
        if state.data_in.len() < 2 {
            return false;
        }

        let (Some(lo), Some(hi)) = (state.data_in.pop(), state.data_in.pop()) else {
            return false;
        };
        let word = CommandWord(u32::from(lo) | (u32::from(hi) << 16));

        let command = word.command();
        state.output_format = word.into();
        state.command = command;
        state.cursor.reset();

        match command {
            Command::DecodeMacroblock => {
                state.remaining_halfwords = u32::from(word.parameter_word_count()) * 2;
                state.phase = Phase::StreamingTokens;
                log::debug!(
                    "MDEC decode macroblock: {} words, {:?}",
                    word.parameter_word_count(),
                    state.output_format
                );
            }
            Command::SetQuantTable => {
                state.remaining_halfwords = if word.loads_chroma_table() {
                    QUANT_TABLE_HALFWORDS * 2
                } else {
                    QUANT_TABLE_HALFWORDS
                };
                state.phase = Phase::HeaderParsed;
                log::debug!(
                    "MDEC set quant table (chroma: {})",
                    word.loads_chroma_table()
                );
            }
            Command::SetScaleTable => {
                state.remaining_halfwords = SCALE_TABLE_HALFWORDS;
                state.phase = Phase::HeaderParsed;
                log::debug!("MDEC set scale table");
            }
            Command::None => {
                log::debug!("MDEC no-op command {:08X}", word.0);
                self.end_command();
            }
        }

        true
    }

    /// Copy a table out of the input FIFO once all of it has arrived.
    fn load_table(&mut self) -> bool {
        let state = &mut self.state;
        let needed = state.remaining_halfwords as usize;
        if state.data_in.len() < needed {
            return false;
        }

        let mut units = [0u16; SCALE_TABLE_HALFWORDS as usize];
        for unit in &mut units[..needed] {
            if let Some(value) = state.data_in.pop() {
                *unit = value;
            }
        }

        match state.command {
            Command::SetQuantTable => {
                let bytes = units[..needed].iter().flat_map(|unit| unit.to_le_bytes());
                for (entry, byte) in state.iq_y.iter_mut().chain(state.iq_uv.iter_mut()).zip(bytes)
                {
                    *entry = byte;
                }
            }
            Command::SetScaleTable => {
                state.scale_table = bytemuck::cast(units);
            }
            command => log::warn!("MDEC loading a table for {command:?}"),
        }

        self.end_command();
        true
    }

    /// Feed queued tokens to the block decoder until a macroblock completes
    /// or the input runs dry.
    fn stream_tokens(&mut self) -> bool {
        let blocks = self.state.output_format.depth.blocks_per_macroblock();

        while self.state.remaining_halfwords > 0 {
            let Some(token) = self.state.data_in.pop() else {
                return false;
            };
            self.state.remaining_halfwords -= 1;

            if self.decode_token(token, blocks) {
                self.state.phase = Phase::MacroblockReady;
                return true;
            }
        }

        if self.state.copy_out.pending {
            self.state.phase = Phase::PendingCopyOut;
        } else {
            self.end_command();
        }

        true
    }

    /// Decode a single token, returning `true` if it completed a macroblock.
    fn decode_token(&mut self, token: u16, blocks: usize) -> bool {
        let state = &mut self.state;
        let slot = usize::from(state.cursor.block);

        // Slots 0 and 1 hold chroma only when decoding colour.
        let quant = if blocks == 1 || slot >= 2 {
            &state.iq_y
        } else {
            &state.iq_uv
        };

        let block = &mut state.blocks.0[slot];
        if state.cursor.feed(token, block, quant) != TokenOutcome::BlockComplete {
            return false;
        }

        idct_block(block, &state.scale_table);
        state.total_blocks_decoded = state.total_blocks_decoded.wrapping_add(1);
        log::trace!("MDEC block {slot} decoded");

        state.cursor.advance_block(blocks)
    }

    /// Convert a completed macroblock to pixels and start the copy-out timer,
    /// provided the previous macroblock has fully left the device.
    fn convert_macroblock(&mut self) -> bool {
        let state = &mut self.state;
        if state.copy_out.pending || !state.data_out.is_empty() {
            return false;
        }

        state.pixels.convert(state.output_format, &state.blocks);
        state.phase = if state.remaining_halfwords > 0 {
            Phase::StreamingTokens
        } else {
            Phase::PendingCopyOut
        };

        let ticks = state
            .copy_out
            .arm(state.output_format.depth.blocks_per_macroblock());

        if self.options.contains(DecoderOption::INSTANT_COPY_OUT) {
            self.copy_out_macroblock();
        } else {
            self.platform.set_downcount(ticks);
        }

        true
    }

    /// Serialize the converted macroblock into the output FIFO.
    pub(super) fn copy_out_macroblock(&mut self) {
        let state = &mut self.state;
        state.copy_out.cancel();

        let data_out = &mut state.data_out;
        let mut dropped = 0;
        pack_macroblock(
            state.output_format.depth,
            state.output_format.bit15,
            &state.pixels.0,
            |word| {
                if !data_out.push(word) {
                    dropped += 1;
                }
            },
        );

        if dropped > 0 {
            log::warn!("MDEC data out FIFO overflow, dropped {dropped} words");
        }
        log::debug!("MDEC macroblock copied out, FIFO size = {}", data_out.len());

        if state.phase == Phase::PendingCopyOut {
            self.end_command();
        }
    }

    pub(super) fn end_command(&mut self) {
        log::debug!("MDEC command {:?} finished", self.state.command);

        let state = &mut self.state;
        state.command = Command::None;
        state.phase = Phase::Idle;
        state.remaining_halfwords = 0;
        state.cursor.reset();
    }
}
