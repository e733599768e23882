//! Device snapshots

use crate::decoder::state::{DeviceState, Mdec};
use crate::decoder::types::Phase;
use crate::error::{Error, Result};
use crate::types::Command;

/// Leading bytes of every snapshot.
const SNAPSHOT_MAGIC: &[u8; 4] = b"MDEC";

/// Bumped whenever the layout of the device state changes.
const SNAPSHOT_VERSION: u32 = 1;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 4;

impl Mdec {
    /// Serialize the complete device state.
    ///
    /// Collaborators and options are not part of the snapshot.
    pub fn save_state(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(4096);
        bytes.extend_from_slice(SNAPSHOT_MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_VERSION.to_le_bytes());

        let payload = bincode::encode_to_vec(&self.state, bincode::config::standard())?;
        bytes.extend_from_slice(&payload);

        log::debug!("MDEC state saved ({} bytes)", bytes.len());
        Ok(bytes)
    }

    /// Replace the device state with a snapshot taken by [`Mdec::save_state`].
    ///
    /// On error the device is left exactly as it was. On success the DMA
    /// request lines are refreshed and, if a macroblock is awaiting release,
    /// the platform is asked to schedule it again.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() < HEADER_LEN || &bytes[..SNAPSHOT_MAGIC.len()] != SNAPSHOT_MAGIC {
            return Err(Error::NotASnapshot);
        }

        let mut version = [0; 4];
        version.copy_from_slice(&bytes[SNAPSHOT_MAGIC.len()..HEADER_LEN]);
        let version = u32::from_le_bytes(version);
        if version != SNAPSHOT_VERSION {
            return Err(Error::UnsupportedSnapshotVersion {
                found: version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let payload = &bytes[HEADER_LEN..];
        let (state, read): (DeviceState, usize) =
            bincode::decode_from_slice(payload, bincode::config::standard())?;
        if read != payload.len() {
            return Err(Error::SnapshotTrailingBytes(payload.len() - read));
        }

        validate(&state)?;

        self.state = state;
        self.update_status();
        if let Some(ticks) = self.state.copy_out.remaining() {
            self.platform.set_downcount(ticks);
        }

        log::debug!("MDEC state loaded, phase {:?}", self.state.phase);
        Ok(())
    }
}

fn validate(state: &DeviceState) -> Result<()> {
    if !state.cursor.is_consistent() {
        return Err(Error::SnapshotInconsistent("block cursor out of range"));
    }

    if usize::from(state.cursor.block) >= state.output_format.depth.blocks_per_macroblock() {
        return Err(Error::SnapshotInconsistent("block slot beyond output format"));
    }

    if state.phase == Phase::PendingCopyOut && !state.copy_out.pending {
        return Err(Error::SnapshotInconsistent("copy-out awaited but not scheduled"));
    }

    let parameters_fit = match (state.phase, state.command) {
        (Phase::Idle, Command::None) => state.remaining_halfwords == 0,
        (Phase::HeaderParsed, Command::SetQuantTable) => {
            matches!(state.remaining_halfwords, 32 | 64)
        }
        (Phase::HeaderParsed, Command::SetScaleTable) => state.remaining_halfwords == 64,
        (
            Phase::StreamingTokens | Phase::MacroblockReady | Phase::PendingCopyOut,
            Command::DecodeMacroblock,
        ) => true,
        _ => false,
    };
    if !parameters_fit {
        return Err(Error::SnapshotInconsistent("phase does not match command"));
    }

    Ok(())
}
