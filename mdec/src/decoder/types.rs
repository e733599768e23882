//! Decoder types

use bincode::{Decode, Encode};

bitflags! {
    /// Options which influence how the device is emulated.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct DecoderOption : u8 {
        /// Release decoded macroblocks as soon as they are converted, rather
        /// than after the per-block processing delay.
        ///
        /// Software that polls the status register before reading still
        /// works; software that times its transfers against the real delay
        /// may not.
        const INSTANT_COPY_OUT = 0b1;
    }
}

/// Where the command state machine currently is.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub enum Phase {
    /// No command is active; the next two input units form a header.
    #[default]
    Idle,

    /// A table-load command is waiting for its fixed run of parameters.
    HeaderParsed,

    /// A decode command is turning input units into coefficients.
    ///
    /// A copy-out of the previous macroblock may be pending meanwhile.
    StreamingTokens,

    /// Every block of a macroblock has been decoded, but the pixel buffer is
    /// still owed to an earlier macroblock.
    MacroblockReady,

    /// The command's last macroblock is decoded and waiting to be released.
    PendingCopyOut,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        self != Self::Idle
    }
}
