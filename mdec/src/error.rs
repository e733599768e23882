//! Error type

use thiserror::Error;

/// Failures surfaced by the decoder.
///
/// Register traffic and tick advancement never fail; errors only arise while
/// wiring the device up or restoring a snapshot.
#[derive(Error, Debug)]
pub enum Error {
    #[error("the decoder was built without a platform scheduler")]
    MissingPlatform,

    #[error("the decoder was built without a DMA controller")]
    MissingDmaController,

    #[error("the snapshot does not start with the MDEC magic")]
    NotASnapshot,

    #[error("snapshot version {found} is not supported (expected {expected})")]
    UnsupportedSnapshotVersion { found: u32, expected: u32 },

    #[error("snapshot payload could not be decoded: {0}")]
    SnapshotDecode(#[from] bincode::error::DecodeError),

    #[error("snapshot payload could not be encoded: {0}")]
    SnapshotEncode(#[from] bincode::error::EncodeError),

    #[error("snapshot has {0} unexpected trailing bytes")]
    SnapshotTrailingBytes(usize),

    #[error("snapshot state is inconsistent: {0}")]
    SnapshotInconsistent(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
