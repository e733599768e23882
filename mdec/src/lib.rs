//! Pure-rust emulation of the PlayStation macroblock decoder (MDEC)

#[macro_use]
extern crate bitflags;

#[macro_use]
extern crate lazy_static;

pub mod decoder;
mod error;
mod fifo;
mod traits;
mod types;

pub use decoder::{DecoderOption, Mdec, MdecBuilder, Phase};
pub use error::{Error, Result};
pub use fifo::Fifo;
pub use traits::{DmaChannel, DmaController, FifoElement, Platform};
pub use types::{
    Command, CommandWord, ControlRegister, DataOutputDepth, OutputFormat, StatusRegister,
    TickCount, DATA_REGISTER, STATUS_REGISTER,
};
