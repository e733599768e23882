//! MDEC device model.

mod block;
mod command;
mod cpu;
mod macroblock;
mod snapshot;
mod state;
#[cfg(test)]
mod test_support;
mod types;

pub use state::{Mdec, MdecBuilder};
pub use types::{DecoderOption, Phase};
