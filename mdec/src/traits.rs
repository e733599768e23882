//! Traits

use num_traits::Zero;
use std::fmt::Debug;

/// An element that can be held in a [`Fifo`](crate::Fifo).
///
/// Storage is preallocated, so every element type needs a value to fill
/// unused slots with.
pub trait FifoElement: Copy + Debug + Eq + Zero {}

impl<T> FifoElement for T where T: Copy + Debug + Eq + Zero {}

/// The DMA channels the decoder raises requests on.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DmaChannel {
    /// Transfers from memory into the command/data register.
    MdecIn,

    /// Transfers from the data register out to memory.
    MdecOut,
}

/// The host's tick scheduler.
pub trait Platform {
    /// Ask the scheduler to call [`Mdec::execute`](crate::Mdec::execute)
    /// no later than `ticks` from now.
    fn set_downcount(&mut self, ticks: crate::TickCount);
}

/// The bulk-transfer controller that services the decoder's FIFOs.
pub trait DmaController {
    /// Assert or deassert the request line of a channel.
    fn set_request(&mut self, channel: DmaChannel, requested: bool);
}
