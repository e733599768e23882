//! Fixed-capacity queues backing the data registers.

use crate::traits::FifoElement;
use bincode::de::{BorrowDecoder, Decoder};
use bincode::enc::Encoder;
use bincode::error::{DecodeError, EncodeError};
use bincode::{BorrowDecode, Decode, Encode};

/// An array-backed ring buffer holding at most `N` elements.
///
/// Pushing onto a full queue drops the element. Popping from an empty queue
/// yields nothing, but the queue remembers the last element it handed out so
/// that register reads past the end can repeat it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fifo<T, const N: usize> {
    /// Element storage. Slots outside `head..head + len` hold stale data.
    buffer: [T; N],

    /// Index of the oldest element.
    head: usize,

    /// Index the next pushed element will be written to.
    tail: usize,

    /// Number of queued elements.
    len: usize,

    /// The most recently popped element.
    last: T,
}

impl<T: FifoElement, const N: usize> Default for Fifo<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FifoElement, const N: usize> Fifo<T, N> {
    pub fn new() -> Self {
        Self {
            buffer: [T::zero(); N],
            head: 0,
            tail: 0,
            len: 0,
            last: T::zero(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    /// Number of elements that can be pushed before the queue is full.
    pub fn space(&self) -> usize {
        N - self.len
    }

    /// Append an element, returning `false` if it was dropped.
    pub fn push(&mut self, value: T) -> bool {
        if self.is_full() {
            return false;
        }

        self.buffer[self.tail] = value;
        self.tail = (self.tail + 1) % N;
        self.len += 1;

        true
    }

    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let value = self.buffer[self.head];
        self.head = (self.head + 1) % N;
        self.len -= 1;
        self.last = value;

        Some(value)
    }

    /// Pop an element, or repeat the last popped one if the queue is empty.
    pub fn pop_or_last(&mut self) -> T {
        self.pop().unwrap_or(self.last)
    }

    /// Drop every queued element and forget the last popped one.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
        self.last = T::zero();
    }

    /// Check that the read/write positions describe a valid queue.
    pub(crate) fn is_consistent(&self) -> bool {
        self.head < N && self.tail < N && self.len <= N && (self.head + self.len) % N == self.tail
    }
}

impl<T: FifoElement + Encode, const N: usize> Encode for Fifo<T, N> {
    fn encode<E: Encoder>(&self, encoder: &mut E) -> Result<(), EncodeError> {
        self.buffer.encode(encoder)?;
        (self.head as u32).encode(encoder)?;
        (self.tail as u32).encode(encoder)?;
        (self.len as u32).encode(encoder)?;
        self.last.encode(encoder)
    }
}

impl<Context, T: FifoElement + Decode<Context>, const N: usize> Decode<Context> for Fifo<T, N> {
    fn decode<D: Decoder<Context = Context>>(decoder: &mut D) -> Result<Self, DecodeError> {
        let fifo = Self {
            buffer: <[T; N]>::decode(decoder)?,
            head: u32::decode(decoder)? as usize,
            tail: u32::decode(decoder)? as usize,
            len: u32::decode(decoder)? as usize,
            last: T::decode(decoder)?,
        };

        if !fifo.is_consistent() {
            return Err(DecodeError::Other("FIFO positions out of range"));
        }

        Ok(fifo)
    }
}

impl<'de, Context, T: FifoElement + BorrowDecode<'de, Context>, const N: usize>
    BorrowDecode<'de, Context> for Fifo<T, N>
{
    fn borrow_decode<D: BorrowDecoder<'de, Context = Context>>(
        decoder: &mut D,
    ) -> Result<Self, DecodeError> {
        let fifo = Self {
            buffer: <[T; N]>::borrow_decode(decoder)?,
            head: u32::borrow_decode(decoder)? as usize,
            tail: u32::borrow_decode(decoder)? as usize,
            len: u32::borrow_decode(decoder)? as usize,
            last: T::borrow_decode(decoder)?,
        };

        if !fifo.is_consistent() {
            return Err(DecodeError::Other("FIFO positions out of range"));
        }

        Ok(fifo)
    }
}
