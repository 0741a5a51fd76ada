//! A flow-controlled byte stream with separate writing and reading views.
//!
//! Each direction of a connection owns one [`ByteStream`]. The producer side
//! mutates it through a [`Writer`] and the consumer side through a
//! [`Reader`]; both views borrow the same stream so the pushed and popped
//! counters have a single home. Either view dereferences to the stream for
//! the read-only accessors.

use crate::Message;
use std::ops::Deref;

/// A bounded FIFO of bytes.
///
/// At most [`capacity`](ByteStream::capacity) bytes are buffered at any time.
/// Writes beyond the available capacity are truncated rather than refused,
/// which is the contract the reassembler and sender rely on for flow control.
#[derive(Debug, Clone)]
pub struct ByteStream {
    capacity: u64,
    buffer: Message,
    pushed: u64,
    popped: u64,
    closed: bool,
    error: bool,
}

impl ByteStream {
    /// Creates an empty stream that buffers at most `capacity` bytes.
    pub fn new(capacity: u64) -> Self {
        Self {
            capacity,
            buffer: Message::default(),
            pushed: 0,
            popped: 0,
            closed: false,
            error: false,
        }
    }

    /// The producer's view of the stream.
    pub fn writer(&mut self) -> Writer<'_> {
        Writer { stream: self }
    }

    /// The consumer's view of the stream.
    pub fn reader(&mut self) -> Reader<'_> {
        Reader { stream: self }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// How many more bytes the stream can hold right now.
    pub fn available_capacity(&self) -> u64 {
        self.capacity - self.bytes_buffered()
    }

    /// Bytes written but not yet read.
    pub fn bytes_buffered(&self) -> u64 {
        self.pushed - self.popped
    }

    /// Total bytes ever accepted by the stream.
    pub fn bytes_pushed(&self) -> u64 {
        self.pushed
    }

    /// Total bytes ever read out of the stream.
    pub fn bytes_popped(&self) -> u64 {
        self.popped
    }

    /// Whether the writer has signaled that no more bytes will follow.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether the stream is closed and everything has been read.
    pub fn is_finished(&self) -> bool {
        self.closed && self.bytes_buffered() == 0
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// The buffered bytes, left in place. The returned message shares its
    /// storage with the stream.
    pub fn peek(&self) -> Message {
        self.buffer.clone()
    }
}

/// Write access to a [`ByteStream`].
#[derive(Debug)]
pub struct Writer<'a> {
    stream: &'a mut ByteStream,
}

impl Writer<'_> {
    /// Appends as much of `data` as fits and drops the rest. Does nothing once
    /// the stream is closed or has an error.
    pub fn push(&mut self, data: impl Into<Message>) {
        let mut data = data.into();
        if self.stream.error || self.stream.closed || data.is_empty() {
            return;
        }
        let accepted = (data.len() as u64).min(self.stream.available_capacity());
        data.truncate(accepted as usize);
        self.stream.buffer.concatenate(data);
        self.stream.pushed += accepted;
    }

    /// Marks the end of the stream.
    pub fn close(&mut self) {
        self.stream.closed = true;
    }

    /// Marks the stream as failed. Buffered bytes can still be read.
    pub fn set_error(&mut self) {
        self.stream.error = true;
    }
}

impl Deref for Writer<'_> {
    type Target = ByteStream;

    fn deref(&self) -> &Self::Target {
        self.stream
    }
}

/// Read access to a [`ByteStream`].
#[derive(Debug)]
pub struct Reader<'a> {
    stream: &'a mut ByteStream,
}

impl Reader<'_> {
    /// Discards up to `len` buffered bytes.
    pub fn pop(&mut self, len: u64) {
        let len = len.min(self.stream.bytes_buffered());
        self.stream.buffer.remove_front(len as usize);
        self.stream.popped += len;
    }

    /// Removes and returns up to `max_len` buffered bytes.
    pub fn read(&mut self, max_len: u64) -> Message {
        let len = max_len.min(self.stream.bytes_buffered());
        let out = self.stream.buffer.cut(len as usize);
        self.stream.popped += len;
        out
    }

    /// Marks the stream as failed from the consumer side.
    pub fn set_error(&mut self) {
        self.stream.error = true;
    }
}

impl Deref for Reader<'_> {
    type Target = ByteStream;

    fn deref(&self) -> &Self::Target {
        self.stream
    }
}
