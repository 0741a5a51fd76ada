//! Byte collections with cheap splitting and joining.
//!
//! Stream buffers, reassembly spans and segment payloads all hold their bytes
//! in a [`Message`], so moving data between them never copies it.

use std::{collections::VecDeque, fmt::Display};

mod chunk;
pub use chunk::Chunk;

mod message_bytes;
pub use message_bytes::MessageBytes;

/// A byte collection built out of shared, immutable chunks.
///
/// Bytes pass through a transport several times: written by an application,
/// buffered, cut into segments, held for retransmission, reassembled on the
/// other side. A message lets each of those steps take or give away a range
/// of bytes by adjusting chunk bounds instead of copying.
#[derive(Debug, Clone, Default)]
pub struct Message {
    chunks: VecDeque<Chunk>,
    len: usize,
}

impl Message {
    /// Creates a new message with the given body content.
    ///
    /// # Examples
    ///
    /// ```
    /// # use elvis_tcp::message::Message;
    /// let message = Message::new(b"Body");
    /// assert_eq!(message.len(), 4);
    /// ```
    pub fn new(body: impl Into<Chunk>) -> Self {
        Self::new_inner(body.into())
    }

    fn new_inner(body: Chunk) -> Self {
        let len = body.len();
        let mut chunks = VecDeque::new();
        if len > 0 {
            chunks.push_back(body);
        }
        Self { chunks, len }
    }

    /// Adds the given message to the end of this one.
    ///
    /// # Examples
    ///
    /// ```
    /// # use elvis_tcp::message::Message;
    /// let mut message = Message::new("Hello");
    /// message.concatenate(Message::new(" world!"));
    /// assert_eq!(message.to_vec(), b"Hello world!");
    /// ```
    pub fn concatenate(&mut self, other: Message) {
        self.len += other.len;
        self.chunks.extend(other.chunks);
    }

    /// Removes the first `len` bytes from the message and returns them as a new
    /// message. Cutting more bytes than the message holds cuts everything.
    pub fn cut(&mut self, len: usize) -> Self {
        let len = len.min(self.len);
        self.len -= len;

        let mut chunks = VecDeque::new();
        let mut to_take = len;

        while to_take > 0 {
            let Some(mut head) = self.chunks.pop_front() else {
                break;
            };
            let head_len = head.len();
            if head_len <= to_take {
                to_take -= head_len;
                chunks.push_back(head);
            } else {
                let mut taken = head.clone();
                taken.end = taken.start + to_take;
                chunks.push_back(taken);
                head.start += to_take;
                self.chunks.push_front(head);
                to_take = 0;
            }
        }

        Self { chunks, len }
    }

    /// Drops the first `len` bytes of the message.
    pub fn remove_front(&mut self, len: usize) {
        let len = len.min(self.len);
        self.len -= len;

        let mut to_remove = len;
        while let Some(head) = self.chunks.front_mut() {
            let head_len = head.len();
            if head_len <= to_remove {
                to_remove -= head_len;
                self.chunks.pop_front();
            } else {
                head.start += to_remove;
                break;
            }
        }
    }

    /// Shortens the message to at most `len` bytes, keeping the front.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        self.len = len;

        let mut bytes_to_keep = len;
        let mut keep = 0;
        for chunk in self.chunks.iter_mut() {
            if bytes_to_keep == 0 {
                break;
            }
            keep += 1;
            let chunk_len = chunk.len();
            if bytes_to_keep >= chunk_len {
                bytes_to_keep -= chunk_len;
            } else {
                chunk.end = chunk.start + bytes_to_keep;
                bytes_to_keep = 0;
            }
        }
        self.chunks.truncate(keep);
    }

    /// The length of the message.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the message contains no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the bytes of the entire message.
    pub fn iter(&self) -> MessageBytes {
        MessageBytes::new(&self.chunks)
    }

    /// Returns an iterator over the contiguous pieces of the message.
    pub fn chunks(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.chunks.iter().map(Chunk::as_slice)
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for chunk in self.chunks() {
            out.extend_from_slice(chunk);
        }
        out
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.iter() {
            write!(f, "{byte:x} ")?;
        }
        Ok(())
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl Eq for Message {}

impl From<Vec<u8>> for Message {
    fn from(val: Vec<u8>) -> Self {
        Message::new(val)
    }
}

impl From<&[u8]> for Message {
    fn from(val: &[u8]) -> Self {
        Message::new(val)
    }
}

impl<const L: usize> From<[u8; L]> for Message {
    fn from(val: [u8; L]) -> Self {
        Message::new(val)
    }
}

impl<const L: usize> From<&[u8; L]> for Message {
    fn from(val: &[u8; L]) -> Self {
        Message::new(val)
    }
}

impl From<&str> for Message {
    fn from(val: &str) -> Self {
        Message::new(val)
    }
}

impl From<String> for Message {
    fn from(val: String) -> Self {
        Message::new(val)
    }
}
