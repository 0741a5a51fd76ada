use super::Wrap32;
use crate::Message;

/// What a sender puts on the wire: a sequence number, the SYN and FIN control
/// bits, and the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    /// The sequence number of the SYN if present, otherwise of the first
    /// payload byte
    pub seqno: Wrap32,
    pub syn: bool,
    pub fin: bool,
    pub text: Message,
}

impl Segment {
    pub fn new(seqno: Wrap32, text: Message) -> Self {
        Self {
            seqno,
            text,
            ..Default::default()
        }
    }

    pub fn syn(mut self) -> Self {
        self.syn = true;
        self
    }

    pub fn fin(mut self) -> Self {
        self.fin = true;
        self
    }

    /// The length of the segment in sequence space, including any control
    /// bits
    pub fn seg_len(&self) -> u64 {
        self.text.len() as u64 + self.syn as u64 + self.fin as u64
    }
}

/// What a receiver reports back to the remote sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Acknowledgment {
    /// The next sequence number the receiver expects. Absent until the
    /// receiver has seen a SYN.
    pub ackno: Option<Wrap32>,
    /// How many bytes past `ackno` the receiver is willing to accept
    pub window_size: u16,
}

/// Everything one [`Peer`](super::Peer) sends to the other in a single
/// exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TcpMessage {
    pub segment: Segment,
    pub ack: Acknowledgment,
}
