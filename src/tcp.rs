//! The reliable-delivery core of the [Transmission Control
//! Protocol](https://www.rfc-editor.org/rfc/rfc9293.html).
//!
//! A [`TcpSender`] turns an outbound [`ByteStream`](crate::ByteStream) into
//! segments and retransmits them until they are acknowledged. A
//! [`TcpReceiver`] takes segments in whatever order they arrive, puts them
//! back together with a [`Reassembler`], and reports what it has received.
//! A [`Peer`] is one of each, wired together.
//!
//! Everything here is synchronous and clock-free. Time passes only when a
//! caller says so through `tick`, and segments travel only when a caller
//! moves them from one peer to the other.

pub use self::{
    peer::Peer,
    reassembler::Reassembler,
    receiver::TcpReceiver,
    segment::{Acknowledgment, Segment, TcpMessage},
    sender::TcpSender,
    timer::{RetransmitTimer, TimerState},
    wrapping::Wrap32,
};

mod peer;
mod reassembler;
mod receiver;
mod segment;
mod sender;
mod timer;
mod wrapping;

#[cfg(test)]
mod tests;
