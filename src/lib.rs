//! The reliable-delivery core of a TCP-like transport: flow-controlled byte
//! streams, out-of-order reassembly, 32-bit sequence number wrapping, and a
//! sender and receiver that together carry a byte stream across a lossy,
//! reordering network.
//!
//! # Organization
//! - [`Message`](message::Message) holds bytes that move between streams and
//!   segments without being copied
//! - [`ByteStream`](stream::ByteStream) is the bounded buffer an application
//!   writes to and reads from
//! - [`tcp`] holds the sequence-number arithmetic, the reassembler, and the
//!   sender and receiver engines, joined up as a [`Peer`](tcp::Peer)
//! - [`TcpConfig`](config::TcpConfig) sets the parameters of a connection
//! - [`driver`] ticks a peer from a tokio task
//! - [`logging`] records what happened to a JSON log file
//!
//! # Time and transport
//!
//! Nothing here reads a clock or touches a socket. Time passes when `tick` is
//! called with the milliseconds elapsed, and segments go wherever the caller
//! takes them. That keeps every engine deterministic, and lets tests stand in
//! for the network with anything from a direct hand-off to a seeded lossy
//! link.

pub mod config;
pub use config::TcpConfig;

pub mod driver;

pub mod logging;

pub mod message;
pub use message::Message;

pub mod stream;
pub use stream::ByteStream;

pub mod tcp;
pub use tcp::{Peer, Wrap32};
