#![allow(dead_code)]

use elvis_tcp::{tcp::TcpMessage, Peer, TcpConfig, Wrap32};
use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};

/// A link that loses and reorders messages.
pub struct Unreliable {
    /// A random number generator to determine delivery success and order
    rng: SmallRng,
    /// A number in the range [0, 1] to determine the frequency of successful
    /// delivery
    success_rate: f64,
}

impl Unreliable {
    /// Creates a new link with the given delivery success rate in the range
    /// [0, 1].
    pub fn new(success_rate: f64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(0xBAD5EED),
            success_rate,
        }
    }

    /// Hands what survives of `messages` to `to`, in shuffled order. Returns
    /// how many were delivered.
    pub fn carry(&mut self, messages: Vec<TcpMessage>, to: &mut Peer) -> usize {
        let mut delivered: Vec<_> = messages
            .into_iter()
            .filter(|_| self.rng.gen_bool(self.success_rate))
            .collect();
        delivered.shuffle(&mut self.rng);
        let count = delivered.len();
        for message in delivered {
            to.segment_arrives(message);
        }
        count
    }
}

pub fn peer(config: TcpConfig, isn: u32) -> Peer {
    Peer::new(config.with_fixed_isn(Wrap32::new(isn))).unwrap()
}

/// Bytes that are easy to tell apart by position
pub fn pattern(len: usize, salt: u8) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 ^ salt).collect()
}

/// Writes as much of the rest of `data` as the peer will take, closing the
/// outbound stream once all of it is in
pub fn feed(peer: &mut Peer, data: &[u8]) {
    let written = peer.outbound().bytes_pushed() as usize;
    if written < data.len() {
        peer.writer().push(&data[written..]);
    } else if !peer.outbound().is_closed() {
        peer.writer().close();
    }
}

/// Reads everything the peer has received so far
pub fn drain(peer: &mut Peer, into: &mut Vec<u8>) {
    into.extend(peer.reader().read(u64::MAX).iter());
}
