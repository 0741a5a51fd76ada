use super::{Acknowledgment, Reassembler, Segment, TcpMessage, TcpReceiver, TcpSender};
use crate::{
    config::{ConfigError, TcpConfig},
    logging::{segment_event, Direction},
    stream::{ByteStream, Reader, Writer},
};
use std::iter;

/// One end of a TCP connection: a sender for the outbound stream and a
/// receiver for the inbound one, with each outgoing segment carrying the
/// receiver's current acknowledgment.
///
/// The application writes to [`writer`](Peer::writer) and reads from
/// [`reader`](Peer::reader). Whatever carries segments between peers calls
/// [`segments`](Peer::segments) and [`segment_arrives`](Peer::segment_arrives),
/// and something calls [`tick`](Peer::tick) as time passes.
#[derive(Debug)]
pub struct Peer {
    config: TcpConfig,
    outbound: ByteStream,
    inbound: ByteStream,
    reassembler: Reassembler,
    receiver: TcpReceiver,
    sender: TcpSender,
    /// Whether a received segment occupied sequence space and still needs
    /// acknowledging
    need_ack: bool,
    /// The acknowledgment most recently sent to the remote peer
    last_ack: Option<Acknowledgment>,
    active: bool,
}

impl Peer {
    pub fn new(config: TcpConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sender = TcpSender::new(config.initial_rto_ms, config.fixed_isn)
            .with_max_payload_size(config.max_payload_size);
        Ok(Self {
            config,
            outbound: ByteStream::new(config.capacity),
            inbound: ByteStream::new(config.capacity),
            reassembler: Reassembler::new(),
            receiver: TcpReceiver::new(),
            sender,
            need_ack: false,
            last_ack: None,
            active: true,
        })
    }

    /// Where the application writes data for the remote peer.
    pub fn writer(&mut self) -> Writer<'_> {
        self.outbound.writer()
    }

    /// Where the application reads data from the remote peer.
    pub fn reader(&mut self) -> Reader<'_> {
        self.inbound.reader()
    }

    pub fn outbound(&self) -> &ByteStream {
        &self.outbound
    }

    pub fn inbound(&self) -> &ByteStream {
        &self.inbound
    }

    pub fn sender(&self) -> &TcpSender {
        &self.sender
    }

    pub fn receiver(&self) -> &TcpReceiver {
        &self.receiver
    }

    pub fn config(&self) -> &TcpConfig {
        &self.config
    }

    /// Handles a message from the remote peer.
    pub fn segment_arrives(&mut self, message: TcpMessage) {
        if !self.active {
            return;
        }
        let TcpMessage { segment, ack } = message;
        segment_event(Direction::Received, &segment, ack.ackno, ack.window_size);

        self.sender.receive(ack);
        if segment.seg_len() > 0 {
            self.need_ack = true;
        }
        if self.is_early_fin(&segment) {
            // Closing now would cut off the bytes still missing before it; the
            // remote retransmits the FIN once they are acknowledged
            tracing::debug!(seqno = %segment.seqno, "FIN ahead of missing data, holding back");
            return;
        }
        self.receiver
            .receive(segment, &mut self.reassembler, &mut self.inbound.writer());
    }

    /// Whether `segment` is a bare FIN that lands beyond the end of the data
    /// received so far.
    fn is_early_fin(&self, segment: &Segment) -> bool {
        let Some(isn) = self.receiver.isn() else {
            return false;
        };
        if !segment.fin || segment.syn || !segment.text.is_empty() {
            return false;
        }
        let next = self.inbound.bytes_pushed();
        // The SYN occupies absolute sequence number zero
        segment.seqno.unwrap(isn, next) > next + 1
    }

    /// Advances time by the milliseconds elapsed since the last call. Gives up
    /// on the connection once the sender has retransmitted more than the
    /// configured number of times in a row.
    pub fn tick(&mut self, ms_since_last_tick: u64) {
        if !self.active {
            return;
        }
        self.sender.tick(ms_since_last_tick);

        let retransmissions = self.sender.consecutive_retransmissions();
        if retransmissions > self.config.max_retx_attempts {
            tracing::warn!(
                retransmissions,
                max_retx_attempts = self.config.max_retx_attempts,
                isn = %self.sender.isn(),
                "too many retransmissions, abandoning connection"
            );
            self.outbound.writer().set_error();
            self.inbound.writer().set_error();
            self.active = false;
        }
    }

    /// Collects everything to send to the remote peer now.
    pub fn segments(&mut self) -> Vec<TcpMessage> {
        if !self.active {
            return Vec::new();
        }

        self.sender.push(&mut self.outbound.reader());
        let ack = self.receiver.send(&self.inbound);

        let sender = &mut self.sender;
        let mut messages: Vec<_> = iter::from_fn(|| sender.maybe_send())
            .map(|segment| TcpMessage { segment, ack })
            .collect();

        // A changed window is worth telling the remote peer about even if
        // nothing new arrived
        let window_update = self.receiver.isn().is_some() && self.last_ack != Some(ack);
        if messages.is_empty() && (self.need_ack || window_update) {
            messages.push(TcpMessage {
                segment: self.sender.send_empty_message(),
                ack,
            });
        }

        if !messages.is_empty() {
            self.need_ack = false;
            self.last_ack = Some(ack);
        }
        for message in messages.iter() {
            segment_event(
                Direction::Sent,
                &message.segment,
                message.ack.ackno,
                message.ack.window_size,
            );
        }
        messages
    }

    /// Whether the connection is still being served. A connection that hit
    /// the retransmission limit is not.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether both directions are done: everything from the remote peer has
    /// been read and everything sent has been acknowledged.
    pub fn is_finished(&self) -> bool {
        self.inbound.is_finished() && self.sender.is_fully_acked()
    }

    pub fn consecutive_retransmissions(&self) -> u64 {
        self.sender.consecutive_retransmissions()
    }
}
