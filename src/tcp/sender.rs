use super::{Acknowledgment, RetransmitTimer, Segment, Wrap32};
use crate::{config::MAX_PAYLOAD_SIZE, stream::Reader, Message};
use std::collections::VecDeque;

/// The sending half of a TCP connection.
///
/// Cuts the outbound stream into segments that fit the remote window, keeps
/// every segment until it is acknowledged, and resends the oldest one each
/// time the retransmission timer runs out.
///
/// ```text
///      acked          in flight          window
/// ----------|----------------------|-----------|------
///      acked_seqno            next_seqno   acked_seqno
///                                          + window_size
/// ```
#[derive(Debug, Clone)]
pub struct TcpSender {
    isn: Wrap32,
    max_payload_size: u64,
    syn_sent: bool,
    fin_sent: bool,
    /// Absolute sequence number of the next new sequence number to send
    next_seqno: u64,
    /// Highest absolute sequence number the receiver has acknowledged
    acked_seqno: u64,
    /// The window last advertised by the receiver
    window_size: u64,
    /// Sequence numbers sent but not acknowledged
    bytes_in_flight: u64,
    /// Segments waiting for [`maybe_send`](TcpSender::maybe_send)
    ready: VecDeque<Segment>,
    /// Sent segments not yet acknowledged, oldest first
    outstanding: VecDeque<Transmit>,
    consecutive_retransmissions: u64,
    timer: RetransmitTimer,
}

/// A segment on the retransmission queue.
#[derive(Debug, Clone)]
struct Transmit {
    /// Absolute sequence number of the segment's first sequence position
    seqno: u64,
    segment: Segment,
}

impl Transmit {
    fn end(&self) -> u64 {
        self.seqno + self.segment.seg_len()
    }
}

impl TcpSender {
    /// Creates a sender with the given initial retransmission timeout. Uses a
    /// random initial sequence number unless one is given.
    pub fn new(initial_rto_ms: u64, fixed_isn: Option<Wrap32>) -> Self {
        Self {
            isn: fixed_isn.unwrap_or_else(Wrap32::random),
            max_payload_size: MAX_PAYLOAD_SIZE,
            syn_sent: false,
            fin_sent: false,
            next_seqno: 0,
            acked_seqno: 0,
            window_size: 1,
            bytes_in_flight: 0,
            ready: VecDeque::new(),
            outstanding: VecDeque::new(),
            consecutive_retransmissions: 0,
            timer: RetransmitTimer::new(initial_rto_ms),
        }
    }

    /// Limits the payload carried by each segment.
    pub fn with_max_payload_size(mut self, max_payload_size: u64) -> Self {
        self.max_payload_size = max_payload_size;
        self
    }

    /// Turns as much of the outbound stream into segments as the window
    /// allows.
    pub fn push(&mut self, outbound: &mut Reader<'_>) {
        // A zero window still gets one sequence number at a time to test it
        let window = self.window_size.max(1);

        while self.bytes_in_flight < window {
            let mut segment = Segment::new(Wrap32::wrap(self.next_seqno, self.isn), Message::default());
            if !self.syn_sent {
                segment.syn = true;
                self.syn_sent = true;
            }

            let room = window - self.bytes_in_flight - segment.seg_len();
            segment.text = outbound.read(room.min(self.max_payload_size));

            if !self.fin_sent
                && outbound.is_finished()
                && self.bytes_in_flight + segment.seg_len() < window
            {
                segment.fin = true;
                self.fin_sent = true;
            }

            let seg_len = segment.seg_len();
            if seg_len == 0 {
                break;
            }

            tracing::trace!(
                seqno = %segment.seqno,
                syn = segment.syn,
                fin = segment.fin,
                len = segment.text.len(),
                "segment queued"
            );

            let fin = segment.fin;
            self.outstanding.push_back(Transmit {
                seqno: self.next_seqno,
                segment: segment.clone(),
            });
            self.ready.push_back(segment);
            self.bytes_in_flight += seg_len;
            self.next_seqno += seg_len;

            if fin || outbound.bytes_buffered() == 0 {
                break;
            }
        }
    }

    /// The next segment to put on the wire, if any.
    pub fn maybe_send(&mut self) -> Option<Segment> {
        let segment = self.ready.pop_front()?;
        if !self.timer.is_running() && !self.outstanding.is_empty() {
            self.timer.start();
        }
        Some(segment)
    }

    /// A segment that occupies no sequence space, for carrying a bare
    /// acknowledgment.
    pub fn send_empty_message(&self) -> Segment {
        Segment::new(Wrap32::wrap(self.next_seqno, self.isn), Message::default())
    }

    /// Handles an acknowledgment and window update from the remote receiver.
    pub fn receive(&mut self, ack: Acknowledgment) {
        self.window_size = ack.window_size as u64;

        let Some(ackno) = ack.ackno else {
            return;
        };

        let acked = ackno.unwrap(self.isn, self.next_seqno);
        if acked > self.next_seqno {
            tracing::debug!(
                ackno = %ackno,
                next_seqno = self.next_seqno,
                "acknowledgment of unsent data, ignoring"
            );
            return;
        }
        self.acked_seqno = self.acked_seqno.max(acked);

        while let Some(front) = self.outstanding.front() {
            if front.end() > acked {
                break;
            }
            self.bytes_in_flight -= front.segment.seg_len();
            self.outstanding.pop_front();

            self.timer.reset_rto();
            self.consecutive_retransmissions = 0;
            if !self.outstanding.is_empty() {
                self.timer.start();
            }
        }

        // Retransmissions queued before this acknowledgment may now be stale
        let (isn, next_seqno) = (self.isn, self.next_seqno);
        self.ready.retain(|segment| {
            segment.seqno.unwrap(isn, next_seqno) + segment.seg_len() > acked
        });

        if self.outstanding.is_empty() {
            self.timer.stop();
        }
    }

    /// Advances the retransmission timer by the milliseconds elapsed since the
    /// last call.
    pub fn tick(&mut self, ms_since_last_tick: u64) {
        self.timer.tick(ms_since_last_tick);
        if !self.timer.is_expired() {
            return;
        }

        let Some(front) = self.outstanding.front() else {
            self.timer.stop();
            return;
        };
        tracing::debug!(
            seqno = %front.segment.seqno,
            rto = self.timer.rto(),
            window = self.window_size,
            "retransmission timeout"
        );
        self.ready.push_back(front.segment.clone());

        // A zero window means the receiver is busy, not that the segment was lost
        if self.window_size != 0 {
            self.consecutive_retransmissions += 1;
            self.timer.double_rto();
        }
        self.timer.start();
    }

    /// How many sequence numbers are outstanding.
    pub fn sequence_numbers_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    /// How many retransmissions have happened since the last new
    /// acknowledgment.
    pub fn consecutive_retransmissions(&self) -> u64 {
        self.consecutive_retransmissions
    }

    pub fn isn(&self) -> Wrap32 {
        self.isn
    }

    pub fn next_seqno(&self) -> u64 {
        self.next_seqno
    }

    pub fn acked_seqno(&self) -> u64 {
        self.acked_seqno
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    /// The retransmission timeout currently in effect, in milliseconds.
    pub fn current_rto(&self) -> u64 {
        self.timer.rto()
    }

    pub fn timer(&self) -> &RetransmitTimer {
        &self.timer
    }

    pub fn is_fin_sent(&self) -> bool {
        self.fin_sent
    }

    /// Whether the FIN has been sent and everything up to it acknowledged.
    pub fn is_fully_acked(&self) -> bool {
        self.fin_sent && self.bytes_in_flight == 0
    }
}
