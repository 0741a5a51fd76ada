use super::{Acknowledgment, Reassembler, Segment, Wrap32};
use crate::stream::{ByteStream, Writer};

/// The receiving half of a TCP connection.
///
/// Turns incoming segments into writes on the inbound stream and reports how
/// far the stream has been received and how much more it can take.
#[derive(Debug, Default, Clone)]
pub struct TcpReceiver {
    /// The sequence number of the remote SYN, once seen
    isn: Option<Wrap32>,
}

impl TcpReceiver {
    pub fn new() -> Self {
        Default::default()
    }

    /// The remote initial sequence number, if a SYN has arrived.
    pub fn isn(&self) -> Option<Wrap32> {
        self.isn
    }

    /// Handles one segment from the remote sender.
    pub fn receive(
        &mut self,
        segment: Segment,
        reassembler: &mut Reassembler,
        inbound: &mut Writer<'_>,
    ) {
        if segment.syn {
            self.isn = Some(segment.seqno);
        }

        let Some(isn) = self.isn else {
            tracing::debug!(seqno = %segment.seqno, "segment before SYN, discarding");
            return;
        };

        let absolute = segment.seqno.unwrap(isn, inbound.bytes_pushed());
        if absolute == 0 && !segment.syn {
            // Only the SYN may occupy sequence position zero
            tracing::debug!(seqno = %segment.seqno, "segment claims the SYN position, discarding");
            return;
        }

        // The SYN takes up one sequence number ahead of the first stream byte
        let first_index = absolute.saturating_sub(1);
        reassembler.insert(first_index, segment.text, segment.fin, inbound);
    }

    /// The acknowledgment and window to report to the remote sender.
    pub fn send(&self, inbound: &ByteStream) -> Acknowledgment {
        let window_size = inbound.available_capacity().min(u16::MAX as u64) as u16;
        let ackno = self.isn.map(|isn| {
            // One for the SYN and, once everything has been delivered, one for the FIN
            let next = inbound.bytes_pushed() + 1 + inbound.is_finished() as u64;
            Wrap32::wrap(next, isn)
        });
        Acknowledgment { ackno, window_size }
    }
}
