use crate::{stream::Writer, Message};
use std::collections::BTreeMap;

/// Puts out-of-order pieces of a byte stream back in order.
///
/// Pieces are identified by the absolute index of their first byte. Bytes
/// that continue the stream are written to the output immediately. Bytes
/// further ahead are held as pending spans until the gap before them closes.
/// Nothing is ever held that the output would not have room for, so the
/// memory used is bounded by the output's capacity.
#[derive(Debug, Default)]
pub struct Reassembler {
    /// Non-overlapping spans keyed by the index of their first byte
    pending: BTreeMap<u64, Message>,
    bytes_pending: u64,
    /// Whether a piece marked as the end of the stream has been stored
    saw_last: bool,
}

impl Reassembler {
    pub fn new() -> Self {
        Default::default()
    }

    /// Accepts the piece of the stream starting at `first_index`.
    /// `is_last` marks the piece whose final byte ends the stream.
    pub fn insert(
        &mut self,
        first_index: u64,
        data: impl Into<Message>,
        is_last: bool,
        output: &mut Writer<'_>,
    ) {
        let mut data = data.into();
        let mut is_last = is_last;

        if data.is_empty() {
            if is_last {
                output.close();
            }
            return;
        }

        let capacity = output.available_capacity();
        if capacity == 0 {
            tracing::trace!(first_index, "no room in output, dropping piece");
            return;
        }

        let next = output.bytes_pushed();
        let end = first_index.saturating_add(data.len() as u64);
        let acceptable_end = next + capacity;

        if end <= next || first_index >= acceptable_end {
            tracing::trace!(first_index, end, next, acceptable_end, "piece outside window");
            return;
        }

        if end > acceptable_end {
            data.truncate((acceptable_end - first_index) as usize);
            // The true end of the stream was cut off
            is_last = false;
        }

        if first_index > next {
            self.store(first_index, data, is_last);
            return;
        }

        data.remove_front((next - first_index) as usize);
        output.push(data);
        if is_last {
            output.close();
        }

        self.drain(output);
    }

    /// The number of bytes held in pending spans.
    pub fn bytes_pending(&self) -> u64 {
        self.bytes_pending
    }

    /// Stores the parts of an early piece that no pending span already covers.
    fn store(&mut self, first_index: u64, data: Message, is_last: bool) {
        let end = first_index + data.len() as u64;

        // Only the closest span starting at or before the piece can reach into it
        let lower = self
            .pending
            .range(..=first_index)
            .next_back()
            .map(|(&start, _)| start)
            .unwrap_or(first_index);

        let mut front = first_index;
        let mut gaps = Vec::new();
        for (&start, span) in self.pending.range(lower..end) {
            let span_end = start + span.len() as u64;
            if span_end <= front {
                continue;
            }
            if start > front {
                gaps.push((front, start));
            }
            front = front.max(span_end);
            if front >= end {
                break;
            }
        }
        if front < end {
            gaps.push((front, end));
        }

        for (gap_start, gap_end) in gaps {
            let mut piece = data.clone();
            piece.remove_front((gap_start - first_index) as usize);
            piece.truncate((gap_end - gap_start) as usize);
            self.bytes_pending += gap_end - gap_start;
            self.pending.insert(gap_start, piece);
        }

        if is_last {
            self.saw_last = true;
        }
    }

    /// Writes every pending span that has become contiguous with the output.
    fn drain(&mut self, output: &mut Writer<'_>) {
        while let Some(entry) = self.pending.first_entry() {
            let start = *entry.key();
            let next = output.bytes_pushed();
            if start > next {
                break;
            }

            let mut span = entry.remove();
            self.bytes_pending -= span.len() as u64;
            let span_end = start + span.len() as u64;
            if span_end > next {
                span.remove_front((next - start) as usize);
                output.push(span);
            }
        }

        if self.pending.is_empty() && self.saw_last {
            output.close();
        }
    }
}
