use super::*;
use crate::{config::TcpConfig, Message};

fn peer(isn: u32) -> Peer {
    config_peer(TcpConfig::default(), isn)
}

fn config_peer(config: TcpConfig, isn: u32) -> Peer {
    Peer::new(config.with_fixed_isn(Wrap32::new(isn))).unwrap()
}

/// Moves everything `from` has to send over to `to`, returning how many
/// messages went across
fn deliver(from: &mut Peer, to: &mut Peer) -> usize {
    let messages = from.segments();
    let count = messages.len();
    for message in messages {
        to.segment_arrives(message);
    }
    count
}

/// Runs the three-way handshake between two fresh peers
fn connect(peer_a: &mut Peer, peer_b: &mut Peer) {
    assert_eq!(deliver(peer_a, peer_b), 1);
    assert_eq!(deliver(peer_b, peer_a), 1);
    assert_eq!(deliver(peer_a, peer_b), 1);
    assert_eq!(peer_a.sender().sequence_numbers_in_flight(), 0);
    assert_eq!(peer_b.sender().sequence_numbers_in_flight(), 0);
}

#[test]
fn basic_synchronization() {
    //     Peer A                                          Peer B
    // 1.  --> <SEQ=100><CTL=SYN>                      -->
    // 2.  <-- <SEQ=300><ACK=101><CTL=SYN>             <--
    // 3.  --> <SEQ=101><ACK=301>                      -->

    let mut peer_a = peer(100);
    let mut peer_b = peer(300);

    // 1
    let a_syn = peer_a.segments().remove(0);
    assert!(a_syn.segment.syn);
    assert_eq!(a_syn.segment.seqno, Wrap32::new(100));
    assert_eq!(a_syn.ack.ackno, None);
    assert_eq!(a_syn.ack.window_size, 64_000);
    peer_b.segment_arrives(a_syn);

    // 2
    let b_syn = peer_b.segments().remove(0);
    assert!(b_syn.segment.syn);
    assert_eq!(b_syn.segment.seqno, Wrap32::new(300));
    assert_eq!(b_syn.ack.ackno, Some(Wrap32::new(101)));
    peer_a.segment_arrives(b_syn);
    assert_eq!(peer_a.sender().sequence_numbers_in_flight(), 0);

    // 3
    let a_ack = peer_a.segments().remove(0);
    assert_eq!(a_ack.segment.seg_len(), 0);
    assert_eq!(a_ack.segment.seqno, Wrap32::new(101));
    assert_eq!(a_ack.ack.ackno, Some(Wrap32::new(301)));
    peer_b.segment_arrives(a_ack);
    assert_eq!(peer_b.sender().sequence_numbers_in_flight(), 0);

    // Nothing more to say on either side
    assert!(peer_a.segments().is_empty());
    assert!(peer_b.segments().is_empty());
}

#[test]
fn simultaneous_initiation() {
    let mut peer_a = peer(100);
    let mut peer_b = peer(300);

    let a_syn = peer_a.segments().remove(0);
    let b_syn = peer_b.segments().remove(0);
    peer_a.segment_arrives(b_syn);
    peer_b.segment_arrives(a_syn);

    let a_ack = peer_a.segments().remove(0);
    assert_eq!(a_ack.segment.seqno, Wrap32::new(101));
    assert_eq!(a_ack.ack.ackno, Some(Wrap32::new(301)));
    let b_ack = peer_b.segments().remove(0);
    assert_eq!(b_ack.segment.seqno, Wrap32::new(301));
    assert_eq!(b_ack.ack.ackno, Some(Wrap32::new(101)));

    peer_a.segment_arrives(b_ack);
    peer_b.segment_arrives(a_ack);
    assert_eq!(peer_a.sender().sequence_numbers_in_flight(), 0);
    assert_eq!(peer_b.sender().sequence_numbers_in_flight(), 0);
}

#[test]
fn data_and_close() {
    let mut peer_a = peer(100);
    let mut peer_b = peer(300);
    connect(&mut peer_a, &mut peer_b);

    peer_a.writer().push("hello");
    let data = peer_a.segments();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].segment.seqno, Wrap32::new(101));
    assert_eq!(data[0].segment.text, Message::new("hello"));
    for message in data {
        peer_b.segment_arrives(message);
    }

    let b_ack = peer_b.segments().remove(0);
    assert_eq!(b_ack.ack.ackno, Some(Wrap32::new(106)));
    assert_eq!(b_ack.ack.window_size, 64_000 - 5);
    peer_a.segment_arrives(b_ack);
    assert_eq!(peer_a.sender().sequence_numbers_in_flight(), 0);

    // Reading opens the window back up, which is worth an update
    assert_eq!(peer_b.reader().read(100), Message::new("hello"));
    let update = peer_b.segments().remove(0);
    assert_eq!(update.segment.seg_len(), 0);
    assert_eq!(update.ack.window_size, 64_000);
    peer_a.segment_arrives(update);

    peer_a.writer().close();
    let a_fin = peer_a.segments().remove(0);
    assert!(a_fin.segment.fin);
    assert_eq!(a_fin.segment.seqno, Wrap32::new(106));
    peer_b.segment_arrives(a_fin);
    assert!(peer_b.inbound().is_finished());

    peer_b.writer().close();
    let b_fin = peer_b.segments().remove(0);
    assert!(b_fin.segment.fin);
    assert_eq!(b_fin.segment.seqno, Wrap32::new(301));
    assert_eq!(b_fin.ack.ackno, Some(Wrap32::new(107)));
    peer_a.segment_arrives(b_fin);
    assert!(peer_a.is_finished());
    assert!(!peer_b.is_finished());

    assert_eq!(deliver(&mut peer_a, &mut peer_b), 1);
    assert!(peer_b.is_finished());
}

#[test]
fn lost_syn_is_retransmitted() {
    let mut peer_a = peer(100);
    let mut peer_b = peer(300);

    // The first SYN never arrives
    peer_a.segments();
    peer_a.tick(999);
    assert!(peer_a.segments().is_empty());
    peer_a.tick(1);
    assert_eq!(peer_a.consecutive_retransmissions(), 1);

    let a_syn = peer_a.segments().remove(0);
    assert!(a_syn.segment.syn);
    assert_eq!(a_syn.segment.seqno, Wrap32::new(100));
    peer_b.segment_arrives(a_syn);
    assert_eq!(deliver(&mut peer_b, &mut peer_a), 1);
    assert_eq!(peer_a.consecutive_retransmissions(), 0);
    assert_eq!(peer_a.sender().current_rto(), 1000);
}

#[test]
fn receiver_window_limits_sender() {
    let mut peer_a = peer(100);
    let mut peer_b = config_peer(TcpConfig::default().with_capacity(4), 300);
    connect(&mut peer_a, &mut peer_b);
    assert_eq!(peer_a.sender().window_size(), 4);

    peer_a.writer().push("abcdefgh");
    let data = peer_a.segments();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0].segment.text, Message::new("abcd"));
    for message in data {
        peer_b.segment_arrives(message);
    }

    let b_ack = peer_b.segments().remove(0);
    assert_eq!(b_ack.ack.window_size, 0);
    peer_a.segment_arrives(b_ack);

    // A closed window still gets one byte at a time
    let trickle = peer_a.segments();
    assert_eq!(trickle.len(), 1);
    assert_eq!(trickle[0].segment.text, Message::new("e"));
    for message in trickle {
        peer_b.segment_arrives(message);
    }
    assert_eq!(peer_b.inbound().bytes_pushed(), 4);

    assert_eq!(peer_b.reader().read(4), Message::new("abcd"));
    deliver(&mut peer_b, &mut peer_a);
    assert_eq!(peer_a.sender().window_size(), 4);
}

#[test]
#[tracing_test::traced_test]
fn too_many_retransmissions() {
    let config = TcpConfig::default().with_max_retx_attempts(2);
    let mut peer_a = config_peer(config, 100);
    let mut peer_b = peer(300);

    peer_a.segments();
    for retransmissions in 1..=2 {
        peer_a.tick(u64::MAX);
        assert_eq!(peer_a.consecutive_retransmissions(), retransmissions);
        assert!(peer_a.is_active());
    }
    peer_a.tick(u64::MAX);
    assert!(!peer_a.is_active());
    assert!(peer_a.outbound().has_error());
    assert!(peer_a.inbound().has_error());
    assert!(logs_contain("too many retransmissions"));

    // A dead peer neither sends nor listens
    assert!(peer_a.segments().is_empty());
    let b_syn = peer_b.segments().remove(0);
    peer_a.segment_arrives(b_syn);
    assert_eq!(peer_a.receiver().isn(), None);
}

#[test]
fn idle_connection_outlives_stale_retransmission() {
    let config = TcpConfig::default().with_max_retx_attempts(2);
    let mut peer_a = config_peer(config, 100);
    let mut peer_b = peer(300);
    connect(&mut peer_a, &mut peer_b);

    peer_a.writer().push("abc");
    assert_eq!(deliver(&mut peer_a, &mut peer_b), 1);

    // The timeout fires before the acknowledgment gets back
    peer_a.tick(1000);
    assert_eq!(deliver(&mut peer_b, &mut peer_a), 1);
    assert_eq!(peer_a.sender().sequence_numbers_in_flight(), 0);
    assert!(peer_a.segments().is_empty());

    for _ in 0..10 {
        peer_a.tick(u64::MAX);
    }
    assert!(peer_a.is_active());
    assert_eq!(peer_a.consecutive_retransmissions(), 0);
}

#[test]
fn fin_ahead_of_missing_data_waits() {
    let mut peer_a = peer(100);
    let mut peer_b = peer(300);
    connect(&mut peer_a, &mut peer_b);

    // The data goes missing and the FIN behind it arrives
    peer_a.writer().push("abc");
    assert_eq!(peer_a.segments().len(), 1);
    peer_a.writer().close();
    let a_fin = peer_a.segments().remove(0);
    assert!(a_fin.segment.fin);
    assert!(a_fin.segment.text.is_empty());
    peer_b.segment_arrives(a_fin);
    assert!(!peer_b.inbound().is_closed());

    peer_a.tick(1000);
    assert_eq!(deliver(&mut peer_a, &mut peer_b), 1);
    assert_eq!(peer_b.inbound().peek(), Message::new("abc"));
    assert!(!peer_b.inbound().is_closed());

    let b_ack = peer_b.segments().remove(0);
    assert_eq!(b_ack.ack.ackno, Some(Wrap32::new(104)));
    peer_a.segment_arrives(b_ack);
    assert_eq!(peer_a.sender().sequence_numbers_in_flight(), 1);

    // Now the FIN comes around again and lands in order
    peer_a.tick(1000);
    assert_eq!(deliver(&mut peer_a, &mut peer_b), 1);
    assert!(peer_b.inbound().is_closed());
    assert_eq!(peer_b.reader().read(10), Message::new("abc"));
    assert!(peer_b.inbound().is_finished());
}

#[test]
fn invalid_config_is_rejected() {
    assert!(Peer::new(TcpConfig::default().with_capacity(0)).is_err());
}
