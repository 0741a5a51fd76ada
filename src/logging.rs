//! Structured event logging.
//!
//! The engines log through `tracing` macros wherever they are. Installing a
//! subscriber with [`init_events`] sends those events, and the segment events
//! logged by [`segment_event`], to a JSON log file.

use crate::tcp::Segment;
use std::{
    fs::{create_dir_all, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{event, Level};
use tracing_subscriber::FmtSubscriber;

/// Installs a JSON subscriber writing to `debug-<timestamp>.log` under `dir`,
/// creating the directory if needed. Only one subscriber can be installed per
/// process. Returns the path of the log file.
pub fn init_events(dir: impl AsRef<Path>) -> Result<PathBuf, LoggingError> {
    let dir = dir.as_ref();
    create_dir_all(dir)?;
    let file_path = dir.join(format!(
        "debug-{}.log",
        chrono::offset::Local::now().format("%y-%m-%d_%H-%M-%S")
    ));
    let file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&file_path)?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::TRACE)
        .with_writer(Arc::new(file))
        .json()
        .finish();
    // The global default so that events from every peer land in the same file
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(file_path)
}

/// Which way a logged segment was going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Sent,
    Received,
}

/// Segment event handler. Captures the sequence number, control bits, payload
/// length, acknowledgment and window of a segment a peer sent or received.
pub fn segment_event(
    direction: Direction,
    segment: &Segment,
    ackno: Option<crate::tcp::Wrap32>,
    window_size: u16,
) {
    event!(
        target: "SEGMENT",
        Level::INFO,
        direction = ?direction,
        seqno = segment.seqno.raw_value(),
        syn = segment.syn,
        fin = segment.fin,
        len = segment.text.len(),
        ackno = ackno.map(|ackno| ackno.raw_value()),
        window_size,
    );
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Could not open the log file: {0}")]
    Io(#[from] io::Error),
    #[error("A global subscriber is already set")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}
