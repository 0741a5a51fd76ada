//! Drives a [`Peer`]'s retransmission clock from a tokio task.

use crate::tcp::Peer;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

/// Spawns a task that calls [`Peer::tick`] every `period` with the time that
/// actually passed. The task ends when the peer finishes or is abandoned.
pub fn spawn_clock(peer: Arc<Mutex<Peer>>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut last_tick = Instant::now();
        loop {
            interval.tick().await;
            // Whole milliseconds only; the remainder carries into the next tick
            let elapsed = u64::try_from(last_tick.elapsed().as_millis()).unwrap_or(u64::MAX);
            last_tick += Duration::from_millis(elapsed);

            let mut locked = match peer.lock() {
                Ok(locked) => locked,
                Err(_) => {
                    tracing::error!("Peer lock poisoned, stopping the clock");
                    return;
                }
            };
            locked.tick(elapsed);
            if !locked.is_active() || locked.is_finished() {
                tracing::debug!(
                    active = locked.is_active(),
                    finished = locked.is_finished(),
                    "clock stopped"
                );
                return;
            }
        }
    })
}
