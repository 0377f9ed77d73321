//! Timed answers.
//!
//! A worker thread blocks on the input source and hands the line over a
//! single-slot channel. The calling thread polls that channel once per tick,
//! reporting the remaining time, until either the answer arrives or the
//! deadline passes. On timeout the worker is detached, never joined, so a
//! read that cannot be interrupted does not hold up the game or shutdown.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Deadline for one answer, polled in fixed ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    limit: Duration,
    tick: Duration,
}

impl Countdown {
    /// One-second ticks
    pub fn new(limit_secs: u32) -> Self {
        Self::with_tick(
            Duration::from_secs(u64::from(limit_secs)),
            Duration::from_secs(1),
        )
    }

    pub fn with_tick(limit: Duration, tick: Duration) -> Self {
        Self {
            limit,
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Run `reader` on a worker thread and wait for its line.
    ///
    /// `on_tick` is called before every poll with the time left. Returns
    /// None if the deadline passes first or the reader gives up.
    pub fn run<R, T>(&self, reader: R, on_tick: T) -> Option<String>
    where
        R: FnOnce() -> Option<String> + Send + 'static,
        T: FnMut(Duration),
    {
        let (tx, rx) = mpsc::sync_channel::<String>(1);

        let spawned = thread::Builder::new()
            .name("timed-answer".into())
            .spawn(move || {
                if let Some(line) = reader() {
                    // The receiver is gone once the deadline has passed
                    let _ = tx.try_send(line);
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "Could not start answer reader");
            return None;
        }

        self.wait(&rx, on_tick)
    }

    /// Poll an existing line source until a line arrives or the deadline
    /// passes. Lines arriving later stay in the channel.
    pub fn wait<T>(&self, lines: &Receiver<String>, mut on_tick: T) -> Option<String>
    where
        T: FnMut(Duration),
    {
        let deadline = Instant::now() + self.limit;
        loop {
            let now = Instant::now();
            if now >= deadline {
                debug!(limit_ms = self.limit.as_millis() as u64, "Answer deadline reached");
                return None;
            }
            let remaining = deadline - now;
            on_tick(remaining);

            match lines.recv_timeout(remaining.min(self.tick)) {
                Ok(line) => return Some(line),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }
}
