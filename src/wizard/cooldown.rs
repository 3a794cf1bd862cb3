//! Resend cooldown counter and its tick source.
//!
//! The counter itself is plain state ticked once per second; the [`Ticker`]
//! is the thing that actually ticks, a background task owned by whichever
//! component is showing the countdown. Stopping (or dropping) the ticker
//! tears the task down, so no timer outlives its owner.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Seconds-remaining counter for the resend control.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cooldown {
    remaining: u32,
}

impl Cooldown {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)start the countdown
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
    }

    /// Count down one second; returns the seconds still remaining
    pub fn tick(&mut self) -> u32 {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn reset(&mut self) {
        self.remaining = 0;
    }
}

/// Once-per-second tick source.
///
/// Sends a unit message on the provided channel every second until stopped.
/// The receiver side drives [`Cooldown::tick`] on whatever owns the counter.
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start ticking. Any previously running tick task is stopped first.
    pub fn start(&mut self, tx: mpsc::Sender<()>) {
        self.stop();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of an interval fires immediately; the countdown
            // starts one full second after start.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        }));
    }

    /// Stop the tick task, if one is running
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
