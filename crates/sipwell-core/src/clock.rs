//! Wall-clock abstraction.
//!
//! The scheduler asks a [`Clock`] for the local time-of-day before every
//! delivery and the coordinator asks it for today's date key, so tests can
//! drive both through [`ManualClock`] while tokio's paused time drives the
//! interval timer.

use chrono::{Duration, Local, NaiveDateTime};
use std::sync::{Arc, Mutex};

pub trait Clock: Send + Sync + 'static {
    /// Current device-local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Real local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests and simulations.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }
}
