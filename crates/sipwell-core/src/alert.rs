//! Visual notification boundary.
//!
//! [`AlertSink`] is the seam to the platform's native notification
//! primitive. Delivery is one-shot and best-effort: failures are logged by
//! the scheduler and never retried.

use std::sync::{Arc, Mutex};

use crate::error::Result;

pub trait AlertSink: Send + Sync + 'static {
    /// Show a one-shot notification.
    ///
    /// # Errors
    ///
    /// Returns an error when the platform primitive rejects the delivery.
    fn notify(&self, title: &str, body: &str) -> Result<()>;
}

/// Prints notifications to stdout. Stand-in delivery for the CLI runner.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleAlert;

impl AlertSink for ConsoleAlert {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        println!("[{title}] {body}");
        Ok(())
    }
}

/// Records deliveries instead of showing them. Test double.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlert {
    delivered: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingAlert {
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(title, body)` pairs delivered so far.
    pub fn delivered(&self) -> Vec<(String, String)> {
        self.delivered.lock().unwrap().clone()
    }

    /// Number of deliveries with the given title.
    pub fn count_titled(&self, title: &str) -> usize {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == title)
            .count()
    }
}

impl AlertSink for RecordingAlert {
    fn notify(&self, title: &str, body: &str) -> Result<()> {
        self.delivered
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}
